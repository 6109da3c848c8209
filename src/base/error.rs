//! Error taxonomy for binary cookie parsing.
//!
//! Every validation failure is a [`ParseError`] variant carrying the page
//! and cookie indices it was found at, so the CLI can report a single
//! diagnostic line naming the exact location. [`ParseError::class`]
//! partitions the variants into the three broad classes the process exit
//! status distinguishes.

use std::fmt;
use std::io;

use thiserror::Error;

/// The six optional string fields a cookie record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringField {
    Domain,
    Name,
    Path,
    Value,
    Comment,
    CommentUrl,
}

impl StringField {
    /// The JSON key this field is emitted under.
    pub fn key(self) -> &'static str {
        match self {
            StringField::Domain => "domain",
            StringField::Name => "name",
            StringField::Path => "path",
            StringField::Value => "value",
            StringField::Comment => "comment",
            StringField::CommentUrl => "commentUrl",
        }
    }
}

impl fmt::Display for StringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Broad failure classes, used by the CLI to pick a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The buffer ended before a required field or region.
    Truncated,
    /// The container magic, a page tag, or the footer tag did not match.
    MagicMismatch,
    /// A record, page, or container invariant was violated.
    Structural,
}

/// A validation failure. The first check that fails aborts the whole
/// parse; there is no recovery or skip-and-continue at any granularity.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("file too short, when checking magic and page count")]
    TruncatedHeader,
    #[error("file too short, when checking page sizes in header")]
    TruncatedPageTable,
    #[error("file too short, incomplete page {page}")]
    TruncatedPage { page: u32 },
    #[error("page {page} too short for page tag and cookie count")]
    TruncatedPageHeader { page: u32 },
    #[error("page {page} too short for cookie offsets")]
    TruncatedOffsetTable { page: u32 },
    #[error("cookie {cookie} in page {page} too short for cookie header")]
    TruncatedRecord { page: u32, cookie: u32 },
    #[error("file too short, for checksum, footer, and plist size")]
    TruncatedTrailer,

    #[error("bad magic - is this a cookie file?")]
    BadMagic,
    #[error("bad page tag in page {page} - is this a cookie file?")]
    BadPageTag { page: u32 },
    #[error("bad file footer - is this a cookie file?")]
    BadFooter,

    #[error("bad page header end in page {page}")]
    BadPageHeader { page: u32 },
    #[error("cookie {cookie} in page {page} has end past end of page")]
    RecordOverflowsPage { page: u32, cookie: u32 },
    #[error("cookie {cookie} in page {page} does not end with null terminated string")]
    MissingTerminator { page: u32, cookie: u32 },
    #[error("cookie {cookie} in page {page} {field} offset out of range")]
    OffsetOutOfRange {
        page: u32,
        cookie: u32,
        field: StringField,
    },
    #[error("bad file checksum: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("file length and plist data length mismatch")]
    TrailerLengthMismatch,
}

impl ParseError {
    /// Which failure class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            ParseError::TruncatedHeader
            | ParseError::TruncatedPageTable
            | ParseError::TruncatedPage { .. }
            | ParseError::TruncatedPageHeader { .. }
            | ParseError::TruncatedOffsetTable { .. }
            | ParseError::TruncatedRecord { .. }
            | ParseError::TruncatedTrailer => ErrorClass::Truncated,

            ParseError::BadMagic | ParseError::BadPageTag { .. } | ParseError::BadFooter => {
                ErrorClass::MagicMismatch
            }

            ParseError::BadPageHeader { .. }
            | ParseError::RecordOverflowsPage { .. }
            | ParseError::MissingTerminator { .. }
            | ParseError::OffsetOutOfRange { .. }
            | ParseError::ChecksumMismatch { .. }
            | ParseError::TrailerLengthMismatch => ErrorClass::Structural,
        }
    }
}

/// Error returned by the JSON export entry point: either the container
/// failed validation or the output sink failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}
