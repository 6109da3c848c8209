//! Cookie record decoding and validation.
//!
//! A record is a fixed 56-byte header followed by a variable-length
//! region holding null-terminated strings. All header fields are
//! little-endian:
//!
//! | field            | type | notes                                    |
//! |------------------|------|------------------------------------------|
//! | size             | u32  | declared total record length, validation only |
//! | version          | u32  | opaque                                   |
//! | flags            | u32  | opaque                                   |
//! | hasPort          | u32  | opaque, never interpreted                |
//! | domain offset    | u32  | 0 = absent, else strictly inside the record |
//! | name offset      | u32  | ditto                                    |
//! | path offset      | u32  | ditto                                    |
//! | value offset     | u32  | ditto                                    |
//! | comment offset   | u32  | ditto                                    |
//! | commentUrl offset| u32  | ditto                                    |
//! | expiry           | f64  | opaque units, emitted as stored          |
//! | creation         | f64  | opaque units, emitted as stored          |
//!
//! The byte at `size - 1` must be zero: it closes the last string in the
//! variable region.

use crate::base::error::{ParseError, StringField};
use crate::binarycookies::cursor::{ByteCursor, ByteOrder, InsufficientData};

/// Fixed header length: ten u32 fields plus two f64 timestamps.
pub const RECORD_HEADER_LEN: usize = 56;

const STRING_FIELDS: [StringField; 6] = [
    StringField::Domain,
    StringField::Name,
    StringField::Path,
    StringField::Value,
    StringField::Comment,
    StringField::CommentUrl,
];

/// One decoded cookie record.
///
/// String fields borrow from the page the record was parsed out of and
/// are raw bytes, not validated as UTF-8; the emitter passes bytes at or
/// above 0x20 through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieRecord<'a> {
    pub version: u32,
    pub flags: u32,
    /// Opaque. Possibly marks a trailing port number, but no extra bytes
    /// are ever read based on it.
    pub has_port: u32,
    pub domain: Option<&'a [u8]>,
    pub name: Option<&'a [u8]>,
    pub path: Option<&'a [u8]>,
    pub value: Option<&'a [u8]>,
    pub comment: Option<&'a [u8]>,
    pub comment_url: Option<&'a [u8]>,
    pub expiry: f64,
    pub creation: f64,
}

struct RecordHeader {
    size: u32,
    version: u32,
    flags: u32,
    has_port: u32,
    string_offsets: [u32; 6],
    expiry: f64,
    creation: f64,
}

fn read_header(cur: &mut ByteCursor<'_>) -> Result<RecordHeader, InsufficientData> {
    let size = cur.read_u32(ByteOrder::Little)?;
    let version = cur.read_u32(ByteOrder::Little)?;
    let flags = cur.read_u32(ByteOrder::Little)?;
    let has_port = cur.read_u32(ByteOrder::Little)?;
    let mut string_offsets = [0u32; 6];
    for slot in &mut string_offsets {
        *slot = cur.read_u32(ByteOrder::Little)?;
    }
    let expiry = cur.read_f64()?;
    let creation = cur.read_f64()?;
    Ok(RecordHeader {
        size,
        version,
        flags,
        has_port,
        string_offsets,
        expiry,
        creation,
    })
}

/// Parse and validate the cookie record starting at `record_start` within
/// `page`. `page_index` and `cookie_index` only label errors.
pub fn parse_cookie<'a>(
    page: &'a [u8],
    record_start: usize,
    page_index: u32,
    cookie_index: u32,
) -> Result<CookieRecord<'a>, ParseError> {
    let truncated = || ParseError::TruncatedRecord {
        page: page_index,
        cookie: cookie_index,
    };
    let record = page.get(record_start..).ok_or_else(truncated)?;
    if record.len() < RECORD_HEADER_LEN {
        return Err(truncated());
    }
    let mut cur = ByteCursor::new(record);
    let header = read_header(&mut cur).map_err(|_| truncated())?;

    // recordEnd = recordStart + size, which may never pass the page end.
    let record_end = record_start
        .checked_add(header.size as usize)
        .filter(|end| *end <= page.len())
        .ok_or(ParseError::RecordOverflowsPage {
            page: page_index,
            cookie: cookie_index,
        })?;

    // The last byte of the declared range closes the final string.
    if header.size == 0 || page[record_end - 1] != 0 {
        return Err(ParseError::MissingTerminator {
            page: page_index,
            cookie: cookie_index,
        });
    }

    let mut strings: [Option<&'a [u8]>; 6] = [None; 6];
    for (i, &offset) in header.string_offsets.iter().enumerate() {
        if offset == 0 {
            continue;
        }
        if offset >= header.size {
            return Err(ParseError::OffsetOutOfRange {
                page: page_index,
                cookie: cookie_index,
                field: STRING_FIELDS[i],
            });
        }
        strings[i] = Some(string_at(page, record_start + offset as usize, record_end));
    }
    let [domain, name, path, value, comment, comment_url] = strings;

    Ok(CookieRecord {
        version: header.version,
        flags: header.flags,
        has_port: header.has_port,
        domain,
        name,
        path,
        value,
        comment,
        comment_url,
        expiry: header.expiry,
        creation: header.creation,
    })
}

/// Null-terminated string starting at `start`, with the terminator scan
/// capped at `record_end`. The sentinel check above guarantees a zero
/// exists in `start..record_end`, so a crafted record cannot leak bytes
/// past its declared end.
fn string_at(page: &[u8], start: usize, record_end: usize) -> &[u8] {
    let region = &page[start..record_end];
    let len = region.iter().position(|&b| b == 0).unwrap_or(region.len());
    &region[..len]
}
