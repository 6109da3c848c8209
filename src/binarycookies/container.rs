//! Top-level container walk: header, page-size table, pages, trailer.

use std::io;

use tracing::debug;

use crate::base::error::{ExportError, ParseError};
use crate::binarycookies::cursor::{ByteCursor, ByteOrder};
use crate::binarycookies::page::parse_page;
use crate::json::emitter::JsonEmitter;

/// Magic bytes at the start of a binary cookie file.
pub const MAGIC: [u8; 4] = *b"cook";

/// Footer tag sitting between the checksum and the trailing plist.
pub const FOOTER: [u8; 4] = [0x07, 0x17, 0x20, 0x05];

/// Checksum field, footer tag, and plist-size field.
const TRAILER_FIXED_LEN: usize = 4 + FOOTER.len() + 4;

/// Parse `data` as a complete binary cookie container and stream the
/// decoded cookies to `out` as one JSON document.
///
/// The document shape is `{"cookies":[...]}` with one object per record,
/// in page order and then offset-table order. Emission is interleaved
/// with validation: a failure found late (the checksum or trailer checks)
/// leaves a partial document already written to `out`. Pass a `Vec<u8>`
/// and flush on success if atomic output is required.
///
/// The trailing plist payload is length-checked only, never decoded.
pub fn export_json<W: io::Write>(data: &[u8], out: W) -> Result<(), ExportError> {
    let mut emitter = JsonEmitter::new(out);

    if data.len() < MAGIC.len() + 4 {
        return Err(ParseError::TruncatedHeader.into());
    }
    let mut cur = ByteCursor::new(data);
    let magic = cur
        .read_bytes(MAGIC.len())
        .map_err(|_| ParseError::TruncatedHeader)?;
    if magic != MAGIC {
        return Err(ParseError::BadMagic.into());
    }
    let page_count = cur
        .read_u32(ByteOrder::Big)
        .map_err(|_| ParseError::TruncatedHeader)?;

    let table_fits = (page_count as usize)
        .checked_mul(4)
        .is_some_and(|len| len <= cur.remaining());
    if !table_fits {
        return Err(ParseError::TruncatedPageTable.into());
    }
    let mut page_sizes = Vec::with_capacity(page_count as usize);
    for _ in 0..page_count {
        page_sizes.push(
            cur.read_u32(ByteOrder::Big)
                .map_err(|_| ParseError::TruncatedPageTable)?,
        );
    }

    debug!(pages = page_count, "parsing cookie container");

    emitter.begin_document()?;

    let mut checksum: u32 = 0;
    let mut page_start = cur.position();
    for (page_index, &page_size) in page_sizes.iter().enumerate() {
        let page_index = page_index as u32;
        let page_end = page_start
            .checked_add(page_size as usize)
            .filter(|end| *end <= data.len())
            .ok_or(ParseError::TruncatedPage { page: page_index })?;
        let partial = parse_page(&data[page_start..page_end], page_index, &mut emitter)?;
        checksum = checksum.wrapping_add(partial);
        page_start = page_end;
    }

    let mut trailer = ByteCursor::new(&data[page_start..]);
    if trailer.remaining() < TRAILER_FIXED_LEN {
        return Err(ParseError::TruncatedTrailer.into());
    }
    let stored = trailer
        .read_u32(ByteOrder::Big)
        .map_err(|_| ParseError::TruncatedTrailer)?;
    if stored != checksum {
        return Err(ParseError::ChecksumMismatch {
            stored,
            computed: checksum,
        }
        .into());
    }
    let footer = trailer
        .read_bytes(FOOTER.len())
        .map_err(|_| ParseError::TruncatedTrailer)?;
    if footer != FOOTER {
        return Err(ParseError::BadFooter.into());
    }
    let plist_size = trailer
        .read_u32(ByteOrder::Big)
        .map_err(|_| ParseError::TruncatedTrailer)?;
    if trailer.remaining() != plist_size as usize {
        return Err(ParseError::TrailerLengthMismatch.into());
    }

    // The closing bytes are withheld until the trailer has been verified.
    emitter.end_document()?;
    Ok(())
}
