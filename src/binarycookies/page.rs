//! Page decoding: tag, cookie-offset table, header terminator, and the
//! page's checksum contribution.

use std::io;

use tracing::trace;

use crate::base::error::{ExportError, ParseError};
use crate::binarycookies::cursor::{ByteCursor, ByteOrder};
use crate::binarycookies::record::parse_cookie;
use crate::json::emitter::JsonEmitter;

/// Tag bytes at the start of every page.
pub const PAGE_TAG: [u8; 4] = [0x00, 0x00, 0x01, 0x00];

/// Four zero bytes that close a page's offset table.
const PAGE_HEADER_END: [u8; 4] = [0x00; 4];

/// Parse one page, stream its cookies to `emitter` in offset-table order,
/// and return the page's checksum contribution.
///
/// The offset table's stored order determines output order; it is not
/// re-sorted.
pub fn parse_page<W: io::Write>(
    page: &[u8],
    page_index: u32,
    emitter: &mut JsonEmitter<W>,
) -> Result<u32, ExportError> {
    let short_header = || ParseError::TruncatedPageHeader { page: page_index };
    if page.len() < PAGE_TAG.len() + 4 {
        return Err(short_header().into());
    }
    let mut cur = ByteCursor::new(page);
    let tag = cur
        .read_bytes(PAGE_TAG.len())
        .map_err(|_| short_header())?;
    if tag != PAGE_TAG {
        return Err(ParseError::BadPageTag { page: page_index }.into());
    }
    let cookie_count = cur
        .read_u32(ByteOrder::Little)
        .map_err(|_| short_header())?;

    // The offsets plus the four terminator bytes must fit before anything
    // is allocated, so a bogus count cannot demand a huge table.
    let short_table = || ParseError::TruncatedOffsetTable { page: page_index };
    let fits = (cookie_count as usize)
        .checked_mul(4)
        .and_then(|len| len.checked_add(PAGE_HEADER_END.len()))
        .is_some_and(|needed| needed <= cur.remaining());
    if !fits {
        return Err(short_table().into());
    }
    let mut offsets = Vec::with_capacity(cookie_count as usize);
    for _ in 0..cookie_count {
        offsets.push(
            cur.read_u32(ByteOrder::Little)
                .map_err(|_| short_table())?,
        );
    }
    let header_end = cur
        .read_bytes(PAGE_HEADER_END.len())
        .map_err(|_| short_table())?;
    if header_end != PAGE_HEADER_END {
        return Err(ParseError::BadPageHeader { page: page_index }.into());
    }

    trace!(page = page_index, cookies = cookie_count, "parsing page");

    for (cookie_index, &offset) in offsets.iter().enumerate() {
        let record = parse_cookie(page, offset as usize, page_index, cookie_index as u32)?;
        emitter.emit_cookie(&record)?;
    }

    Ok(page_checksum(page))
}

/// Checksum contribution of one page: the sum of the first byte of every
/// 4-byte stride across the whole page range, wrapping mod 2^32.
///
/// Only one byte in four is counted. A trailing partial stride (page size
/// not a multiple of 4) still contributes its first byte; the walk never
/// reads past the declared page end.
pub fn page_checksum(page: &[u8]) -> u32 {
    page.iter()
        .step_by(4)
        .fold(0u32, |sum, &byte| sum.wrapping_add(u32::from(byte)))
}
