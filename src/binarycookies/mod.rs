//! Safari binary cookie container (`Cookies.binarycookies`) decoding.
//!
//! ## File format
//!
//! The file consists of:
//! 1. Header: "cook" magic, page count, and per-page byte sizes, all
//!    big-endian
//! 2. Pages: each a tag, a little-endian cookie count, a little-endian
//!    offset table, four zero terminator bytes, and the cookie records
//!    the table points at
//! 3. Trailer: big-endian checksum, footer tag, big-endian plist size,
//!    and an opaque plist payload (length-checked, not decoded)
//!
//! The endianness split between the header/trailer and the page interiors
//! is a property of the format. So is the checksum: it sums only the
//! first byte of every 4-byte stride of every page, mod 2^32.
//!
//! ## References
//!
//! - <https://github.com/libyal/dtformats/blob/main/documentation/Safari%20Cookies.asciidoc>
//! - <https://github.com/als0052/BinaryCookieReader>

pub mod container;
pub mod cursor;
pub mod page;
pub mod record;
