//! Bounds-checked sequential reader over an immutable byte buffer.

use thiserror::Error;

/// Returned when a read would run past the end of the buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unexpected end of data")]
pub struct InsufficientData;

/// Byte order for multi-byte reads.
///
/// The cookie container mixes both orders: the file header and trailer
/// are big-endian, everything inside a page is little-endian. That split
/// is a property of the format and both decode paths are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// Sequential reader over a byte slice.
///
/// Every read either returns the decoded value and advances the position
/// by the width consumed, or fails with [`InsufficientData`] and leaves
/// the position unchanged.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take the next `len` bytes without decoding them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], InsufficientData> {
        let end = self.pos.checked_add(len).ok_or(InsufficientData)?;
        let bytes = self.buf.get(self.pos..end).ok_or(InsufficientData)?;
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32, InsufficientData> {
        let bytes = self.read_array::<4>()?;
        Ok(match order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }

    pub fn read_u64(&mut self, order: ByteOrder) -> Result<u64, InsufficientData> {
        let bytes = self.read_array::<8>()?;
        Ok(match order {
            ByteOrder::Big => u64::from_be_bytes(bytes),
            ByteOrder::Little => u64::from_le_bytes(bytes),
        })
    }

    /// Read a little-endian IEEE-754 double by reinterpreting the raw
    /// 64 bits.
    pub fn read_f64(&mut self) -> Result<f64, InsufficientData> {
        Ok(f64::from_bits(self.read_u64(ByteOrder::Little)?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], InsufficientData> {
        self.read_bytes(N)?.try_into().map_err(|_| InsufficientData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u32_both_orders() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            ByteCursor::new(&data).read_u32(ByteOrder::Big),
            Ok(0x0102_0304)
        );
        assert_eq!(
            ByteCursor::new(&data).read_u32(ByteOrder::Little),
            Ok(0x0403_0201)
        );
    }

    #[test]
    fn test_reads_advance_position() {
        let data = [0u8; 12];
        let mut cur = ByteCursor::new(&data);
        cur.read_u32(ByteOrder::Big).unwrap();
        assert_eq!(cur.position(), 4);
        cur.read_u64(ByteOrder::Little).unwrap();
        assert_eq!(cur.position(), 12);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn test_failed_read_leaves_position_unchanged() {
        let data = [0x01, 0x02];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_u32(ByteOrder::Big), Err(InsufficientData));
        assert_eq!(cur.position(), 0);
        // The two bytes are still readable afterwards.
        assert_eq!(cur.read_bytes(2), Ok(&data[..]));
    }

    #[test]
    fn test_read_f64_reinterprets_bits() {
        let data = 1.5f64.to_le_bytes();
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_f64(), Ok(1.5));
    }

    #[test]
    fn test_read_bytes_to_exact_end() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_bytes(3), Ok(&data[..]));
        assert_eq!(cur.read_bytes(1), Err(InsufficientData));
    }

    #[test]
    fn test_empty_buffer() {
        let mut cur = ByteCursor::new(&[]);
        assert_eq!(cur.read_u32(ByteOrder::Little), Err(InsufficientData));
        assert_eq!(cur.read_f64(), Err(InsufficientData));
        assert_eq!(cur.read_bytes(0), Ok(&[][..]));
    }
}
