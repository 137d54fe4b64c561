//! Low-level Protobuf wire-format reading over a byte slice.
//!
//! The reader is a plain cursor: no copies, no allocation. Length-delimited
//! payloads are handed back as subslices of the input, so element parsing
//! borrows straight from the segment buffer.

use crate::error::{ProtoError, Result};

/// Protobuf wire types.
///
/// Groups (3/4) are recognized so the reader can name them in errors, but
/// any attempt to skip or read one is rejected: the formats decoded here
/// never contain groups, and a group tag in practice means the stream is
/// corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// Varint-encoded integer (wire type 0).
    Varint,
    /// Fixed 64-bit value (wire type 1).
    Fixed64,
    /// Length-delimited bytes (wire type 2).
    LengthDelimited,
    /// Group start (wire type 3, rejected).
    StartGroup,
    /// Group end (wire type 4, rejected).
    EndGroup,
    /// Fixed 32-bit value (wire type 5).
    Fixed32,
}

impl WireType {
    /// Decode the low three bits of a tag.
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// The raw wire type bits, for error reporting.
    pub fn bits(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::StartGroup => 3,
            Self::EndGroup => 4,
            Self::Fixed32 => 5,
        }
    }
}

/// A cursor over a Protobuf-encoded byte slice.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True when the whole buffer has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read a varint of up to 64 bits.
    ///
    /// Seven payload bits per byte, least significant group first; the byte
    /// with a clear MSB terminates. Running past 64 bits is
    /// [`ProtoError::VarintOverflow`]; running off the buffer is
    /// [`ProtoError::BufferOverflow`].
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        while shift < 64 {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(ProtoError::buffer_overflow(1, 0));
            };
            self.pos += 1;
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(ProtoError::VarintOverflow)
    }

    /// Read a field tag, returning the field number and wire type.
    pub fn read_tag(&mut self) -> Result<(u32, WireType)> {
        let tag = self.read_varint()?;
        let field = (tag >> 3) as u32;
        let bits = (tag & 0x07) as u8;
        let wire = WireType::from_bits(bits)
            .ok_or_else(|| ProtoError::invalid_data(format!("reserved wire type {}", bits)))?;
        Ok((field, wire))
    }

    /// Read a length-delimited payload and return it as a subslice.
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()? as usize;
        if len > self.remaining() {
            return Err(ProtoError::buffer_overflow(len, self.remaining()));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Advance past a field of the given wire type.
    ///
    /// `field` is only used for error context. Group wire types are
    /// rejected as a mismatch, mirroring how an unknown-but-skippable field
    /// differs from a structurally unusable one.
    pub fn skip(&mut self, field: u32, wire: WireType) -> Result<()> {
        match wire {
            WireType::Varint => {
                self.read_varint()?;
                Ok(())
            }
            WireType::Fixed64 => self.advance(8),
            WireType::LengthDelimited => {
                self.read_bytes()?;
                Ok(())
            }
            WireType::Fixed32 => self.advance(4),
            WireType::StartGroup | WireType::EndGroup => {
                Err(ProtoError::wire_type_mismatch(field, wire.bits()))
            }
        }
    }

    fn advance(&mut self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(ProtoError::buffer_overflow(n, self.remaining()));
        }
        self.pos += n;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_single_byte() {
        let mut r = WireReader::new(&[0x05]);
        assert_eq!(r.read_varint().unwrap(), 5);
        assert!(r.is_empty());
    }

    #[test]
    fn test_varint_multi_byte() {
        // 300 = 0b1_0010_1100 -> AC 02
        let mut r = WireReader::new(&[0xAC, 0x02]);
        assert_eq!(r.read_varint().unwrap(), 300);
    }

    #[test]
    fn test_varint_max_u64() {
        let mut r = WireReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert_eq!(r.read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn test_varint_truncated() {
        let mut r = WireReader::new(&[0x80, 0x80]);
        assert!(matches!(
            r.read_varint(),
            Err(ProtoError::BufferOverflow { .. })
        ));
    }

    #[test]
    fn test_varint_overflow() {
        let mut r = WireReader::new(&[0xFF; 11]);
        assert_eq!(r.read_varint(), Err(ProtoError::VarintOverflow));
    }

    #[test]
    fn test_read_tag() {
        // field 7, wire type 2 -> tag 0x3A
        let mut r = WireReader::new(&[0x3A]);
        assert_eq!(r.read_tag().unwrap(), (7, WireType::LengthDelimited));
    }

    #[test]
    fn test_read_tag_reserved_type() {
        // wire type 6 is reserved
        let mut r = WireReader::new(&[0x06]);
        assert!(matches!(r.read_tag(), Err(ProtoError::InvalidData { .. })));
    }

    #[test]
    fn test_read_bytes_overrun() {
        // claims 10 bytes, has 2
        let mut r = WireReader::new(&[0x0A, 0x01, 0x02]);
        assert_eq!(r.read_bytes(), Err(ProtoError::buffer_overflow(10, 2)));
    }

    #[test]
    fn test_skip_fixed_widths() {
        let mut r = WireReader::new(&[0; 12]);
        r.skip(3, WireType::Fixed64).unwrap();
        r.skip(4, WireType::Fixed32).unwrap();
        assert_eq!(r.remaining(), 0);
        assert!(matches!(
            r.skip(5, WireType::Fixed32),
            Err(ProtoError::BufferOverflow { .. })
        ));
    }

    #[test]
    fn test_skip_group_rejected() {
        let mut r = WireReader::new(&[0x00]);
        assert_eq!(
            r.skip(9, WireType::StartGroup),
            Err(ProtoError::wire_type_mismatch(9, 3))
        );
    }
}
