//! Error types for the danmaku segment decoder.

use thiserror::Error;

/// The error type for Protobuf decoding operations.
///
/// A failed element aborts the whole segment: once a tag or length is
/// misread the stream's alignment is lost, so there is no resynchronizing
/// on the next element.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Malformed input that fits no more specific category.
    #[error("invalid data: {message}")]
    InvalidData {
        /// Description of the malformation.
        message: String,
    },

    /// A length-delimited field or fixed-width value overruns the buffer.
    #[error("field overruns buffer: need {needed} bytes, have {available}")]
    BufferOverflow {
        /// Number of bytes the field claims.
        needed: usize,
        /// Number of bytes actually remaining.
        available: usize,
    },

    /// A known field appeared with the wrong wire type, or a group wire
    /// type (3/4) was encountered anywhere.
    #[error("field {field} has unexpected wire type {wire_type}")]
    WireTypeMismatch {
        /// Field number as it appeared on the wire.
        field: u32,
        /// The offending wire type bits.
        wire_type: u8,
    },

    /// A varint ran past 64 bits without terminating.
    #[error("varint exceeds 64 bits")]
    VarintOverflow,
}

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, ProtoError>;

impl ProtoError {
    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a buffer overflow error.
    pub fn buffer_overflow(needed: usize, available: usize) -> Self {
        Self::BufferOverflow { needed, available }
    }

    /// Create a wire type mismatch error.
    pub fn wire_type_mismatch(field: u32, wire_type: u8) -> Self {
        Self::WireTypeMismatch { field, wire_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtoError::buffer_overflow(16, 3);
        assert!(err.to_string().contains("need 16"));

        let err = ProtoError::wire_type_mismatch(7, 0);
        assert!(err.to_string().contains("field 7"));
    }
}
