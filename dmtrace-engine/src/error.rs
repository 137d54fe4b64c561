//! Error types for the cracking engine.
//!
//! An exhausted search is not an error: the crackers return empty results
//! when nothing matches. Errors here are about the world around the search
//! (the cache file, the fingerprint input, lifecycle misuse).

use std::io;
use thiserror::Error;

/// The error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The table cache file could not be read or written.
    #[error("cache I/O error: {0}")]
    CacheIo(#[from] io::Error),

    /// The cache file does not start with the expected magic number.
    #[error("invalid cache magic: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic {
        /// Expected magic value.
        expected: u32,
        /// Magic value found in the file.
        found: u32,
    },

    /// The cache file carries an unsupported format version.
    #[error("unsupported cache version: expected {expected}, found {found}")]
    UnsupportedVersion {
        /// Version this build writes and reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// The cache file payload is truncated or not a whole number of entries.
    #[error("malformed cache file: {size} bytes after header")]
    MalformedCache {
        /// Payload size in bytes.
        size: u64,
    },

    /// The fingerprint string is not 1-8 hex characters.
    #[error("invalid fingerprint {input:?}: {reason}")]
    InvalidFingerprint {
        /// The offending input, as given.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A MITM operation was requested before `init_mitm`.
    #[error("MITM engine is not initialized")]
    NotInitialized,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: u32, found: u32) -> Self {
        Self::InvalidMagic { expected, found }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(expected: u32, found: u32) -> Self {
        Self::UnsupportedVersion { expected, found }
    }

    /// Create an invalid fingerprint error.
    pub fn invalid_fingerprint(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFingerprint {
            input: input.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::invalid_magic(0x4D49544D, 0xDEADBEEF);
        assert!(err.to_string().contains("0x4d49544d"));

        let err = EngineError::invalid_fingerprint("xyz", "not hexadecimal");
        assert!(err.to_string().contains("xyz"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::CacheIo(_)));
    }
}
