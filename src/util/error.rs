//! Error types for the IGOR readers.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for IGOR decoding operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Version field names a layout this reader does not know
    #[error("Unsupported {what} version: {version}")]
    UnsupportedVersion { what: &'static str, version: i32 },

    /// Header checksum did not sum to zero
    #[error("Invalid binary wave: error in checksum, should be 0, is {0}")]
    Checksum(i32),

    /// Declared data byte count disagrees with point count and element size
    #[error("Wave data size mismatch: {data_bytes} bytes for {npnts} points of {item_size} bytes")]
    SizeMismatch {
        data_bytes: usize,
        npnts: usize,
        item_size: usize,
    },

    /// Numeric type code outside the known type table
    #[error("Unsupported numeric type code: {0:#x}")]
    UnsupportedNumericType(i16),

    /// Bytes that must be zero-filled were not
    #[error("Post-data padding not zero: {0}")]
    PaddingNotZero(String),

    /// Fewer bytes available than a structure declares
    #[error("Not enough data to unpack {structure}: need {needed} bytes, have {available}")]
    ShortBuffer {
        structure: String,
        needed: usize,
        available: usize,
    },

    /// Variable-length sections left bytes unconsumed
    #[error("Too much data ({0} extra bytes)")]
    TrailingData(usize),

    /// Folder end record without a matching folder start
    #[error("Folder end record with no open folder")]
    UnbalancedFolder,

    /// Record type not in the known type table
    #[error("Unknown record type: {0}")]
    UnknownRecordType(u16),

    /// Packing a field that has neither a value nor a default
    #[error("No value and no default for {structure}.{field}")]
    MissingValue { structure: String, field: String },

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a short buffer error for the named structure.
    pub fn short(structure: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::ShortBuffer {
            structure: structure.into(),
            needed,
            available,
        }
    }
}

/// Result type alias for IGOR operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::Checksum(25137);
        assert!(e.to_string().contains("checksum"));
        assert!(e.to_string().contains("25137"));

        let e = Error::short("WaveHeader5", 324, 320);
        assert!(e.to_string().contains("WaveHeader5"));
        assert!(e.to_string().contains("324"));
        assert!(e.to_string().contains("320"));

        let e = Error::UnsupportedVersion { what: "binary wave", version: 4 };
        assert_eq!(e.to_string(), "Unsupported binary wave version: 4");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
