//! Error handling for wglv containers

use std::io;
use thiserror::Error;

/// Errors that can occur when reading or writing wglv containers
#[derive(Debug, Error)]
pub enum WglError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with `wglv`
    #[error("Invalid magic value: expected 'wglv', found '{found}'")]
    InvalidMagic {
        /// The four magic bytes found, lossily decoded
        found: String,
    },

    /// The container version is newer than this reader understands
    #[error("Unsupported wglv version: {0} (maximum {max})", max = crate::MAX_VERSION)]
    UnsupportedVersion(u32),

    /// A directory entry points outside the file
    #[error("Lump '{tag}' at offset {offset} with length {length} exceeds file size {file_size}")]
    LumpOutOfBounds {
        /// Lump tag
        tag: String,
        /// Offset from the directory
        offset: u32,
        /// Length from the directory
        length: u32,
        /// Size of the whole file
        file_size: usize,
    },

    /// A required lump is absent
    #[error("Missing lump: {0}")]
    MissingLump(&'static str),

    /// A lump's contents are inconsistent
    #[error("Invalid lump '{tag}': {reason}")]
    InvalidLump {
        /// Lump tag
        tag: &'static str,
        /// What is wrong
        reason: String,
    },

    /// Data does not fit the 32-bit offsets of the format
    #[error("Lump '{0}' is too large for a wglv container")]
    TooLarge(&'static str),
}

/// Type alias for Results from wglv operations
pub type Result<T> = std::result::Result<T, WglError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = WglError::InvalidMagic {
            found: "RIFF".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Invalid magic value: expected 'wglv', found 'RIFF'"
        );

        let error = WglError::UnsupportedVersion(2);
        assert_eq!(
            format!("{}", error),
            "Unsupported wglv version: 2 (maximum 1)"
        );
    }
}
