//! Error handling for MD5 parsing, evaluation and validation

use thiserror::Error;

use crate::validation::ValidationReport;

/// Errors that can occur when working with MD5 meshes and animations
#[derive(Debug, Error)]
pub enum Md5Error {
    /// A record could not be parsed (only raised in strict mode)
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending record
        line: usize,
        /// What was wrong with the record
        message: String,
    },

    /// A required block was absent (only raised in strict mode)
    #[error("Missing block: {0}")]
    MissingBlock(&'static str),

    /// `MD5Version` is not 10 (only raised in strict mode)
    #[error("Unsupported MD5 version: {0}")]
    UnsupportedVersion(u32),

    /// The animation has no frames to evaluate
    #[error("Animation contains no frames")]
    EmptyAnimation,

    /// A caller-provided output buffer cannot hold the result
    #[error("Output buffer too small: need {required} elements, got {actual}")]
    BufferTooSmall {
        /// Elements the operation writes
        required: usize,
        /// Elements the buffer holds
        actual: usize,
    },

    /// A vertex index does not fit the 16-bit index buffer
    #[error("Vertex index {0} does not fit a 16-bit index buffer")]
    IndexOverflow(usize),

    /// The opt-in validation pass found problems
    #[error("Validation failed with {} issue(s)", .0.issues().len())]
    Validation(ValidationReport),
}

impl Md5Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Type alias for Results from MD5 operations
pub type Result<T> = std::result::Result<T, Md5Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Md5Error::parse(12, "expected joint parent index");
        assert_eq!(
            format!("{}", error),
            "Parse error at line 12: expected joint parent index"
        );

        let error = Md5Error::MissingBlock("joints");
        assert_eq!(format!("{}", error), "Missing block: joints");
    }
}
