//! Trace errors.

use oracle_core::{ParseError, Version};
use oracle_decode::DecodeError;

/// Trace result type
pub type TraceResult<T> = Result<T, TraceError>;

/// Errors reading or writing trace lines
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Line has no `tag: ` prefix
    #[error("line {line}: missing tag separator")]
    MissingSeparator {
        /// 1-based line number
        line: usize,
    },

    /// Tag names no trigger
    #[error("line {line}: {source}")]
    UnknownTag {
        /// 1-based line number
        line: usize,
        /// Lookup failure
        source: DecodeError,
    },

    /// Body is not a valid rendered value
    #[error("line {line}: {source}")]
    Body {
        /// 1-based line number
        line: usize,
        /// Parser failure
        source: ParseError,
    },

    /// Body parsed but is not a record
    #[error("line {line}: body is not a record")]
    NotARecord {
        /// 1-based line number
        line: usize,
    },

    /// Layout header could not be parsed
    #[error("line {line}: bad layout header '{text}'")]
    BadHeader {
        /// 1-based line number
        line: usize,
        /// Header text
        text: String,
    },

    /// Layout header differs from the expected revision
    #[error("layout revision mismatch: expected {expected}, found {actual}")]
    LayoutMismatch {
        /// Expected revision
        expected: Version,
        /// Revision in the trace
        actual: Version,
    },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// Replace the line number on line-scoped errors
    #[must_use]
    pub fn at_line(self, at: usize) -> Self {
        match self {
            Self::MissingSeparator { .. } => Self::MissingSeparator { line: at },
            Self::UnknownTag { source, .. } => Self::UnknownTag { line: at, source },
            Self::Body { source, .. } => Self::Body { line: at, source },
            Self::NotARecord { .. } => Self::NotARecord { line: at },
            Self::BadHeader { text, .. } => Self::BadHeader { line: at, text },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line() {
        let err = TraceError::NotARecord { line: 0 }.at_line(4);
        assert_eq!(err.to_string(), "line 4: body is not a record");
    }

    #[test]
    fn test_at_line_keeps_unscoped_errors() {
        let err = TraceError::LayoutMismatch {
            expected: Version::new(1, 0, 0),
            actual: Version::new(2, 0, 0),
        }
        .at_line(9);
        assert_eq!(
            err.to_string(),
            "layout revision mismatch: expected 1.0.0, found 2.0.0"
        );
    }
}
