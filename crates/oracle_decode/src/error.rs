//! Decoder errors.
//!
//! Every variant means the memory image does not match the pinned layout or
//! a caller passed the wrong side. None of them are retried.

use crate::moves::Side;

/// Decode result type
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Decoder errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Piece code outside the table (0, 11, or above 15)
    #[error("unmapped piece code: {code}")]
    UnmappedPiece {
        /// Raw code
        code: u8,
    },

    /// Square code off the playable 9x9 area
    #[error("invalid square code: {code}")]
    InvalidSquare {
        /// Raw code
        code: u8,
    },

    /// Drop decoding asked for a board move
    #[error("source {src} is not a drop")]
    NotADrop {
        /// Raw source code
        src: u8,
    },

    /// Board-move slot holds a drop
    #[error("source {src} is a drop, expected a board move")]
    UnexpectedDrop {
        /// Raw source code
        src: u8,
    },

    /// Drop source whose arithmetic leaves the piece range for that side
    #[error("drop source {src} out of range for {side} side")]
    DropOutOfRange {
        /// Side that made the move
        side: Side,
        /// Raw source code
        src: u8,
    },

    /// Piece that can never be in hand
    #[error("piece code {code} cannot be dropped")]
    NotDroppable {
        /// Decoded piece code
        code: u8,
    },

    /// Formation code outside the table
    #[error("unknown formation code: {code}")]
    UnknownFormation {
        /// Raw code
        code: u8,
    },

    /// Trace tag that names no trigger
    #[error("unknown trigger tag: {tag}")]
    UnknownTrigger {
        /// Tag text
        tag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DecodeError::UnmappedPiece { code: 11 }.to_string(),
            "unmapped piece code: 11"
        );
        assert_eq!(
            DecodeError::DropOutOfRange {
                side: Side::Engine,
                src: 215
            }
            .to_string(),
            "drop source 215 out of range for engine side"
        );
    }
}
