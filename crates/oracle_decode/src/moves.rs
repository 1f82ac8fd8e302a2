//! Moves as the engine stores them.
//!
//! A move is three bytes: destination, source and a promotion flag. Sources
//! of 200 and above are drops, and the dropped piece is folded into the
//! source with arithmetic that mirrors between the two sides:
//!
//! | side   | encode          | decode          |
//! |--------|-----------------|-----------------|
//! | human  | `src = pt + 211`| `pt = src - 211`|
//! | engine | `src = 209 - pt`| `pt = 209 - src`|
//!
//! The two formulas are not interchangeable. Every drop decode names its side.

use crate::error::{DecodeError, DecodeResult};
use crate::memory::Memory;
use crate::piece::Piece;
use crate::square::Square;
use oracle_core::{Record, ToValue, Value};
use std::fmt;

/// Sources at or above this value are drops
pub const DROP_THRESHOLD: u8 = 200;

const HUMAN_DROP_BASE: u8 = 211;
const ENGINE_DROP_BASE: u8 = 209;

/// Which player made a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The human player
    Human,
    /// The reference engine
    Engine,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => f.write_str("human"),
            Self::Engine => f.write_str("engine"),
        }
    }
}

/// Whether a raw source encodes a drop
#[must_use]
pub const fn is_drop(src: u8) -> bool {
    src >= DROP_THRESHOLD
}

/// Piece code carried by a drop source
///
/// # Errors
///
/// Returns error if `src` is not a drop or the side's arithmetic underflows
pub fn drop_piece_code(side: Side, src: u8) -> DecodeResult<u8> {
    if !is_drop(src) {
        return Err(DecodeError::NotADrop { src });
    }
    let code = match side {
        Side::Human => src.checked_sub(HUMAN_DROP_BASE),
        Side::Engine => ENGINE_DROP_BASE.checked_sub(src),
    };
    code.ok_or(DecodeError::DropOutOfRange { side, src })
}

/// Drop source for a piece code, wrapping like the engine's byte arithmetic
#[must_use]
pub const fn drop_src(side: Side, code: u8) -> u8 {
    match side {
        Side::Human => code.wrapping_add(HUMAN_DROP_BASE),
        Side::Engine => ENGINE_DROP_BASE.wrapping_sub(code),
    }
}

/// Move bytes exactly as read from memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawMove {
    /// Source square, or drop code
    pub src: u8,
    /// Destination square
    pub dst: u8,
    /// Promotion flag
    pub promotion: bool,
}

impl RawMove {
    /// Raw move from its fields
    #[must_use]
    pub const fn new(src: u8, dst: u8, promotion: bool) -> Self {
        Self {
            src,
            dst,
            promotion,
        }
    }

    /// Raw drop of `piece` to `dst` by `side`
    #[must_use]
    pub const fn drop(side: Side, piece: Piece, dst: u8) -> Self {
        Self::new(drop_src(side, piece.code()), dst, false)
    }

    /// Read from the three addresses of a move slot
    pub fn read(mem: &dyn Memory, slot: &MoveSlot) -> Self {
        Self {
            src: mem.read(slot.src),
            dst: mem.read(slot.dst),
            promotion: mem.read(slot.promotion) != 0,
        }
    }

    /// Whether this is a drop
    #[must_use]
    pub const fn is_drop(&self) -> bool {
        is_drop(self.src)
    }

    /// Interpret the bytes as a move by `side`
    ///
    /// # Errors
    ///
    /// Returns error if a square is off the board or the drop piece is
    /// unmapped or cannot be in hand
    pub fn decode(&self, side: Side) -> DecodeResult<Move> {
        let dst = Square::new(self.dst)?;
        if !self.is_drop() {
            return Ok(Move::Board {
                src: Square::new(self.src)?,
                dst,
                promotion: self.promotion,
            });
        }
        let piece = Piece::from_code(drop_piece_code(side, self.src)?)?;
        if !piece.is_hand() {
            return Err(DecodeError::NotDroppable { code: piece.code() });
        }
        Ok(Move::Drop { dst, piece })
    }
}

impl ToValue for RawMove {
    fn to_value(&self) -> Value {
        Record::new("RawMove")
            .field("dst", self.dst)
            .field("promotion", self.promotion)
            .field("src", self.src)
            .to_value()
    }
}

/// Addresses of one move slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSlot {
    /// Destination byte
    pub dst: u16,
    /// Source byte
    pub src: u16,
    /// Promotion flag byte
    pub promotion: u16,
}

/// Decoded move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Piece moved on the board
    Board {
        /// From
        src: Square,
        /// To
        dst: Square,
        /// Promotes on arrival
        promotion: bool,
    },
    /// Piece placed from hand
    Drop {
        /// Target square
        dst: Square,
        /// Dropped piece
        piece: Piece,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;
    use proptest::prelude::*;

    #[test]
    fn test_board_move() {
        let mv = RawMove::new(12, 50, false).decode(Side::Engine).unwrap();
        assert_eq!(
            mv,
            Move::Board {
                src: Square::new(12).unwrap(),
                dst: Square::new(50).unwrap(),
                promotion: false,
            }
        );
        assert_eq!(mv, RawMove::new(12, 50, false).decode(Side::Human).unwrap());
    }

    #[test]
    fn test_engine_pawn_drop() {
        let raw = RawMove::drop(Side::Engine, Piece::Pawn, 50);
        assert_eq!(raw.src, 201);
        assert_eq!(
            raw.decode(Side::Engine).unwrap(),
            Move::Drop {
                dst: Square::new(50).unwrap(),
                piece: Piece::Pawn,
            }
        );
    }

    #[test]
    fn test_human_rook_drop() {
        let raw = RawMove::new(213, 50, false);
        assert_eq!(
            raw.decode(Side::Human).unwrap(),
            Move::Drop {
                dst: Square::new(50).unwrap(),
                piece: Piece::Rook,
            }
        );
    }

    #[test]
    fn test_sides_are_not_interchangeable() {
        // 201 is an engine pawn but underflows for the human side.
        assert_eq!(
            drop_piece_code(Side::Human, 201),
            Err(DecodeError::DropOutOfRange {
                side: Side::Human,
                src: 201
            })
        );
        // 219 is a human pawn but underflows for the engine side.
        assert_eq!(drop_piece_code(Side::Human, 219), Ok(8));
        assert!(drop_piece_code(Side::Engine, 219).is_err());
    }

    #[test]
    fn test_non_drop_rejected() {
        assert_eq!(
            drop_piece_code(Side::Engine, 199),
            Err(DecodeError::NotADrop { src: 199 })
        );
    }

    #[test]
    fn test_king_drop_rejected() {
        let raw = RawMove::new(drop_src(Side::Human, 1), 50, false);
        assert_eq!(
            raw.decode(Side::Human),
            Err(DecodeError::NotDroppable { code: 1 })
        );
    }

    #[test]
    fn test_invalid_destination() {
        assert_eq!(
            RawMove::new(12, 0, false).decode(Side::Engine),
            Err(DecodeError::InvalidSquare { code: 0 })
        );
    }

    #[test]
    fn test_read_slot() {
        let slot = MoveSlot {
            dst: 0x5BB,
            src: 0x5BC,
            promotion: 0x5C0,
        };
        let mem = MemoryImage::new().with(0x5BB, 50).with(0x5BC, 12).with(0x5C0, 1);
        assert_eq!(RawMove::read(&mem, &slot), RawMove::new(12, 50, true));
    }

    #[test]
    fn test_raw_move_value() {
        let v = RawMove::new(12, 50, false).to_value();
        assert_eq!(oracle_core::render(&v), "{dst=50, promotion=false, src=12}");
    }

    const CODES: [u8; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 13, 14, 15];

    proptest! {
        #[test]
        fn prop_is_drop_threshold(src in 0u8..=255) {
            prop_assert_eq!(is_drop(src), src >= 200);
        }

        #[test]
        fn prop_human_drop_roundtrip(i in 0usize..14) {
            let pt = CODES[i];
            let src = drop_src(Side::Human, pt);
            prop_assert_eq!(src, pt + 211);
            prop_assert_eq!(drop_piece_code(Side::Human, src), Ok(pt));
        }

        #[test]
        fn prop_engine_drop_roundtrip(i in 0usize..14) {
            let pt = CODES[i];
            let src = drop_src(Side::Engine, pt);
            prop_assert_eq!(src, 209 - pt);
            if is_drop(src) {
                prop_assert_eq!(drop_piece_code(Side::Engine, src), Ok(pt));
            }
        }

        #[test]
        fn prop_hand_pieces_decode_per_side(i in 0usize..7, dst_x in 1u8..=9, dst_y in 1u8..=9) {
            let piece = Piece::HAND[i];
            let dst = crate::square::xy2sq(dst_x, dst_y);
            for side in [Side::Human, Side::Engine] {
                let mv = RawMove::drop(side, piece, dst).decode(side).unwrap();
                prop_assert_eq!(mv, Move::Drop { dst: Square::new(dst).unwrap(), piece });
            }
        }
    }
}
