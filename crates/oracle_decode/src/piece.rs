//! Piece codes.
//!
//! Codes run 1 to 15 with 11 left unmapped. Codes 9 and up are the
//! promoted forms; only the seven unpromoted non-king pieces go to hand.

use crate::error::{DecodeError, DecodeResult};
use oracle_core::{ToValue, Value};

/// Piece identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Piece {
    /// 玉
    King = 1,
    /// 飛
    Rook = 2,
    /// 角
    Bishop = 3,
    /// 金
    Gold = 4,
    /// 銀
    Silver = 5,
    /// 桂
    Knight = 6,
    /// 香
    Lance = 7,
    /// 歩
    Pawn = 8,
    /// 龍
    Dragon = 9,
    /// 馬
    Horse = 10,
    /// 全
    ProSilver = 12,
    /// 圭
    ProKnight = 13,
    /// 杏
    ProLance = 14,
    /// と
    ProPawn = 15,
}

impl Piece {
    /// Every mapped piece, in code order
    pub const ALL: [Self; 14] = [
        Self::King,
        Self::Rook,
        Self::Bishop,
        Self::Gold,
        Self::Silver,
        Self::Knight,
        Self::Lance,
        Self::Pawn,
        Self::Dragon,
        Self::Horse,
        Self::ProSilver,
        Self::ProKnight,
        Self::ProLance,
        Self::ProPawn,
    ];

    /// Hand slot order in memory
    pub const HAND: [Self; 7] = [
        Self::Rook,
        Self::Bishop,
        Self::Gold,
        Self::Silver,
        Self::Knight,
        Self::Lance,
        Self::Pawn,
    ];

    /// Look up a raw code
    ///
    /// # Errors
    ///
    /// Returns error for 0, 11 and anything above 15
    pub fn from_code(code: u8) -> DecodeResult<Self> {
        Ok(match code {
            1 => Self::King,
            2 => Self::Rook,
            3 => Self::Bishop,
            4 => Self::Gold,
            5 => Self::Silver,
            6 => Self::Knight,
            7 => Self::Lance,
            8 => Self::Pawn,
            9 => Self::Dragon,
            10 => Self::Horse,
            12 => Self::ProSilver,
            13 => Self::ProKnight,
            14 => Self::ProLance,
            15 => Self::ProPawn,
            _ => return Err(DecodeError::UnmappedPiece { code }),
        })
    }

    /// Raw code
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the piece can sit in hand
    #[must_use]
    pub const fn is_hand(self) -> bool {
        matches!(
            self,
            Self::Rook
                | Self::Bishop
                | Self::Gold
                | Self::Silver
                | Self::Knight
                | Self::Lance
                | Self::Pawn
        )
    }
}

impl ToValue for Piece {
    fn to_value(&self) -> Value {
        Value::int(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_11_unmapped() {
        assert_eq!(
            Piece::from_code(11),
            Err(DecodeError::UnmappedPiece { code: 11 })
        );
    }

    #[test]
    fn test_out_of_range_codes() {
        for code in [0u8, 16, 99, 255] {
            assert!(Piece::from_code(code).is_err());
        }
    }

    #[test]
    fn test_table_roundtrip() {
        for piece in Piece::ALL {
            assert_eq!(Piece::from_code(piece.code()), Ok(piece));
        }
    }

    #[test]
    fn test_hand_pieces() {
        let in_hand: Vec<Piece> = Piece::ALL.into_iter().filter(|p| p.is_hand()).collect();
        assert_eq!(in_hand, Piece::HAND.to_vec());
        assert!(!Piece::King.is_hand());
        assert!(!Piece::ProPawn.is_hand());
    }
}
