//! Opening-book progress.

use crate::error::{DecodeError, DecodeResult};
use crate::layout::AiBlock;
use crate::memory::Memory;
use oracle_core::{Record, ToValue, Value};

/// Number of done-branch flags
pub const DONE_BRANCH_LEN: u16 = 16;

/// Number of done-move flags
pub const DONE_MOVES_LEN: u16 = 24;

/// Opening formation the engine is following
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formation {
    /// 中飛車
    Nakabisha,
    /// 四間飛車
    Shikenbisha,
    /// 角換わり
    Kakugawari,
    /// 筋違い角
    Sujichigai,
    /// Human plays without a rook
    HumanRookHandicap,
    /// Human plays without rook and bishop
    HumanTwoPieceHandicap,
    /// Engine plays without a rook
    EngineRookHandicap,
    /// Engine plays without rook and bishop
    EngineTwoPieceHandicap,
    /// Out of book
    Nothing,
}

impl Formation {
    /// Look up a raw formation code
    ///
    /// # Errors
    ///
    /// Returns error for codes outside the table
    pub fn from_code(code: u8) -> DecodeResult<Self> {
        Ok(match code {
            0 => Self::Nakabisha,
            1 => Self::Shikenbisha,
            3 => Self::Kakugawari,
            4 => Self::Sujichigai,
            6 => Self::HumanRookHandicap,
            7 => Self::HumanTwoPieceHandicap,
            8 => Self::EngineRookHandicap,
            9 => Self::EngineTwoPieceHandicap,
            99 => Self::Nothing,
            _ => return Err(DecodeError::UnknownFormation { code }),
        })
    }

    /// Raw code
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Nakabisha => 0,
            Self::Shikenbisha => 1,
            Self::Kakugawari => 3,
            Self::Sujichigai => 4,
            Self::HumanRookHandicap => 6,
            Self::HumanTwoPieceHandicap => 7,
            Self::EngineRookHandicap => 8,
            Self::EngineTwoPieceHandicap => 9,
            Self::Nothing => 99,
        }
    }

    /// Name used in trace records
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nakabisha => "Nakabisha",
            Self::Shikenbisha => "Shikenbisha",
            Self::Kakugawari => "Kakugawari",
            Self::Sujichigai => "Sujichigai",
            Self::HumanRookHandicap => "HumanRookHandicap",
            Self::HumanTwoPieceHandicap => "HumanTwoPieceHandicap",
            Self::EngineRookHandicap => "EngineRookHandicap",
            Self::EngineTwoPieceHandicap => "EngineTwoPieceHandicap",
            Self::Nothing => "Nothing",
        }
    }
}

/// Book and AI progress counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiState {
    /// Book ply
    pub ply: u8,
    /// Book level
    pub level: u8,
    /// Book sub-level
    pub level_sub: u8,
    /// Formation being followed
    pub formation: Formation,
    /// Bit `i` set when branch `i` has been consumed
    pub done_branch: u16,
    /// Bit `i` set when book move `i` has been consumed
    pub done_moves: u32,
}

impl AiState {
    /// Read progress state
    ///
    /// # Errors
    ///
    /// Returns error if the formation byte is not a known code
    pub fn read(mem: &dyn Memory, block: &AiBlock) -> DecodeResult<Self> {
        let done_branch = (0..DONE_BRANCH_LEN)
            .filter(|&i| mem.read(block.done_branch + i) != 0)
            .fold(0u16, |acc, i| acc | (1 << i));
        let done_moves = (0..DONE_MOVES_LEN)
            .filter(|&i| mem.read(block.done_moves + i) != 0)
            .fold(0u32, |acc, i| acc | (1 << i));

        Ok(Self {
            ply: mem.read(block.ply),
            level: mem.read(block.level),
            level_sub: mem.read(block.level_sub),
            formation: Formation::from_code(mem.read(block.formation))?,
            done_branch,
            done_moves,
        })
    }
}

impl ToValue for AiState {
    fn to_value(&self) -> Value {
        Record::new("AiState")
            .field("done_branch", self.done_branch)
            .field("done_moves", self.done_moves)
            .field("formation", self.formation.name())
            .field("level", self.level)
            .field("level_sub", self.level_sub)
            .field("ply", self.ply)
            .to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LAYOUT_V1;
    use crate::memory::MemoryImage;

    #[test]
    fn test_formation_table() {
        for code in [0u8, 1, 3, 4, 6, 7, 8, 9, 99] {
            assert_eq!(Formation::from_code(code).unwrap().code(), code);
        }
        for code in [2u8, 5, 10, 98, 255] {
            assert_eq!(
                Formation::from_code(code),
                Err(DecodeError::UnknownFormation { code })
            );
        }
    }

    #[test]
    fn test_read_ai_state() {
        let mem = MemoryImage::new()
            .with(0x5C1, 3)
            .with(0x28E, 1)
            .with(0x5C8, 2)
            .with(0x5BE, 4)
            .with(0x2C, 1)
            .with(0x2C + 15, 5)
            .with(0x3C + 23, 1);
        let ai = AiState::read(&mem, &LAYOUT_V1.ai).unwrap();
        assert_eq!(ai.ply, 3);
        assert_eq!(ai.formation, Formation::Sujichigai);
        assert_eq!(ai.done_branch, 0b1000_0000_0000_0001);
        assert_eq!(ai.done_moves, 1 << 23);
    }

    #[test]
    fn test_unknown_formation_fails() {
        let mem = MemoryImage::new().with(0x5BE, 5);
        assert_eq!(
            AiState::read(&mem, &LAYOUT_V1.ai),
            Err(DecodeError::UnknownFormation { code: 5 })
        );
    }

    #[test]
    fn test_value_names_formation() {
        let mem = MemoryImage::new().with(0x5BE, 99);
        let v = AiState::read(&mem, &LAYOUT_V1.ai).unwrap().to_value();
        assert_eq!(v.get("formation"), Some(&Value::str("Nothing")));
    }
}
