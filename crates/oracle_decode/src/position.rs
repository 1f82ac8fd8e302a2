//! Position capture.
//!
//! Board, hand and effect arrays are copied verbatim. The engine uses them
//! for its own heuristics and this layer does not interpret them. Effects
//! can also be read on their own as an [`EffectBoard`].

use crate::layout::{Layout, SideBlock};
use crate::memory::{Memory, read_array};
use crate::moves::Side;
use crate::square::GRID_CELLS;
use oracle_core::{Record, ToValue, Value};

/// Per-side arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideState {
    /// Board array, raw cells
    pub board: [u8; GRID_CELLS],
    /// Hand counts, R B G S N L P
    pub hand: [u8; 7],
    /// Effect counts per cell
    pub effect_count: [u8; GRID_CELLS],
    /// Effect attacker per cell
    pub effect_attacker: [u8; GRID_CELLS],
}

impl SideState {
    fn read(mem: &dyn Memory, block: &SideBlock) -> Self {
        Self {
            board: read_array(mem, block.board),
            hand: read_array(mem, block.hand),
            effect_count: read_array(mem, block.effect_count),
            effect_attacker: read_array(mem, block.effect_attacker),
        }
    }
}

impl ToValue for SideState {
    fn to_value(&self) -> Value {
        Record::new("SideState")
            .field("board", self.board)
            .field("effect_attacker", self.effect_attacker)
            .field("effect_count", self.effect_count)
            .field("hand", self.hand)
            .to_value()
    }
}

/// One side's effect arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffects {
    /// Effect counts per cell
    pub count: [u8; GRID_CELLS],
    /// Effect attacker per cell, [`SQ_NONE`](crate::square::SQ_NONE) when empty
    pub attacker: [u8; GRID_CELLS],
}

impl SideEffects {
    fn read(mem: &dyn Memory, block: &SideBlock) -> Self {
        Self {
            count: read_array(mem, block.effect_count),
            attacker: read_array(mem, block.effect_attacker),
        }
    }
}

impl ToValue for SideEffects {
    fn to_value(&self) -> Value {
        Record::new("SideEffects")
            .field("attacker", self.attacker)
            .field("count", self.count)
            .to_value()
    }
}

/// Effect arrays of both sides.
///
/// The engine rebuilds these for every candidate it tries, so unlike the
/// boards they change inside one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectBoard {
    /// Engine effects
    pub engine: SideEffects,
    /// Human effects
    pub human: SideEffects,
}

impl EffectBoard {
    /// Read both sides' effect arrays
    pub fn read(mem: &dyn Memory, layout: &Layout) -> Self {
        Self {
            engine: SideEffects::read(mem, &layout.engine),
            human: SideEffects::read(mem, &layout.human),
        }
    }
}

impl ToValue for EffectBoard {
    fn to_value(&self) -> Value {
        Record::new("EffectBoard")
            .field("engine", &self.engine)
            .field("human", &self.human)
            .to_value()
    }
}

/// Whole position as the engine holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Side to move
    pub side_to_move: Side,
    /// Game ply
    pub ply: u16,
    /// Engine arrays
    pub engine: SideState,
    /// Human arrays
    pub human: SideState,
}

impl Position {
    /// Read a position
    pub fn read(mem: &dyn Memory, layout: &Layout) -> Self {
        let side_to_move = if mem.read(layout.side_to_move) == 0 {
            Side::Engine
        } else {
            Side::Human
        };
        let ply = 100 * u16::from(mem.read(layout.ply_hi)) + u16::from(mem.read(layout.ply_lo));
        Self {
            side_to_move,
            ply,
            engine: SideState::read(mem, &layout.engine),
            human: SideState::read(mem, &layout.human),
        }
    }
}

impl ToValue for Position {
    fn to_value(&self) -> Value {
        let side = match self.side_to_move {
            Side::Engine => "engine",
            Side::Human => "human",
        };
        Record::new("Position")
            .field("engine", &self.engine)
            .field("human", &self.human)
            .field("ply", self.ply)
            .field("side_to_move", side)
            .to_value()
    }
}
