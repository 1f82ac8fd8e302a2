//! Memory layout of the reference binary.
//!
//! This table is the only place addresses live. It is tagged with the
//! revision it was taken from; a trace records that revision in its header.

use crate::moves::MoveSlot;
use oracle_core::Version;

/// Addresses of a per-side position block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideBlock {
    /// Board array, 121 cells indexed by raw square
    pub board: u16,
    /// Hand counts, 7 bytes in R B G S N L P order
    pub hand: u16,
    /// Effect count per square
    pub effect_count: u16,
    /// Effect attacker per square
    pub effect_attacker: u16,
}

/// Addresses of the book/AI progress state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiBlock {
    /// Progress ply
    pub ply: u16,
    /// Progress level
    pub level: u16,
    /// Progress sub-level
    pub level_sub: u16,
    /// Formation code
    pub formation: u16,
    /// First of 16 done-branch flags
    pub done_branch: u16,
    /// First of 24 done-move flags
    pub done_moves: u16,
}

/// Root evaluation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RootEvalBlock {
    pub adv_price: u16,
    pub disadv_price: u16,
    pub power_my: u16,
    pub power_your: u16,
    pub rbp_my: u16,
}

/// Position evaluation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PositionEvalBlock {
    pub adv_price: u16,
    pub adv_sq: u16,
    pub disadv_price: u16,
    pub disadv_sq: u16,
    pub hanging_your: u16,
    pub king_safety_far_my: u16,
    pub king_threat_far_my: u16,
    pub king_threat_far_your: u16,
    pub king_threat_near_my: u16,
    pub n_choke_my: u16,
    pub n_loose_my: u16,
    pub n_promoted_my: u16,
    pub n_promoted_your: u16,
}

/// Candidate evaluation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CandEvalBlock {
    pub adv_price: u16,
    pub capture_price: u16,
    pub disadv_price: u16,
    pub dst_to_your_king: u16,
    pub is_sacrifice: u16,
    pub nega: u16,
    pub posi: u16,
    pub to_my_king: u16,
}

/// Best-so-far evaluation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct BestEvalBlock {
    pub adv_price: u16,
    pub adv_sq: u16,
    pub capture_price: u16,
    pub disadv_price: u16,
    pub disadv_sq: u16,
    pub dst_to_your_king: u16,
    pub king_safety_far_my: u16,
    pub king_threat_far_my: u16,
    pub king_threat_far_your: u16,
    pub n_loose_my: u16,
    pub n_promoted_my: u16,
    pub nega: u16,
    pub posi: u16,
    pub to_my_king: u16,
}

/// Number of places that adjust a candidate's evaluation
pub const EVAL_TWEAK_SITES: usize = 25;

/// Code addresses that mark search phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TriggerBlock {
    pub think_started: u16,
    pub root_evaluated: u16,
    pub candidate_started: u16,
    /// One per adjustment of the candidate evaluation, in code order
    pub eval_tweaked: [u16; EVAL_TWEAK_SITES],
    pub nondrop_candidate: u16,
    pub drop_candidate: u16,
    pub best_updated: u16,
    pub think_done: u16,
    pub move_chosen: u16,
    pub engine_won: u16,
    pub human_won: u16,
    pub human_suicide: u16,
}

/// Full address table for one binary revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Revision this table was derived from
    pub revision: Version,
    /// Side-to-move flag, 0 when the engine is to move
    pub side_to_move: u16,
    /// Game ply, low part (0..100)
    pub ply_lo: u16,
    /// Game ply, high part
    pub ply_hi: u16,
    /// Engine-owned blocks
    pub engine: SideBlock,
    /// Human-owned blocks
    pub human: SideBlock,
    /// Last human move
    pub human_move: MoveSlot,
    /// Engine move being played
    pub engine_move: MoveSlot,
    /// Candidate under evaluation
    pub cand_move: MoveSlot,
    /// Best move so far
    pub best_move: MoveSlot,
    /// Book progress
    pub ai: AiBlock,
    /// Root evaluation bundle
    pub root_eval: RootEvalBlock,
    /// Position evaluation bundle
    pub position_eval: PositionEvalBlock,
    /// Candidate evaluation bundle
    pub cand_eval: CandEvalBlock,
    /// Best-so-far evaluation bundle
    pub best_eval: BestEvalBlock,
    /// Default trigger addresses
    pub triggers: TriggerBlock,
}

/// Layout of the pinned reference binary
pub const LAYOUT_V1: Layout = Layout {
    revision: Version::new(1, 0, 0),
    side_to_move: 0x77,
    ply_lo: 0x15,
    ply_hi: 0x16,
    engine: SideBlock {
        board: 0x49B,
        hand: 0x594,
        effect_count: 0x514,
        effect_attacker: 0x1F9,
    },
    human: SideBlock {
        board: 0x3A9,
        hand: 0x58D,
        effect_count: 0x422,
        effect_attacker: 0x180,
    },
    human_move: MoveSlot {
        dst: 0x5A1,
        src: 0x5A2,
        promotion: 0x5BF,
    },
    engine_move: MoveSlot {
        dst: 0x5BB,
        src: 0x5BC,
        promotion: 0x5C0,
    },
    cand_move: MoveSlot {
        dst: 0x276,
        src: 0x277,
        promotion: 0x279,
    },
    best_move: MoveSlot {
        dst: 0x284,
        src: 0x285,
        promotion: 0x28C,
    },
    ai: AiBlock {
        ply: 0x5C1,
        level: 0x28E,
        level_sub: 0x5C8,
        formation: 0x5BE,
        done_branch: 0x2C,
        done_moves: 0x3C,
    },
    root_eval: RootEvalBlock {
        adv_price: 0x280,
        disadv_price: 0x282,
        power_my: 0x5E4,
        power_your: 0x5E7,
        rbp_my: 0x5EA,
    },
    position_eval: PositionEvalBlock {
        adv_price: 0x272,
        adv_sq: 0x273,
        disadv_price: 0x274,
        disadv_sq: 0x275,
        hanging_your: 0x5DF,
        king_safety_far_my: 0x295,
        king_threat_far_my: 0x296,
        king_threat_far_your: 0x299,
        king_threat_near_my: 0x5EB,
        n_choke_my: 0x5E5,
        n_loose_my: 0x297,
        n_promoted_my: 0x293,
        n_promoted_your: 0x5E8,
    },
    cand_eval: CandEvalBlock {
        adv_price: 0x272,
        capture_price: 0x278,
        disadv_price: 0x274,
        dst_to_your_king: 0x294,
        is_sacrifice: 0x27C,
        nega: 0x5E0,
        posi: 0x2A4,
        to_my_king: 0x298,
    },
    best_eval: BestEvalBlock {
        adv_price: 0x286,
        adv_sq: 0x287,
        capture_price: 0x28A,
        disadv_price: 0x288,
        disadv_sq: 0x289,
        dst_to_your_king: 0x29B,
        king_safety_far_my: 0x29C,
        king_threat_far_my: 0x29D,
        king_threat_far_your: 0x2A0,
        n_loose_my: 0x29E,
        n_promoted_my: 0x29A,
        nega: 0x5E2,
        posi: 0x2A6,
        to_my_king: 0x29F,
    },
    triggers: TriggerBlock {
        think_started: 0xEF70,
        root_evaluated: 0xF03E,
        candidate_started: 0xF282,
        eval_tweaked: [
            0xF2AC, 0xF2C5, 0xF2E9, 0xF2F7, 0xF329, 0xF364, 0xF395, 0xF3D0, 0xF3FA, 0xF423,
            0xF441, 0xF475, 0xF48C, 0xF4DC, 0xF4FC, 0xF521, 0xF57A, 0xF590, 0xF5AB, 0xF5D1,
            0xF5F1, 0xF623, 0xF643, 0xF65A, 0xF674,
        ],
        nondrop_candidate: 0xF0F8,
        drop_candidate: 0xF25C,
        best_updated: 0xF6F9,
        think_done: 0xDD0A,
        move_chosen: 0xDFD3,
        engine_won: 0xDFD6,
        human_won: 0xDD47,
        human_suicide: 0xDD44,
    },
};

impl Default for Layout {
    fn default() -> Self {
        LAYOUT_V1
    }
}
