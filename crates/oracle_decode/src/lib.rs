//! SHOGI.ORACLE Domain Decoder
//!
//! Turns the reference engine's memory into typed records: squares, pieces,
//! moves, positions, book progress and evaluation bundles. All reads go
//! through an explicit [`Memory`] handle and a versioned [`Layout`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod error;
pub mod eval;
pub mod layout;
pub mod memory;
pub mod moves;
pub mod piece;
pub mod position;
pub mod snapshot;
pub mod square;

pub use book::{AiState, Formation};
pub use error::{DecodeError, DecodeResult};
pub use eval::{BestEval, CandEval, PositionEval, RootEval};
pub use layout::{EVAL_TWEAK_SITES, LAYOUT_V1, Layout};
pub use memory::{Memory, MemoryImage};
pub use moves::{Move, MoveSlot, RawMove, Side, drop_piece_code, drop_src, is_drop};
pub use piece::Piece;
pub use position::{EffectBoard, Position, SideEffects, SideState};
pub use snapshot::{Snapshot, TriggerKind, capture, field_kind};
pub use square::{SQ_NONE, Square, sq2xy, xy2sq};
