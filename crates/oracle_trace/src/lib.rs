//! SHOGI.ORACLE Trace Serialization
//!
//! Canonical trace lines, localized move notation, trace reading and
//! session matching.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod line;
pub mod notation;
pub mod reader;
pub mod verify;

pub use error::{TraceError, TraceResult};
pub use line::{TraceLine, layout_header, parse_header, raw_move};
pub use notation::{piece_label, render_engine, render_human, render_move, render_raw, square_label};
pub use reader::TraceReader;
pub use verify::{Divergence, MatchReport, differing_paths, match_lines, match_sessions};
