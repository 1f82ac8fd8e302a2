//! Trigger kinds and the snapshots they produce.

use crate::book::AiState;
use crate::error::{DecodeError, DecodeResult};
use crate::eval::{BestEval, CandEval, PositionEval, RootEval};
use crate::layout::Layout;
use crate::memory::Memory;
use crate::moves::{RawMove, Side};
use crate::position::{EffectBoard, Position};
use oracle_core::{Record, ToValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;
use std::str::FromStr;

/// Search phase marked by a code address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Engine starts thinking about its move
    ThinkStarted,
    /// Root position evaluated
    RootEvaluated,
    /// Candidate picked up for scoring
    CandidateStarted,
    /// Candidate evaluation adjusted
    EvalTweaked,
    /// Board-move candidate evaluated
    NondropCandidate,
    /// Drop candidate evaluated
    DropCandidate,
    /// Best move replaced
    BestUpdated,
    /// Search finished
    ThinkDone,
    /// Engine committed to a move
    MoveChosen,
    /// Engine committed to a winning move
    EngineWon,
    /// Human won
    HumanWon,
    /// Human move left its own king in check
    HumanSuicide,
}

impl TriggerKind {
    /// All kinds
    pub const ALL: [Self; 12] = [
        Self::ThinkStarted,
        Self::RootEvaluated,
        Self::CandidateStarted,
        Self::EvalTweaked,
        Self::NondropCandidate,
        Self::DropCandidate,
        Self::BestUpdated,
        Self::ThinkDone,
        Self::MoveChosen,
        Self::EngineWon,
        Self::HumanWon,
        Self::HumanSuicide,
    ];

    /// Trace line tag
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ThinkStarted => "think",
            Self::RootEvaluated => "root",
            Self::CandidateStarted => "cand_start",
            Self::EvalTweaked => "cand_eval",
            Self::NondropCandidate => "cand_nondrop",
            Self::DropCandidate => "cand_drop",
            Self::BestUpdated => "best",
            Self::ThinkDone => "think_done",
            Self::MoveChosen => "my_move",
            Self::EngineWon => "engine_win",
            Self::HumanWon => "human_win",
            Self::HumanSuicide => "human_suicide",
        }
    }

    /// Look up a kind by trace tag
    ///
    /// # Errors
    ///
    /// Returns error if the tag names no trigger
    pub fn from_tag(tag: &str) -> DecodeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| DecodeError::UnknownTrigger {
                tag: tag.to_string(),
            })
    }

    /// Whether more than one code address reaches this phase
    #[must_use]
    pub const fn is_multi_site(self) -> bool {
        matches!(self, Self::EvalTweaked)
    }

    /// Every code address of this phase in a layout
    #[must_use]
    pub fn addresses(self, layout: &Layout) -> &[u16] {
        let t = &layout.triggers;
        match self {
            Self::ThinkStarted => slice::from_ref(&t.think_started),
            Self::RootEvaluated => slice::from_ref(&t.root_evaluated),
            Self::CandidateStarted => slice::from_ref(&t.candidate_started),
            Self::EvalTweaked => &t.eval_tweaked,
            Self::NondropCandidate => slice::from_ref(&t.nondrop_candidate),
            Self::DropCandidate => slice::from_ref(&t.drop_candidate),
            Self::BestUpdated => slice::from_ref(&t.best_updated),
            Self::ThinkDone => slice::from_ref(&t.think_done),
            Self::MoveChosen => slice::from_ref(&t.move_chosen),
            Self::EngineWon => slice::from_ref(&t.engine_won),
            Self::HumanWon => slice::from_ref(&t.human_won),
            Self::HumanSuicide => slice::from_ref(&t.human_suicide),
        }
    }

    /// First code address of this phase in a layout
    #[must_use]
    pub const fn address(self, layout: &Layout) -> u16 {
        let t = &layout.triggers;
        match self {
            Self::ThinkStarted => t.think_started,
            Self::RootEvaluated => t.root_evaluated,
            Self::CandidateStarted => t.candidate_started,
            Self::EvalTweaked => t.eval_tweaked[0],
            Self::NondropCandidate => t.nondrop_candidate,
            Self::DropCandidate => t.drop_candidate,
            Self::BestUpdated => t.best_updated,
            Self::ThinkDone => t.think_done,
            Self::MoveChosen => t.move_chosen,
            Self::EngineWon => t.engine_won,
            Self::HumanWon => t.human_won,
            Self::HumanSuicide => t.human_suicide,
        }
    }

    /// Kind of the `eval` bundle this phase records
    const fn eval_kind(self) -> Option<&'static str> {
        match self {
            Self::RootEvaluated => Some("RootEval"),
            Self::CandidateStarted
            | Self::EvalTweaked
            | Self::NondropCandidate
            | Self::DropCandidate => Some("CandEval"),
            Self::BestUpdated | Self::ThinkDone => Some("BestEval"),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TriggerKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// Record kind of `field` inside a record of kind `parent`.
///
/// Mirrors the records [`capture`] builds; snapshot bodies themselves are
/// keyed by their trace tag. Used to restore kinds on parsed trace lines.
#[must_use]
pub fn field_kind(parent: &str, field: &str) -> Option<&'static str> {
    let kind = match (parent, field) {
        (_, "move" | "your_move") => "RawMove",
        (_, "ai") => "AiState",
        (_, "position") => "Position",
        (_, "position_eval") => "PositionEval",
        (_, "effects") => "EffectBoard",
        ("Position", "engine" | "human") => "SideState",
        ("EffectBoard", "engine" | "human") => "SideEffects",
        (tag, "eval") => return TriggerKind::from_tag(tag).ok()?.eval_kind(),
        _ => return None,
    };
    Some(kind)
}

/// State captured at one trigger firing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// Engine starts thinking
    ThinkStarted {
        /// Book progress
        ai: AiState,
        /// Effects of the position to move from
        effects: Box<EffectBoard>,
    },
    /// Start of an engine turn
    Root {
        /// Book progress
        ai: AiState,
        /// Root bundle
        eval: RootEval,
        /// Full position
        position: Box<Position>,
        /// Human move that led here
        your_move: RawMove,
    },
    /// A candidate is about to be scored
    CandidateStarted {
        /// Candidate
        mv: RawMove,
        /// Effects after the candidate
        effects: Box<EffectBoard>,
        /// Position after the candidate
        position_eval: PositionEval,
        /// Initial candidate bundle
        eval: CandEval,
    },
    /// The candidate bundle was adjusted
    EvalTweaked {
        /// Adjusted bundle
        eval: CandEval,
    },
    /// A board move was scored
    NondropCandidate {
        /// Candidate
        mv: RawMove,
        /// Candidate bundle
        eval: CandEval,
        /// Position after the candidate
        position_eval: PositionEval,
    },
    /// A drop was scored
    DropCandidate {
        /// Candidate
        mv: RawMove,
        /// Candidate bundle
        eval: CandEval,
        /// Position after the candidate
        position_eval: PositionEval,
    },
    /// Best move replaced
    BestUpdated {
        /// New best move
        mv: RawMove,
        /// Best bundle
        eval: BestEval,
    },
    /// Search finished
    ThinkDone {
        /// Final best bundle
        eval: BestEval,
    },
    /// Move the engine plays
    MoveChosen {
        /// Chosen move
        mv: RawMove,
    },
    /// Move the engine wins with
    EngineWon {
        /// Winning move
        mv: RawMove,
    },
    /// Human won
    HumanWon,
    /// Human lost by exposing their king
    HumanSuicide,
}

impl Snapshot {
    /// Trigger that produced this snapshot
    #[must_use]
    pub const fn trigger(&self) -> TriggerKind {
        match self {
            Self::ThinkStarted { .. } => TriggerKind::ThinkStarted,
            Self::Root { .. } => TriggerKind::RootEvaluated,
            Self::CandidateStarted { .. } => TriggerKind::CandidateStarted,
            Self::EvalTweaked { .. } => TriggerKind::EvalTweaked,
            Self::NondropCandidate { .. } => TriggerKind::NondropCandidate,
            Self::DropCandidate { .. } => TriggerKind::DropCandidate,
            Self::BestUpdated { .. } => TriggerKind::BestUpdated,
            Self::ThinkDone { .. } => TriggerKind::ThinkDone,
            Self::MoveChosen { .. } => TriggerKind::MoveChosen,
            Self::EngineWon { .. } => TriggerKind::EngineWon,
            Self::HumanWon => TriggerKind::HumanWon,
            Self::HumanSuicide => TriggerKind::HumanSuicide,
        }
    }

    /// The move this snapshot is about and the side that made it
    #[must_use]
    pub fn subject_move(&self) -> Option<(Side, RawMove)> {
        match self {
            Self::Root { your_move, .. } if your_move.dst != 0 => Some((Side::Human, *your_move)),
            Self::CandidateStarted { mv, .. }
            | Self::NondropCandidate { mv, .. }
            | Self::DropCandidate { mv, .. }
            | Self::BestUpdated { mv, .. }
            | Self::MoveChosen { mv }
            | Self::EngineWon { mv } => Some((Side::Engine, *mv)),
            _ => None,
        }
    }
}

impl ToValue for Snapshot {
    fn to_value(&self) -> Value {
        let record = Record::new(self.trigger().tag());
        match self {
            Self::ThinkStarted { ai, effects } => {
                record.field("ai", ai).field("effects", &**effects)
            }
            Self::Root {
                ai,
                eval,
                position,
                your_move,
            } => record
                .field("ai", ai)
                .field("eval", eval)
                .field("position", &**position)
                .field("your_move", your_move),
            Self::CandidateStarted {
                mv,
                effects,
                position_eval,
                eval,
            } => record
                .field("effects", &**effects)
                .field("eval", eval)
                .field("move", mv)
                .field("position_eval", position_eval),
            Self::EvalTweaked { eval } => record.field("eval", eval),
            Self::NondropCandidate {
                mv,
                eval,
                position_eval,
            }
            | Self::DropCandidate {
                mv,
                eval,
                position_eval,
            } => record
                .field("eval", eval)
                .field("move", mv)
                .field("position_eval", position_eval),
            Self::BestUpdated { mv, eval } => record.field("eval", eval).field("move", mv),
            Self::ThinkDone { eval } => record.field("eval", eval),
            Self::MoveChosen { mv } | Self::EngineWon { mv } => record.field("move", mv),
            Self::HumanWon | Self::HumanSuicide => record,
        }
        .to_value()
    }
}

/// Read the snapshot for a trigger.
///
/// Moves are checked against their side's encoding so that a bad layout or
/// a wrong binary fails here rather than in a later diff. Candidate phases
/// split board moves from drops, so each also checks it got the right one.
/// A zero destination in the human move slot at the root means no human
/// move has been played.
///
/// # Errors
///
/// Returns the first decode error met
pub fn capture(trigger: TriggerKind, mem: &dyn Memory, layout: &Layout) -> DecodeResult<Snapshot> {
    let snapshot = match trigger {
        TriggerKind::ThinkStarted => Snapshot::ThinkStarted {
            ai: AiState::read(mem, &layout.ai)?,
            effects: Box::new(EffectBoard::read(mem, layout)),
        },
        TriggerKind::RootEvaluated => Snapshot::Root {
            ai: AiState::read(mem, &layout.ai)?,
            eval: RootEval::read(mem, &layout.root_eval),
            position: Box::new(Position::read(mem, layout)),
            your_move: RawMove::read(mem, &layout.human_move),
        },
        TriggerKind::CandidateStarted => Snapshot::CandidateStarted {
            mv: RawMove::read(mem, &layout.cand_move),
            effects: Box::new(EffectBoard::read(mem, layout)),
            position_eval: PositionEval::read(mem, &layout.position_eval),
            eval: CandEval::read(mem, &layout.cand_eval),
        },
        TriggerKind::EvalTweaked => Snapshot::EvalTweaked {
            eval: CandEval::read(mem, &layout.cand_eval),
        },
        TriggerKind::NondropCandidate => {
            let mv = RawMove::read(mem, &layout.cand_move);
            if mv.is_drop() {
                return Err(DecodeError::UnexpectedDrop { src: mv.src });
            }
            Snapshot::NondropCandidate {
                mv,
                eval: CandEval::read(mem, &layout.cand_eval),
                position_eval: PositionEval::read(mem, &layout.position_eval),
            }
        }
        TriggerKind::DropCandidate => {
            let mv = RawMove::read(mem, &layout.cand_move);
            if !mv.is_drop() {
                return Err(DecodeError::NotADrop { src: mv.src });
            }
            Snapshot::DropCandidate {
                mv,
                eval: CandEval::read(mem, &layout.cand_eval),
                position_eval: PositionEval::read(mem, &layout.position_eval),
            }
        }
        TriggerKind::BestUpdated => Snapshot::BestUpdated {
            mv: RawMove::read(mem, &layout.best_move),
            eval: BestEval::read(mem, &layout.best_eval),
        },
        TriggerKind::ThinkDone => Snapshot::ThinkDone {
            eval: BestEval::read(mem, &layout.best_eval),
        },
        TriggerKind::MoveChosen => Snapshot::MoveChosen {
            mv: RawMove::read(mem, &layout.engine_move),
        },
        TriggerKind::EngineWon => Snapshot::EngineWon {
            mv: RawMove::read(mem, &layout.engine_move),
        },
        TriggerKind::HumanWon => Snapshot::HumanWon,
        TriggerKind::HumanSuicide => Snapshot::HumanSuicide,
    };
    if let Some((side, mv)) = snapshot.subject_move() {
        mv.decode(side)?;
        tracing::trace!(%trigger, %side, src = mv.src, dst = mv.dst, "move checked");
    }
    Ok(snapshot)
}
