//! Typed failures returned across the engine/session boundary

use crate::types::{Condition, Side};
use thiserror::Error;

/// Participant-facing failure. Every variant is returned before any state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    /// Bad party composition, unknown technique or character, invalid switch target
    #[error("{0}")]
    Validation(String),
    /// No such session, duplicate submission in a turn, or action against a finished battle
    #[error("{0}")]
    State(String),
    #[error("Not enough mana: needs {required}, has {available} ({} short)", .required - .available)]
    Resource { required: u32, available: u32 },
    /// The acting character's condition kept it from acting. The action is spent.
    #[error("{name} cannot act while {condition:?}")]
    CannotAct { name: String, condition: Condition },
}

impl BattleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BattleError::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        BattleError::State(msg.into())
    }

    /// Whether the participant still owes an action for this turn after the failure
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BattleError::CannotAct { .. })
    }
}

/// Inconsistency found by the post-action check. Logged, never returned to a participant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("{side} active index {index} out of range for party of {len}")]
    ActiveIndexOutOfRange { side: Side, index: usize, len: usize },
    #[error("{name}: hp {current} exceeds max {max}")]
    HpOutOfRange { name: String, current: u32, max: u32 },
    #[error("{name}: mana {current} exceeds max {max}")]
    ManaOutOfRange { name: String, current: u32, max: u32 },
    #[error("{name}: stage {stage} outside [-6, 6]")]
    StageOutOfRange { name: String, stage: i8 },
    #[error("{side} fields a defeated character while {alive} teammates stand")]
    DefeatedActive { side: Side, alive: usize },
}
