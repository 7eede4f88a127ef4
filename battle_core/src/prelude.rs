//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Characters and techniques
pub use crate::character::{CharacterInstance, CharacterTemplate};
pub use crate::technique::Technique;
pub use crate::types::{Affinity, Condition, Side, TechniqueCategory};

// Engine
pub use crate::battle::{BattleEngine, BattleOutcome};

// Sessions
pub use crate::session::{ActionOutcome, BattleSnapshot, Clock, PlayerAction, SessionRegistry, SystemClock};

// Config
pub use crate::config::{default_roster, BattleConstants, RosterProvider, SessionConfig};

pub use crate::error::BattleError;
