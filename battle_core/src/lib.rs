//! battle_core - Turn-based team battle engine
//!
//! This library provides:
//! - CharacterInstance: Level-scaled stats, HP/mana pools, conditions and stat stages
//! - Technique: Data-driven attacks and support moves with their effects
//! - AbilityHooks: Trait, signature ability and equipment hooks at fixed pipeline points
//! - BattleEngine: Technique resolution, switching, turn-end processing and win detection
//! - SessionRegistry: Paired participants, turn gating, timeouts and snapshots

pub mod affinity;
pub mod ai;
pub mod battle;
pub mod character;
pub mod config;
pub mod error;
pub mod hooks;
pub mod prelude;
pub mod session;
pub mod technique;
pub mod types;

// Re-export core types for convenience
pub use affinity::AffinityMatrix;
pub use battle::{BattleEngine, BattleLog, BattleOutcome, BattleState, Field, Party, TechniqueReport};
pub use character::{CharacterInstance, CharacterTemplate, Disposition, Stats};
pub use config::{default_roster, BattleConstants, ConfigError, RosterProvider, SessionConfig, StaticRoster};
pub use error::{BattleError, InvariantViolation};
pub use hooks::AbilityHooks;
pub use session::{ActionOutcome, BattleSnapshot, PlayerAction, SessionRegistry, TimeoutOutcome};
pub use technique::{Technique, TechniqueEffect};
pub use types::{Affinity, Condition, Race, Side, StatKind, TargetType, TechniqueCategory};
