//! Typed per-character state owned by signature abilities

use serde::{Deserialize, Serialize};

/// State read and written only by the owning character's ability hooks.
///
/// Each signature ability seeds its own variant through
/// [`AbilityHooks::initial_state`](crate::hooks::AbilityHooks::initial_state);
/// hooks ignore variants they do not own.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityState {
    #[default]
    None,
    /// Courage meter: positive boosts damage, negative weakens it
    Resolve { resolve: i32 },
    /// Undead army soaking up incoming damage
    UndeadArmy { strength: u32 },
    /// Alternates between a strong turn and an aloof turn
    Toying { aloof_next: bool, aloof_now: bool },
    /// Stacks that raise the next attack's damage, reset after attacking
    Analysis { stacks: u32 },
    /// Consecutive attacking turns; `attacked` is cleared every turn end
    Chain { stacks: u32, attacked: bool },
    /// Whether the one-time entry boost has been spent
    Hero { presence_shown: bool },
    /// Knockouts the owner can still shrug off
    Perseverance { stacks: u32 },
    /// Turns of eye contact left
    EyeContact { turns: u32 },
    /// Theory techniques used; four unlock the pinnacle
    Theory { count: u32, pinnacle: bool },
    /// Quiet turns observed toward a proctor's victory
    Proctor { observations: u32, attacked: bool },
}
