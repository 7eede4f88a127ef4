//! AbilityHooks - capability trait for traits, signature abilities and equipment
//!
//! The engine calls every hook at a fixed point of its pipeline and never
//! special-cases a character. Stateful mechanics live in the owner's
//! [`AbilityState`].

mod equipment;
mod signature;
mod traits;

pub use equipment::EQUIPMENT_IDS;
pub use signature::SIGNATURE_IDS;
pub use traits::TRAIT_IDS;

use crate::battle::{BattleLog, Field};
use crate::character::{AbilityState, CharacterInstance};
use crate::technique::Technique;
use crate::types::{Condition, StatKind};
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

/// Battle services handed to hooks
pub struct HookContext<'a> {
    pub field: Field,
    pub log: &'a mut BattleLog,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> HookContext<'a> {
    pub fn new(field: Field, log: &'a mut BattleLog, rng: &'a mut dyn RngCore) -> Self {
        HookContext { field, log, rng }
    }
}

/// Hooks a trait or item may implement. Every method has a neutral default.
pub trait AbilityHooks: Send + Sync + fmt::Debug {
    /// Catalog identifier
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// State seeded into the owner when the battle instance is built
    fn initial_state(&self) -> AbilityState {
        AbilityState::None
    }

    /// Owner was sent out (or starts the battle) facing `opponent`
    fn on_enter_field(
        &self,
        _owner: &mut CharacterInstance,
        _opponent: &mut CharacterInstance,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    /// Owner is about to strike with `technique`, after mana is paid
    fn on_strike(
        &self,
        _attacker: &mut CharacterInstance,
        _target: &mut CharacterInstance,
        _technique: &Technique,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    /// Owner is about to take `damage`; returns the damage actually taken
    fn on_receive_damage(
        &self,
        _defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        _ctx: &mut HookContext<'_>,
    ) -> u32 {
        damage
    }

    /// Owner's hit landed for `damage` HP
    fn after_damage_dealt(
        &self,
        _attacker: &mut CharacterInstance,
        _target: &CharacterInstance,
        _damage: u32,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    /// Owner finished resolving `technique`, hit or miss
    fn after_technique(
        &self,
        _owner: &mut CharacterInstance,
        _technique: &Technique,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        1.0
    }

    /// Return true to veto `condition` landing on the owner
    fn prevent_condition(
        &self,
        _owner: &CharacterInstance,
        _condition: Condition,
        _rng: &mut dyn RngCore,
    ) -> bool {
        false
    }

    fn on_turn_end(&self, _owner: &mut CharacterInstance, _ctx: &mut HookContext<'_>) {}

    /// Mana restored to the owner when it knocks out an opponent
    fn mana_restore_on_ko(&self, _survivor: &CharacterInstance) -> u32 {
        0
    }

    fn crit_chance_boost(&self) -> f64 {
        0.0
    }

    fn mana_cost_reduction(&self) -> u32 {
        0
    }

    fn stat_multiplier(&self, _stat: StatKind) -> f64 {
        1.0
    }

    fn precision_multiplier(&self, _user: &CharacterInstance, _technique: &Technique) -> f64 {
        1.0
    }

    /// Checked after the turn-end hooks; true ends the battle in the owner's favour
    fn claims_victory(&self, _owner: &CharacterInstance) -> bool {
        false
    }
}

/// Placeholder for characters without a trait
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAbility;

impl AbilityHooks for NoAbility {
    fn id(&self) -> &str {
        "none"
    }

    fn name(&self) -> &str {
        "None"
    }
}

/// Resolve a trait or signature ability by id
pub fn ability(id: &str) -> Option<Arc<dyn AbilityHooks>> {
    if id.is_empty() || id == "none" {
        return Some(Arc::new(NoAbility));
    }
    signature::lookup(id).or_else(|| traits::lookup(id))
}

/// Resolve a piece of equipment by id
pub fn equipment(id: &str) -> Option<Arc<dyn AbilityHooks>> {
    equipment::lookup(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_ids() {
        assert_eq!(ability("none").unwrap().name(), "None");
        assert_eq!(ability("iron_will").unwrap().name(), "Iron Will");
        assert_eq!(ability("bravest_coward").unwrap().name(), "Bravest Coward");
        assert_eq!(equipment("life_orb").unwrap().name(), "Life Orb");
        assert!(ability("does_not_exist").is_none());
        assert!(equipment("iron_will").is_none());
    }

    #[test]
    fn test_every_listed_id_resolves() {
        for id in SIGNATURE_IDS.iter().chain(TRAIT_IDS) {
            let hooks = ability(id).unwrap();
            assert_eq!(hooks.id(), *id);
        }
        for id in EQUIPMENT_IDS {
            let hooks = equipment(id).unwrap();
            assert_eq!(hooks.id(), *id);
        }
    }
}
