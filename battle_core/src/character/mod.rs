//! CharacterInstance - mutable battle state built from a roster template

mod ability_state;
mod disposition;
mod stats;
mod template;
mod volatile;

pub use ability_state::AbilityState;
pub use disposition::Disposition;
pub use stats::{scaled_stat, stage_multiplier, StatBoosts, Stats, MAX_STAGE, MIN_STAGE};
pub use template::CharacterTemplate;
pub use volatile::VolatileFlags;

use crate::error::{BattleError, InvariantViolation};
use crate::hooks::{self, AbilityHooks};
use crate::technique::Technique;
use crate::types::{Affinity, Condition, Race, StatKind, TechniqueCategory};
use rand::{Rng, RngCore};
use std::sync::Arc;
use uuid::Uuid;

/// Most techniques a character can bring into battle
pub const MAX_TECHNIQUES: usize = 4;
/// Share of max HP a mana shield absorbs before breaking
pub const MANA_SHIELD_FRACTION: f64 = 0.25;
/// Chance that Fear keeps a character from acting
pub const FEAR_SKIP_CHANCE: f64 = 0.25;
/// Chance a hit lands on a misty-aura decoy instead of the owner
pub const MISTY_AURA_DECOY_CHANCE: f64 = 0.5;
/// Share of max HP a leech curse drains each turn end
pub const LEECH_CURSE_FRACTION: f64 = 1.0 / 16.0;

/// A character as it exists inside one battle.
///
/// HP and mana are private so every change goes through a clamping method;
/// `0 <= hp <= max_hp` and `0 <= mana <= max_mana` hold at all times.
#[derive(Debug, Clone)]
pub struct CharacterInstance {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub level: u32,
    pub races: Vec<Race>,
    pub affinities: Vec<Affinity>,
    pub disposition: Disposition,
    base_stats: Stats,
    ivs: Stats,
    growth: Stats,
    ability: Arc<dyn AbilityHooks>,
    equipment: Option<Arc<dyn AbilityHooks>>,
    techniques: Vec<Arc<Technique>>,
    current_hp: u32,
    max_hp: u32,
    current_mana: u32,
    max_mana: u32,
    condition: Condition,
    condition_turns: u32,
    stat_boosts: StatBoosts,
    pub volatile: VolatileFlags,
    pub ability_state: AbilityState,
}

impl CharacterInstance {
    /// Build a fresh battle instance. Trait and equipment ids are resolved through
    /// the hook catalog.
    pub fn new(
        template: &CharacterTemplate,
        owner_id: impl Into<String>,
        techniques: Vec<Arc<Technique>>,
    ) -> Result<Self, BattleError> {
        if techniques.len() > MAX_TECHNIQUES {
            return Err(BattleError::validation(format!(
                "{} knows {} techniques, at most {} allowed",
                template.name,
                techniques.len(),
                MAX_TECHNIQUES
            )));
        }
        let ability = hooks::ability(&template.ability).ok_or_else(|| {
            BattleError::validation(format!("Unknown trait '{}' on {}", template.ability, template.name))
        })?;
        let equipment = match &template.equipment {
            Some(id) => Some(hooks::equipment(id).ok_or_else(|| {
                BattleError::validation(format!("Unknown equipment '{}' on {}", id, template.name))
            })?),
            None => None,
        };

        let mut instance = CharacterInstance {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: template.name.clone(),
            level: template.level,
            races: template.races.clone(),
            affinities: template.affinities.clone(),
            disposition: template.disposition,
            base_stats: template.base_stats,
            ivs: template.ivs,
            growth: template.growth,
            ability_state: ability.initial_state(),
            ability,
            equipment,
            techniques,
            current_hp: 0,
            max_hp: 0,
            current_mana: 0,
            max_mana: 0,
            condition: Condition::Normal,
            condition_turns: 0,
            stat_boosts: StatBoosts::default(),
            volatile: VolatileFlags::default(),
        };

        instance.max_hp = instance.effective_stat(StatKind::Hp);
        instance.current_hp = instance.max_hp;
        let magic_attack = instance.effective_stat(StatKind::MagicAttack) as f64;
        instance.max_mana = (50.0 + magic_attack * 0.5 + instance.level as f64 * 2.0).floor() as u32;
        instance.current_mana = instance.max_mana;
        Ok(instance)
    }

    // === Stats ===

    /// Level-scaled stat with disposition, stage and equipment applied, in that order
    pub fn effective_stat(&self, stat: StatKind) -> u32 {
        let scaled = scaled_stat(
            self.base_stats.get(stat),
            self.ivs.get(stat),
            self.growth.get(stat),
            self.level,
            stat == StatKind::Hp,
        );
        let mut value = self.disposition.apply(stat, scaled);
        if stat.is_boostable() {
            value = (value as f64 * stage_multiplier(self.stat_boosts.get(stat))).floor() as u32;
        }
        if let Some(equipment) = &self.equipment {
            value = (value as f64 * equipment.stat_multiplier(stat)).floor() as u32;
        }
        value
    }

    /// Offensive stat for a technique category
    pub fn attack_stat(&self, category: TechniqueCategory) -> u32 {
        match category {
            TechniqueCategory::Magical => self.effective_stat(StatKind::MagicAttack),
            _ => self.effective_stat(StatKind::Attack),
        }
    }

    /// Defensive stat for a technique category
    pub fn defense_stat(&self, category: TechniqueCategory) -> u32 {
        match category {
            TechniqueCategory::Magical => self.effective_stat(StatKind::MagicDefense),
            _ => self.effective_stat(StatKind::Defense),
        }
    }

    pub fn base_stats(&self) -> &Stats {
        &self.base_stats
    }

    pub fn stat_boosts(&self) -> &StatBoosts {
        &self.stat_boosts
    }

    /// Shift a stat stage, clamped to [-6, 6]. Returns the change applied.
    pub fn modify_stat_boost(&mut self, stat: StatKind, delta: i32) -> i8 {
        self.stat_boosts.modify(stat, delta)
    }

    // === HP and mana ===

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn current_mana(&self) -> u32 {
        self.current_mana
    }

    pub fn max_mana(&self) -> u32 {
        self.max_mana
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.max_hp as f64
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    /// Apply incoming damage. An active mana shield soaks up to a quarter of max HP
    /// once and breaks. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let mut remaining = amount;
        if self.volatile.mana_shield {
            let shield = (self.max_hp as f64 * MANA_SHIELD_FRACTION).floor() as u32;
            self.volatile.mana_shield = false;
            remaining = remaining.saturating_sub(shield);
        }
        let lost = remaining.min(self.current_hp);
        self.current_hp -= lost;
        self.volatile.last_damage = lost;
        lost
    }

    /// Returns the HP actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp - self.current_hp);
        self.current_hp += healed;
        healed
    }

    /// Returns the mana actually restored
    pub fn restore_mana(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_mana - self.current_mana);
        self.current_mana += restored;
        restored
    }

    /// Remove up to `amount` mana. Returns the mana actually removed.
    pub fn drain_mana(&mut self, amount: u32) -> u32 {
        let drained = amount.min(self.current_mana);
        self.current_mana -= drained;
        drained
    }

    /// Set HP directly, clamped to [0, max_hp]
    pub fn set_current_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }

    /// Set mana directly, clamped to [0, max_mana]
    pub fn set_current_mana(&mut self, mana: u32) {
        self.current_mana = mana.min(self.max_mana);
    }

    // === Conditions ===

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn condition_turns(&self) -> u32 {
        self.condition_turns
    }

    pub fn set_condition(&mut self, condition: Condition, turns: u32) {
        self.condition = condition;
        self.condition_turns = if condition == Condition::Normal { 0 } else { turns };
    }

    pub fn clear_condition(&mut self) {
        self.set_condition(Condition::Normal, 0);
    }

    /// Whether the character may act this action. Dazed wears off on the check;
    /// Fear keeps the character from acting a quarter of the time.
    pub fn can_act<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match self.condition {
            Condition::Stunned => false,
            Condition::Dazed => {
                self.clear_condition();
                false
            }
            Condition::Fear => rng.gen::<f64>() >= FEAR_SKIP_CHANCE,
            _ => true,
        }
    }

    /// Turn-end damage from the current condition. Returns the HP lost.
    pub fn apply_condition_damage(&mut self) -> u32 {
        match self.condition {
            Condition::Exhausted => self.take_damage(self.max_hp / 8),
            _ => 0,
        }
    }

    /// Count down the condition. Exhausted never wears off.
    /// Returns the condition that just expired, if any.
    pub fn tick_condition(&mut self) -> Option<Condition> {
        if matches!(self.condition, Condition::Normal | Condition::Exhausted) {
            return None;
        }
        self.condition_turns = self.condition_turns.saturating_sub(1);
        if self.condition_turns == 0 {
            let expired = self.condition;
            self.clear_condition();
            Some(expired)
        } else {
            None
        }
    }

    /// Whether the trait or equipment vetoes `condition`
    pub fn prevents_condition(&self, condition: Condition, rng: &mut dyn RngCore) -> bool {
        if self.ability.prevent_condition(self, condition, rng) {
            return true;
        }
        match &self.equipment {
            Some(equipment) => equipment.prevent_condition(self, condition, rng),
            None => false,
        }
    }

    // === Hooks and techniques ===

    pub fn ability(&self) -> Arc<dyn AbilityHooks> {
        Arc::clone(&self.ability)
    }

    pub fn equipment(&self) -> Option<Arc<dyn AbilityHooks>> {
        self.equipment.clone()
    }

    /// Trait first, then equipment, in the order the engine invokes them
    pub fn hooks(&self) -> Vec<Arc<dyn AbilityHooks>> {
        let mut hooks = vec![Arc::clone(&self.ability)];
        if let Some(equipment) = &self.equipment {
            hooks.push(Arc::clone(equipment));
        }
        hooks
    }

    pub fn crit_chance_boost(&self) -> f64 {
        self.hooks().iter().map(|h| h.crit_chance_boost()).sum()
    }

    pub fn mana_cost_reduction(&self) -> u32 {
        self.hooks().iter().map(|h| h.mana_cost_reduction()).sum()
    }

    pub fn techniques(&self) -> &[Arc<Technique>] {
        &self.techniques
    }

    /// Case-insensitive lookup among known techniques
    pub fn technique(&self, name: &str) -> Option<Arc<Technique>> {
        self.techniques
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Pay the mana for `technique`. The caller has already checked `can_use`.
    pub fn spend_mana_for(&mut self, technique: &Technique) -> u32 {
        let cost = technique.cost_for(self);
        self.drain_mana(cost)
    }

    /// Post-action consistency check
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.current_hp > self.max_hp {
            return Err(InvariantViolation::HpOutOfRange {
                name: self.name.clone(),
                current: self.current_hp,
                max: self.max_hp,
            });
        }
        if self.current_mana > self.max_mana {
            return Err(InvariantViolation::ManaOutOfRange {
                name: self.name.clone(),
                current: self.current_mana,
                max: self.max_mana,
            });
        }
        if let Some((_, stage)) = self
            .stat_boosts
            .iter()
            .find(|(_, s)| !(MIN_STAGE..=MAX_STAGE).contains(s))
        {
            return Err(InvariantViolation::StageOutOfRange {
                name: self.name.clone(),
                stage,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_template(name: &str) -> CharacterTemplate {
    CharacterTemplate::new(name, 50, Stats::new(100, 100, 100, 100, 100, 100))
}

#[cfg(test)]
pub(crate) fn test_character_with(template: CharacterTemplate) -> CharacterInstance {
    let techniques = template
        .techniques
        .iter()
        .map(|name| {
            Arc::new(Technique::new(
                name.clone(),
                Affinity::Destruction,
                TechniqueCategory::Magical,
                70,
                15,
            ))
        })
        .collect();
    CharacterInstance::new(&template, "tester", techniques).unwrap()
}

#[cfg(test)]
pub(crate) fn test_character(name: &str, techniques: &[&str]) -> CharacterInstance {
    test_character_with(test_template(name).with_techniques(techniques))
}
