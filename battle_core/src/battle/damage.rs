//! Damage formula and hit roll

use super::state::Field;
use crate::affinity::AffinityMatrix;
use crate::character::CharacterInstance;
use crate::config::BattleConstants;
use crate::technique::Technique;
use crate::types::{Affinity, AmbientMagic, TechniqueCategory, Terrain};
use rand::Rng;

/// Every factor that went into one damage roll
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRoll {
    pub base: u32,
    pub effectiveness: f64,
    pub race_bonus: f64,
    pub hook_multiplier: f64,
    pub critical: bool,
    pub variance: f64,
    pub ambient: f64,
    /// Final damage before the defender's hooks, at least 1
    pub amount: u32,
}

/// `floor(((2L + 10) * P * atk) / (250 * def)) + 2`, using category stats
pub fn base_damage(attacker: &CharacterInstance, defender: &CharacterInstance, technique: &Technique) -> u32 {
    let level = attacker.level as u64;
    let attack = attacker.attack_stat(technique.category) as u64;
    let defense = defender.defense_stat(technique.category).max(1) as u64;
    let numerator = (2 * level + 10) * technique.power as u64 * attack;
    (numerator / (250 * defense)) as u32 + 2
}

/// Attacker trait then equipment output multipliers
pub fn hook_multiplier(attacker: &CharacterInstance, defender: &CharacterInstance, technique: &Technique) -> f64 {
    attacker
        .hooks()
        .iter()
        .map(|h| h.damage_output_multiplier(attacker, defender, technique))
        .product()
}

/// Ambient magic scaling; only magical techniques are affected
pub fn ambient_multiplier(technique: &Technique, field: &Field, constants: &BattleConstants) -> f64 {
    if technique.category != TechniqueCategory::Magical {
        return 1.0;
    }
    match field.ambient_magic {
        AmbientMagic::DenseMana => constants.ambient.dense_mana_damage,
        AmbientMagic::NullField => constants.ambient.null_field_damage,
        _ => 1.0,
    }
}

pub fn crit_chance(attacker: &CharacterInstance, constants: &BattleConstants) -> f64 {
    let base = if attacker.volatile.focused_aura {
        constants.crit.focused_chance
    } else {
        constants.crit.base_chance
    };
    base + attacker.crit_chance_boost()
}

/// Roll damage for `technique`. Returns `None` for moves that never deal damage.
pub fn calculate_damage<R: Rng + ?Sized>(
    attacker: &CharacterInstance,
    defender: &CharacterInstance,
    technique: &Technique,
    field: &Field,
    constants: &BattleConstants,
    rng: &mut R,
) -> Option<DamageRoll> {
    if !technique.deals_damage() {
        return None;
    }

    // Step 1: Base damage from level, power and category stats
    let base = base_damage(attacker, defender, technique);

    // Step 2: Affinity chart and race bonus
    let effectiveness = AffinityMatrix::effectiveness(technique.affinity, &defender.affinities);
    let race_bonus = AffinityMatrix::race_bonus(technique.affinity, &attacker.races);

    // Step 3: Trait and equipment output
    let hook_multiplier = hook_multiplier(attacker, defender, technique);

    // Step 4: Critical hit
    let critical = rng.gen::<f64>() < crit_chance(attacker, constants);
    let crit_multiplier = if critical { constants.crit.multiplier } else { 1.0 };

    // Step 5: Random variance and ambient magic
    let variance = if constants.variance.min >= constants.variance.max {
        constants.variance.max
    } else {
        rng.gen_range(constants.variance.min..=constants.variance.max)
    };
    let ambient = ambient_multiplier(technique, field, constants);

    let total = base as f64 * effectiveness * race_bonus * hook_multiplier * crit_multiplier * variance * ambient;
    let amount = (total.floor() as u32).max(1);

    Some(DamageRoll {
        base,
        effectiveness,
        race_bonus,
        hook_multiplier,
        critical,
        variance,
        ambient,
        amount,
    })
}

/// Average damage with no crit and mean variance. Used for planning, never for resolution.
pub fn expected_damage(
    attacker: &CharacterInstance,
    defender: &CharacterInstance,
    technique: &Technique,
    field: &Field,
    constants: &BattleConstants,
) -> f64 {
    if !technique.deals_damage() {
        return 0.0;
    }
    base_damage(attacker, defender, technique) as f64
        * AffinityMatrix::effectiveness(technique.affinity, &defender.affinities)
        * AffinityMatrix::race_bonus(technique.affinity, &attacker.races)
        * hook_multiplier(attacker, defender, technique)
        * constants.variance.mean()
        * ambient_multiplier(technique, field, constants)
        * technique.precision.unwrap_or(1.0).min(1.0)
}

/// Hit chance after terrain and the user's precision hooks; `None` never misses
pub fn effective_precision(user: &CharacterInstance, technique: &Technique, field: &Field) -> Option<f64> {
    let precision = technique.precision?;
    let mut modifier = 1.0;
    if field.terrain == Terrain::ObscuringMist {
        if technique.category == TechniqueCategory::Physical {
            modifier *= 0.8;
        }
        if technique.affinity == Affinity::Illusion {
            modifier *= 1.2;
        }
    }
    let hooks: f64 = user.hooks().iter().map(|h| h.precision_multiplier(user, technique)).product();
    Some((precision * modifier * hooks).min(1.0))
}

/// Whether the technique connects
pub fn roll_hit<R: Rng + ?Sized>(user: &CharacterInstance, technique: &Technique, field: &Field, rng: &mut R) -> bool {
    match effective_precision(user, technique, field) {
        Some(p) => rng.gen::<f64>() < p,
        None => true,
    }
}

/// Confusion self-hit: `floor(power * atk / 100) + 2`
pub fn confusion_damage(user: &CharacterInstance, constants: &BattleConstants) -> u32 {
    let attack = user.attack_stat(TechniqueCategory::Physical) as u64;
    (constants.conditions.confusion_self_hit_power as u64 * attack / 100) as u32 + 2
}
