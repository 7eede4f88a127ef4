//! Trait catalogue

use super::{AbilityHooks, HookContext};
use crate::character::CharacterInstance;
use crate::technique::Technique;
use crate::types::{Affinity, Condition, Race, StatKind, TechniqueCategory};
use rand::{Rng, RngCore};
use std::sync::Arc;

pub const TRAIT_IDS: &[&str] = &[
    "magic_perception",
    "mana_regeneration",
    "aura_of_domination",
    "iron_will",
    "magic_absorption",
    "ancient_knowledge",
    "heroic_resolve",
    "demonic_resilience",
    "battle_instinct",
    "elemental_mastery",
    "berserker",
    "shadow_step",
    "regenerative_healing",
    "spellbreaker",
    "guardian",
    "combat_veteran",
    "natural_healer",
];

pub(super) fn lookup(id: &str) -> Option<Arc<dyn AbilityHooks>> {
    let hooks: Arc<dyn AbilityHooks> = match id {
        "magic_perception" => Arc::new(MagicPerception),
        "mana_regeneration" => Arc::new(ManaRegeneration),
        "aura_of_domination" => Arc::new(AuraOfDomination),
        "iron_will" => Arc::new(IronWill),
        "magic_absorption" => Arc::new(MagicAbsorption),
        "ancient_knowledge" => Arc::new(AncientKnowledge),
        "heroic_resolve" => Arc::new(HeroicResolve),
        "demonic_resilience" => Arc::new(DemonicResilience),
        "battle_instinct" => Arc::new(BattleInstinct),
        "elemental_mastery" => Arc::new(ElementalMastery),
        "berserker" => Arc::new(Berserker),
        "shadow_step" => Arc::new(ShadowStep),
        "regenerative_healing" => Arc::new(RegenerativeHealing),
        "spellbreaker" => Arc::new(Spellbreaker),
        "guardian" => Arc::new(Guardian),
        "combat_veteran" => Arc::new(CombatVeteran),
        "natural_healer" => Arc::new(NaturalHealer),
        _ => return None,
    };
    Some(hooks)
}

fn is_elemental(affinity: Affinity) -> bool {
    matches!(
        affinity,
        Affinity::ElementalFire
            | Affinity::ElementalWater
            | Affinity::ElementalEarth
            | Affinity::ElementalWind
            | Affinity::ElementalIce
            | Affinity::ElementalLightning
    )
}

/// Sees through illusions: better accuracy
#[derive(Debug)]
pub struct MagicPerception;

impl AbilityHooks for MagicPerception {
    fn id(&self) -> &str {
        "magic_perception"
    }

    fn name(&self) -> &str {
        "Magic Perception"
    }

    fn precision_multiplier(&self, _user: &CharacterInstance, _technique: &Technique) -> f64 {
        1.15
    }
}

/// Recovers 10% of max mana each turn
#[derive(Debug)]
pub struct ManaRegeneration;

impl AbilityHooks for ManaRegeneration {
    fn id(&self) -> &str {
        "mana_regeneration"
    }

    fn name(&self) -> &str {
        "Mana Regeneration"
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        let regen = owner.max_mana() / 10;
        let restored = owner.restore_mana(regen);
        if restored > 0 {
            ctx.log.push(format!("{} regenerated {} mana.", owner.name, restored));
        }
    }
}

/// Lowers the magic stats of non-demon opponents on entry
#[derive(Debug)]
pub struct AuraOfDomination;

impl AbilityHooks for AuraOfDomination {
    fn id(&self) -> &str {
        "aura_of_domination"
    }

    fn name(&self) -> &str {
        "Aura of Domination"
    }

    fn on_enter_field(
        &self,
        owner: &mut CharacterInstance,
        opponent: &mut CharacterInstance,
        ctx: &mut HookContext<'_>,
    ) {
        if opponent.races.contains(&Race::Demon) {
            return;
        }
        opponent.modify_stat_boost(StatKind::MagicAttack, -1);
        opponent.modify_stat_boost(StatKind::MagicDefense, -1);
        ctx.log.push(format!("{}'s aura overwhelms {}!", owner.name, opponent.name));
    }
}

#[derive(Debug)]
pub struct IronWill;

impl AbilityHooks for IronWill {
    fn id(&self) -> &str {
        "iron_will"
    }

    fn name(&self) -> &str {
        "Iron Will"
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, _rng: &mut dyn RngCore) -> bool {
        matches!(condition, Condition::Fear | Condition::Charmed)
    }
}

/// Restores a quarter of max mana on a knockout
#[derive(Debug)]
pub struct MagicAbsorption;

impl AbilityHooks for MagicAbsorption {
    fn id(&self) -> &str {
        "magic_absorption"
    }

    fn name(&self) -> &str {
        "Magic Absorption"
    }

    fn mana_restore_on_ko(&self, survivor: &CharacterInstance) -> u32 {
        survivor.max_mana() / 4
    }
}

#[derive(Debug)]
pub struct AncientKnowledge;

impl AbilityHooks for AncientKnowledge {
    fn id(&self) -> &str {
        "ancient_knowledge"
    }

    fn name(&self) -> &str {
        "Ancient Knowledge"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.category == TechniqueCategory::Magical {
            1.3
        } else {
            1.0
        }
    }
}

/// Physical hits land harder below a third of max HP
#[derive(Debug)]
pub struct HeroicResolve;

impl AbilityHooks for HeroicResolve {
    fn id(&self) -> &str {
        "heroic_resolve"
    }

    fn name(&self) -> &str {
        "Heroic Resolve"
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.category == TechniqueCategory::Physical && attacker.hp_fraction() < 0.33 {
            1.5
        } else {
            1.0
        }
    }
}

#[derive(Debug)]
pub struct DemonicResilience;

impl AbilityHooks for DemonicResilience {
    fn id(&self) -> &str {
        "demonic_resilience"
    }

    fn name(&self) -> &str {
        "Demonic Resilience"
    }

    fn on_receive_damage(
        &self,
        _defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        _ctx: &mut HookContext<'_>,
    ) -> u32 {
        (damage as f64 * 0.85).floor() as u32
    }
}

#[derive(Debug)]
pub struct BattleInstinct;

impl AbilityHooks for BattleInstinct {
    fn id(&self) -> &str {
        "battle_instinct"
    }

    fn name(&self) -> &str {
        "Battle Instinct"
    }

    fn crit_chance_boost(&self) -> f64 {
        0.0625
    }
}

#[derive(Debug)]
pub struct ElementalMastery;

impl AbilityHooks for ElementalMastery {
    fn id(&self) -> &str {
        "elemental_mastery"
    }

    fn name(&self) -> &str {
        "Elemental Mastery"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if is_elemental(technique.affinity) {
            1.3
        } else {
            1.0
        }
    }
}

/// Up to +50% damage as HP drops below half
#[derive(Debug)]
pub struct Berserker;

impl AbilityHooks for Berserker {
    fn id(&self) -> &str {
        "berserker"
    }

    fn name(&self) -> &str {
        "Berserker"
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        let ratio = attacker.hp_fraction();
        if ratio < 0.5 {
            1.0 + (0.5 - ratio)
        } else {
            1.0
        }
    }
}

/// 25% chance to slip out of a hit entirely
#[derive(Debug)]
pub struct ShadowStep;

impl AbilityHooks for ShadowStep {
    fn id(&self) -> &str {
        "shadow_step"
    }

    fn name(&self) -> &str {
        "Shadow Step"
    }

    fn on_receive_damage(
        &self,
        defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) -> u32 {
        if ctx.rng.gen::<f64>() < 0.25 {
            ctx.log.push(format!("{} stepped into the shadows and dodged!", defender.name));
            0
        } else {
            damage
        }
    }
}

/// Heals 1/16 of max HP each turn
#[derive(Debug)]
pub struct RegenerativeHealing;

impl AbilityHooks for RegenerativeHealing {
    fn id(&self) -> &str {
        "regenerative_healing"
    }

    fn name(&self) -> &str {
        "Regenerative Healing"
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        let healed = owner.heal(owner.max_hp() / 16);
        if healed > 0 {
            ctx.log.push(format!("{} regenerated {} HP.", owner.name, healed));
        }
    }
}

/// Shrugs off any condition half the time
#[derive(Debug)]
pub struct Spellbreaker;

impl AbilityHooks for Spellbreaker {
    fn id(&self) -> &str {
        "spellbreaker"
    }

    fn name(&self) -> &str {
        "Spellbreaker"
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, _condition: Condition, rng: &mut dyn RngCore) -> bool {
        rng.gen::<f64>() < 0.5
    }
}

#[derive(Debug)]
pub struct Guardian;

impl AbilityHooks for Guardian {
    fn id(&self) -> &str {
        "guardian"
    }

    fn name(&self) -> &str {
        "Guardian"
    }

    fn on_receive_damage(
        &self,
        _defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        _ctx: &mut HookContext<'_>,
    ) -> u32 {
        (damage as f64 * 0.9).floor() as u32
    }
}

#[derive(Debug)]
pub struct CombatVeteran;

impl AbilityHooks for CombatVeteran {
    fn id(&self) -> &str {
        "combat_veteran"
    }

    fn name(&self) -> &str {
        "Combat Veteran"
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, _rng: &mut dyn RngCore) -> bool {
        condition == Condition::Fear
    }
}

#[derive(Debug)]
pub struct NaturalHealer;

impl AbilityHooks for NaturalHealer {
    fn id(&self) -> &str {
        "natural_healer"
    }

    fn name(&self) -> &str {
        "Natural Healer"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.affinity == Affinity::Healing {
            1.5
        } else {
            1.0
        }
    }
}
