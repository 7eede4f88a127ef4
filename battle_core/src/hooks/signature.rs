//! Signature abilities that keep their own state in [`AbilityState`]

use super::{AbilityHooks, HookContext};
use crate::character::{AbilityState, CharacterInstance};
use crate::technique::Technique;
use crate::types::{Affinity, Condition, Race, StatKind};
use rand::{Rng, RngCore};
use std::sync::Arc;

pub const SIGNATURE_IDS: &[&str] = &[
    "bravest_coward",
    "until_the_end_of_time",
    "toying_around",
    "analysis",
    "chain_attack",
    "the_hero",
    "prodigious_talent",
    "perseverance",
    "superior_opponent",
    "founder_of_humanity_magic",
    "graze",
    "goddess_blessing",
    "proctor",
    "high_speed_escape",
    "reckless_empathy",
    "resolve_to_kill",
];

pub(super) fn lookup(id: &str) -> Option<Arc<dyn AbilityHooks>> {
    let hooks: Arc<dyn AbilityHooks> = match id {
        "bravest_coward" => Arc::new(BravestCoward),
        "until_the_end_of_time" => Arc::new(UntilTheEndOfTime),
        "toying_around" => Arc::new(ToyingAround),
        "analysis" => Arc::new(Analysis),
        "chain_attack" => Arc::new(ChainAttack),
        "the_hero" => Arc::new(TheHero),
        "prodigious_talent" => Arc::new(ProdigiousTalent),
        "perseverance" => Arc::new(Perseverance),
        "superior_opponent" => Arc::new(SuperiorOpponent),
        "founder_of_humanity_magic" => Arc::new(FounderOfHumanityMagic),
        "graze" => Arc::new(Graze),
        "goddess_blessing" => Arc::new(GoddessBlessing),
        "proctor" => Arc::new(Proctor),
        "high_speed_escape" => Arc::new(HighSpeedEscape),
        "reckless_empathy" => Arc::new(RecklessEmpathy),
        "resolve_to_kill" => Arc::new(ResolveToKill),
        _ => return None,
    };
    Some(hooks)
}

const MAX_RESOLVE: i32 = 3;
const ARMY_STRENGTH: u32 = 60;
const MAX_ANALYSIS_STACKS: u32 = 10;
const MAX_CHAIN_STACKS: u32 = 10;
const PERSEVERANCE_STACKS: u32 = 3;
/// Overkill at or past this costs a second perseverance stack
const PERSEVERANCE_OVERKILL: u32 = 20;
const EYE_CONTACT_TURNS: u32 = 3;
const THEORIES_TO_PINNACLE: u32 = 4;
const PROCTOR_OBSERVATIONS: u32 = 15;
const MAX_GRAZE: f64 = 0.8;

/// Resolve climbs with every attack and sinks with every retreat.
/// Positive resolve: +20% damage, negative: -20%.
#[derive(Debug)]
pub struct BravestCoward;

impl AbilityHooks for BravestCoward {
    fn id(&self) -> &str {
        "bravest_coward"
    }

    fn name(&self) -> &str {
        "Bravest Coward"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Resolve { resolve: 0 }
    }

    fn after_technique(&self, owner: &mut CharacterInstance, technique: &Technique, ctx: &mut HookContext<'_>) {
        if let AbilityState::Resolve { resolve } = &mut owner.ability_state {
            let delta = if technique.deals_damage() { 1 } else { -1 };
            let next = (*resolve + delta).clamp(-MAX_RESOLVE, MAX_RESOLVE);
            if next != *resolve {
                *resolve = next;
                ctx.log.push(format!("{}'s resolve is now {}.", owner.name, next));
            }
        }
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        match attacker.ability_state {
            AbilityState::Resolve { resolve } if resolve > 0 => 1.2,
            AbilityState::Resolve { resolve } if resolve < 0 => 0.8,
            _ => 1.0,
        }
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, rng: &mut dyn RngCore) -> bool {
        matches!(condition, Condition::Exhausted | Condition::Stunned) && rng.gen::<f64>() < 0.3
    }
}

/// An undead army soaks half of every hit until it is worn down
#[derive(Debug)]
pub struct UntilTheEndOfTime;

impl AbilityHooks for UntilTheEndOfTime {
    fn id(&self) -> &str {
        "until_the_end_of_time"
    }

    fn name(&self) -> &str {
        "Until the End of Time"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::UndeadArmy { strength: ARMY_STRENGTH }
    }

    fn on_enter_field(
        &self,
        owner: &mut CharacterInstance,
        _opponent: &mut CharacterInstance,
        ctx: &mut HookContext<'_>,
    ) {
        if let AbilityState::UndeadArmy { strength } = owner.ability_state {
            if strength > 0 {
                ctx.log.push(format!("{} raises an undead army! (strength {})", owner.name, strength));
            }
        }
    }

    fn on_receive_damage(
        &self,
        defender: &mut CharacterInstance,
        attacker: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) -> u32 {
        let mut damage = damage;
        if attacker.races.contains(&Race::Demon) {
            damage = (damage as f64 * 0.7).floor() as u32;
        }

        if let AbilityState::UndeadArmy { strength } = &mut defender.ability_state {
            if *strength > 0 {
                let absorbed = damage / 2;
                *strength = strength.saturating_sub(absorbed);
                ctx.log.push(format!("{}'s army absorbs {} damage!", defender.name, absorbed));
                return damage - absorbed;
            }
        }
        damage
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if let AbilityState::UndeadArmy { strength } = &mut owner.ability_state {
            if *strength > 0 && *strength < 20 {
                *strength = strength.saturating_sub(5);
                ctx.log.push(format!("{}'s army weakens as soldiers fall!", owner.name));
            }
        }
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, _rng: &mut dyn RngCore) -> bool {
        matches!(condition, Condition::Fear | Condition::Charmed)
    }
}

/// +30% damage, but the turn after an attack is spent aloof at -30%
#[derive(Debug)]
pub struct ToyingAround;

impl AbilityHooks for ToyingAround {
    fn id(&self) -> &str {
        "toying_around"
    }

    fn name(&self) -> &str {
        "Toying Around"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Toying {
            aloof_next: false,
            aloof_now: false,
        }
    }

    fn after_technique(&self, owner: &mut CharacterInstance, technique: &Technique, _ctx: &mut HookContext<'_>) {
        if let AbilityState::Toying { aloof_next, aloof_now } = &mut owner.ability_state {
            if technique.deals_damage() && !*aloof_now {
                *aloof_next = true;
            }
        }
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        match attacker.ability_state {
            AbilityState::Toying { aloof_now: true, .. } => 0.7,
            _ => 1.3,
        }
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if let AbilityState::Toying { aloof_next, aloof_now } = &mut owner.ability_state {
            *aloof_now = *aloof_next;
            *aloof_next = false;
            if *aloof_now {
                ctx.log.push(format!("{} acts aloof.", owner.name));
            }
        }
    }
}

/// Stacks build each turn (faster with detection magic) and add 7% damage each;
/// attacking spends them
#[derive(Debug)]
pub struct Analysis;

impl Analysis {
    fn add_stacks(owner: &mut CharacterInstance, amount: u32) -> Option<u32> {
        match &mut owner.ability_state {
            AbilityState::Analysis { stacks } if *stacks < MAX_ANALYSIS_STACKS => {
                *stacks = (*stacks + amount).min(MAX_ANALYSIS_STACKS);
                Some(*stacks)
            }
            _ => None,
        }
    }
}

impl AbilityHooks for Analysis {
    fn id(&self) -> &str {
        "analysis"
    }

    fn name(&self) -> &str {
        "Analysis"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Analysis { stacks: 0 }
    }

    fn after_technique(&self, owner: &mut CharacterInstance, technique: &Technique, ctx: &mut HookContext<'_>) {
        if technique.deals_damage() {
            if let AbilityState::Analysis { stacks } = &mut owner.ability_state {
                *stacks = 0;
            }
        } else if technique.affinity == Affinity::Detection {
            if let Some(total) = Analysis::add_stacks(owner, 2) {
                ctx.log.push(format!("{} gains 2 Analysis stacks (total: {})", owner.name, total));
            }
        }
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        match attacker.ability_state {
            AbilityState::Analysis { stacks } => 1.0 + stacks as f64 * 0.07,
            _ => 1.0,
        }
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if let Some(total) = Analysis::add_stacks(owner, 1) {
            ctx.log.push(format!("{} gains 1 Analysis stack (total: {})", owner.name, total));
        }
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, rng: &mut dyn RngCore) -> bool {
        condition == Condition::Confused && rng.gen::<f64>() < 0.3
    }
}

/// Each turn spent attacking adds a chain stack worth +10% damage;
/// a turn without an attack breaks the chain
#[derive(Debug)]
pub struct ChainAttack;

impl AbilityHooks for ChainAttack {
    fn id(&self) -> &str {
        "chain_attack"
    }

    fn name(&self) -> &str {
        "Chain Attack"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Chain {
            stacks: 0,
            attacked: false,
        }
    }

    fn after_technique(&self, owner: &mut CharacterInstance, technique: &Technique, _ctx: &mut HookContext<'_>) {
        if let AbilityState::Chain { attacked, .. } = &mut owner.ability_state {
            if technique.deals_damage() {
                *attacked = true;
            }
        }
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        match attacker.ability_state {
            AbilityState::Chain { stacks, .. } => 1.0 + stacks as f64 * 0.1,
            _ => 1.0,
        }
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if let AbilityState::Chain { stacks, attacked } = &mut owner.ability_state {
            if *attacked {
                *stacks = (*stacks + 1).min(MAX_CHAIN_STACKS);
                ctx.log.push(format!("{} continues the chain attack! ({} stacks)", owner.name, stacks));
            } else if *stacks > 0 {
                *stacks = 0;
                ctx.log.push(format!("{} ended the chain.", owner.name));
            }
            *attacked = false;
        }
    }
}

/// One-time +1 to every stat on entry, +5% damage per raised stat,
/// and demons hit for 20% less
#[derive(Debug)]
pub struct TheHero;

impl AbilityHooks for TheHero {
    fn id(&self) -> &str {
        "the_hero"
    }

    fn name(&self) -> &str {
        "The Hero"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Hero { presence_shown: false }
    }

    fn on_enter_field(
        &self,
        owner: &mut CharacterInstance,
        _opponent: &mut CharacterInstance,
        ctx: &mut HookContext<'_>,
    ) {
        if let AbilityState::Hero { presence_shown: false } = owner.ability_state {
            for stat in StatKind::BOOSTABLE {
                owner.modify_stat_boost(stat, 1);
            }
            owner.ability_state = AbilityState::Hero { presence_shown: true };
            ctx.log.push(format!("{}'s heroic presence strengthens him!", owner.name));
        }
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        let buffs = attacker.stat_boosts().iter().filter(|(_, stage)| *stage > 0).count();
        1.0 + buffs as f64 * 0.05
    }

    fn on_receive_damage(
        &self,
        _defender: &mut CharacterInstance,
        attacker: &CharacterInstance,
        damage: u32,
        _ctx: &mut HookContext<'_>,
    ) -> u32 {
        if attacker.races.contains(&Race::Demon) {
            (damage as f64 * 0.8).floor() as u32
        } else {
            damage
        }
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, rng: &mut dyn RngCore) -> bool {
        matches!(condition, Condition::Fear | Condition::Charmed) && rng.gen::<f64>() < 0.6
    }
}

/// Restores 8% max mana every turn; fast magic hits 20% harder
#[derive(Debug)]
pub struct ProdigiousTalent;

impl AbilityHooks for ProdigiousTalent {
    fn id(&self) -> &str {
        "prodigious_talent"
    }

    fn name(&self) -> &str {
        "Prodigious Talent"
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        let amount = (owner.max_mana() as f64 * 0.08).floor() as u32;
        let restored = owner.restore_mana(amount);
        if restored > 0 {
            ctx.log.push(format!("{}'s talent restores {} mana!", owner.name, restored));
        }
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.properties.magic_based && technique.initiative >= 0 {
            1.2
        } else {
            1.0
        }
    }

    fn prevent_condition(&self, _owner: &CharacterInstance, condition: Condition, rng: &mut dyn RngCore) -> bool {
        condition == Condition::MagicSeal && rng.gen::<f64>() < 0.4
    }
}

/// A blow that would knock the owner out leaves it at 1 HP instead, at the
/// cost of a stack (two on heavy overkill)
#[derive(Debug)]
pub struct Perseverance;

impl AbilityHooks for Perseverance {
    fn id(&self) -> &str {
        "perseverance"
    }

    fn name(&self) -> &str {
        "Perseverance"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Perseverance {
            stacks: PERSEVERANCE_STACKS,
        }
    }

    fn on_receive_damage(
        &self,
        defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) -> u32 {
        let hp = defender.current_hp();
        let AbilityState::Perseverance { stacks } = &mut defender.ability_state else {
            return damage;
        };
        if damage < hp || *stacks == 0 {
            return damage;
        }

        let cost = if damage - hp >= PERSEVERANCE_OVERKILL { 2 } else { 1 };
        *stacks = stacks.saturating_sub(cost);
        if *stacks > 0 {
            ctx.log.push(format!("{} steels himself! ({} stacks remaining)", defender.name, stacks));
            hp.saturating_sub(1)
        } else {
            ctx.log.push(format!("{}'s strength finally fades.", defender.name));
            damage
        }
    }
}

/// Locks eyes on entry; for three turns the owner's techniques are 20% more precise
#[derive(Debug)]
pub struct SuperiorOpponent;

impl AbilityHooks for SuperiorOpponent {
    fn id(&self) -> &str {
        "superior_opponent"
    }

    fn name(&self) -> &str {
        "A Superior Opponent"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::EyeContact { turns: 0 }
    }

    fn on_enter_field(
        &self,
        owner: &mut CharacterInstance,
        opponent: &mut CharacterInstance,
        ctx: &mut HookContext<'_>,
    ) {
        owner.ability_state = AbilityState::EyeContact {
            turns: EYE_CONTACT_TURNS,
        };
        ctx.log.push(format!("{} locks eyes with {}!", owner.name, opponent.name));
    }

    fn precision_multiplier(&self, user: &CharacterInstance, _technique: &Technique) -> f64 {
        match user.ability_state {
            AbilityState::EyeContact { turns } if turns > 0 => 1.2,
            _ => 1.0,
        }
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if let AbilityState::EyeContact { turns } = &mut owner.ability_state {
            if *turns > 0 {
                *turns -= 1;
                if *turns == 0 {
                    ctx.log.push(format!("{} breaks eye contact.", owner.name));
                }
            }
        }
    }
}

/// +25% magic damage. Four theory techniques unlock the pinnacle,
/// a further +50% on magic
#[derive(Debug)]
pub struct FounderOfHumanityMagic;

impl AbilityHooks for FounderOfHumanityMagic {
    fn id(&self) -> &str {
        "founder_of_humanity_magic"
    }

    fn name(&self) -> &str {
        "Founder of Humanity's Magic"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Theory {
            count: 0,
            pinnacle: false,
        }
    }

    fn after_technique(&self, owner: &mut CharacterInstance, technique: &Technique, ctx: &mut HookContext<'_>) {
        if !technique.properties.theory {
            return;
        }
        if let AbilityState::Theory { count, pinnacle } = &mut owner.ability_state {
            if *pinnacle {
                return;
            }
            *count += 1;
            ctx.log.push(format!(
                "{} advances magical theory ({}/{})",
                owner.name, count, THEORIES_TO_PINNACLE
            ));
            if *count >= THEORIES_TO_PINNACLE {
                *pinnacle = true;
                ctx.log.push(format!("{} has discovered the Pinnacle of Humanity's Magic!", owner.name));
            }
        }
    }

    fn damage_output_multiplier(
        &self,
        attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if !technique.properties.magic_based {
            return 1.0;
        }
        match attacker.ability_state {
            AbilityState::Theory { pinnacle: true, .. } => 1.25 * 1.5,
            _ => 1.25,
        }
    }
}

/// Incoming damage shrinks by the speed lead over the attacker, one percent
/// per point, at most 80%
#[derive(Debug)]
pub struct Graze;

impl AbilityHooks for Graze {
    fn id(&self) -> &str {
        "graze"
    }

    fn name(&self) -> &str {
        "Graze"
    }

    fn on_receive_damage(
        &self,
        defender: &mut CharacterInstance,
        attacker: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) -> u32 {
        let lead = defender.effective_stat(StatKind::Speed) as f64 - attacker.effective_stat(StatKind::Speed) as f64;
        let reduction = (lead / 100.0).clamp(0.0, MAX_GRAZE);
        if reduction <= 0.0 {
            return damage;
        }
        ctx.log.push(format!("{} grazes the attack with superior speed!", defender.name));
        (damage as f64 * (1.0 - reduction)).floor() as u32
    }
}

/// Heals `floor(2 + turn / 5)` HP every turn end
#[derive(Debug)]
pub struct GoddessBlessing;

impl AbilityHooks for GoddessBlessing {
    fn id(&self) -> &str {
        "goddess_blessing"
    }

    fn name(&self) -> &str {
        "Goddess' Blessing"
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        let amount = 2 + ctx.field.turn / 5;
        let healed = owner.heal(amount);
        if healed > 0 {
            ctx.log.push(format!("{} receives the Goddess' Blessing and heals {} HP!", owner.name, healed));
        }
    }
}

/// Each turn without attacking adds an observation, each attacking turn
/// removes one. Fifteen observations win the battle.
#[derive(Debug)]
pub struct Proctor;

impl AbilityHooks for Proctor {
    fn id(&self) -> &str {
        "proctor"
    }

    fn name(&self) -> &str {
        "Proctor"
    }

    fn initial_state(&self) -> AbilityState {
        AbilityState::Proctor {
            observations: 0,
            attacked: false,
        }
    }

    fn after_technique(&self, owner: &mut CharacterInstance, technique: &Technique, _ctx: &mut HookContext<'_>) {
        if let AbilityState::Proctor { attacked, .. } = &mut owner.ability_state {
            if technique.deals_damage() {
                *attacked = true;
            }
        }
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if let AbilityState::Proctor { observations, attacked } = &mut owner.ability_state {
            if *attacked {
                *observations = observations.saturating_sub(1);
                ctx.log.push(format!("{} went on the offensive!", owner.name));
            } else {
                *observations = (*observations + 1).min(PROCTOR_OBSERVATIONS);
                ctx.log.push(format!(
                    "{} continues to observe. ({}/{})",
                    owner.name, observations, PROCTOR_OBSERVATIONS
                ));
            }
            *attacked = false;
        }
    }

    fn claims_victory(&self, owner: &CharacterInstance) -> bool {
        matches!(owner.ability_state, AbilityState::Proctor { observations, .. } if observations >= PROCTOR_OBSERVATIONS)
    }
}

/// Rolls 1..=100 against every hit; under half the owner's base speed evades it
#[derive(Debug)]
pub struct HighSpeedEscape;

impl AbilityHooks for HighSpeedEscape {
    fn id(&self) -> &str {
        "high_speed_escape"
    }

    fn name(&self) -> &str {
        "High-speed Escape"
    }

    fn on_receive_damage(
        &self,
        defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) -> u32 {
        let roll: u32 = ctx.rng.gen_range(1..=100);
        if roll < defender.base_stats().speed / 2 {
            ctx.log.push(format!("{} evaded the attack with high speed!", defender.name));
            0
        } else {
            damage
        }
    }
}

/// Slashing techniques deal 30% more damage
#[derive(Debug)]
pub struct RecklessEmpathy;

impl AbilityHooks for RecklessEmpathy {
    fn id(&self) -> &str {
        "reckless_empathy"
    }

    fn name(&self) -> &str {
        "Reckless Empathy"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.properties.slashing {
            1.3
        } else {
            1.0
        }
    }
}

/// Taking a hit behind a mana shield raises Attack one stage
#[derive(Debug)]
pub struct ResolveToKill;

impl AbilityHooks for ResolveToKill {
    fn id(&self) -> &str {
        "resolve_to_kill"
    }

    fn name(&self) -> &str {
        "Resolve to Kill"
    }

    fn on_receive_damage(
        &self,
        defender: &mut CharacterInstance,
        _attacker: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) -> u32 {
        if defender.volatile.mana_shield && damage > 0 && defender.modify_stat_boost(StatKind::Attack, 1) > 0 {
            ctx.log.push(format!("{} steels his resolve! Attack rose.", defender.name));
        }
        damage
    }
}
