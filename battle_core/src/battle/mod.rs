//! BattleEngine - validates and resolves techniques, switches and turn ends
//!
//! Every operation runs to completion. A rejected action returns a typed error
//! before mutating anything.

mod damage;
mod log;
mod state;
mod targeting;
mod turn;

pub use damage::{
    base_damage, calculate_damage, confusion_damage, effective_precision, expected_damage, roll_hit, DamageRoll,
};
pub use log::{BattleLog, LogEntry};
pub use state::{BattleOutcome, BattleState, Field, HazardLayers, Party};
pub use targeting::{resolve_targets, Targets};
pub use turn::hazard_damage;

use crate::affinity::AffinityMatrix;
use crate::character::{CharacterInstance, MISTY_AURA_DECOY_CHANCE};
use crate::config::BattleConstants;
use crate::error::{BattleError, InvariantViolation};
use crate::hooks::HookContext;
use crate::technique::{EffectOutcome, Technique, TechniqueEffect};
use crate::types::{AmbientMagic, Condition, EffectTarget, Side, Terrain};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use state::split_parties;

/// One landed hit
#[derive(Debug, Clone, PartialEq)]
pub struct HitReport {
    pub target: String,
    pub damage: u32,
    pub critical: bool,
    pub effectiveness: f64,
    pub defeated: bool,
}

/// What a resolved technique did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TechniqueReport {
    pub user: String,
    pub technique: String,
    pub mana_spent: u32,
    pub missed: bool,
    /// The user spent this action gathering a concentration charge
    pub charging: bool,
    /// HP the user lost hitting itself in confusion
    pub self_hit: Option<u32>,
    pub hits: Vec<HitReport>,
    pub effects: Vec<EffectOutcome>,
}

impl TechniqueReport {
    pub fn total_damage(&self) -> u32 {
        self.hits.iter().map(|h| h.damage).sum()
    }

    /// One-line description for the acting participant
    pub fn summary(&self) -> String {
        if let Some(lost) = self.self_hit {
            return format!("{} hurt itself in confusion for {} HP", self.user, lost);
        }
        if self.charging {
            return format!("{} is gathering power for {}", self.user, self.technique);
        }
        if self.missed {
            return format!("{}'s {} missed", self.user, self.technique);
        }
        let mut summary = format!("{} used {}", self.user, self.technique);
        for hit in &self.hits {
            summary.push_str(&format!(", dealing {} damage to {}", hit.damage, hit.target));
            if hit.defeated {
                summary.push_str(&format!(" ({} was defeated)", hit.target));
            }
        }
        summary
    }
}

#[derive(Debug)]
pub struct BattleEngine {
    state: BattleState,
    constants: BattleConstants,
    rng: StdRng,
}

impl BattleEngine {
    /// Start a battle between two parties, seeding the rng from entropy
    pub fn new(
        party_a: Vec<CharacterInstance>,
        party_b: Vec<CharacterInstance>,
        constants: BattleConstants,
    ) -> Result<Self, BattleError> {
        Self::with_rng(party_a, party_b, constants, StdRng::from_entropy())
    }

    /// Deterministic battle for tests and replays
    pub fn with_seed(
        party_a: Vec<CharacterInstance>,
        party_b: Vec<CharacterInstance>,
        constants: BattleConstants,
        seed: u64,
    ) -> Result<Self, BattleError> {
        Self::with_rng(party_a, party_b, constants, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        party_a: Vec<CharacterInstance>,
        party_b: Vec<CharacterInstance>,
        constants: BattleConstants,
        rng: StdRng,
    ) -> Result<Self, BattleError> {
        for (side, party) in [(Side::A, &party_a), (Side::B, &party_b)] {
            validate_party(side, party, &constants)?;
        }

        let mut engine = BattleEngine {
            state: BattleState::new(Party::new(party_a), Party::new(party_b)),
            constants,
            rng,
        };
        for side in Side::BOTH {
            let name = engine.state.active(side).name.clone();
            engine.state.log.push(format!("{} sends out {}!", side, name));
        }
        for side in Side::BOTH {
            engine.enter_field(side);
        }
        tracing::debug!("battle engine ready");
        Ok(engine)
    }

    // === Queries ===

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn party(&self, side: Side) -> &Party {
        self.state.party(side)
    }

    pub fn active(&self, side: Side) -> &CharacterInstance {
        self.state.active(side)
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn field(&self) -> Field {
        self.state.field()
    }

    pub fn log(&self) -> &BattleLog {
        &self.state.log
    }

    pub fn constants(&self) -> &BattleConstants {
        &self.constants
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.state.outcome()
    }

    pub fn is_complete(&self) -> bool {
        self.outcome().is_some()
    }

    /// Winning side; `None` while running or on a draw
    pub fn winner(&self) -> Option<Side> {
        self.outcome().and_then(BattleOutcome::winner)
    }

    /// Bench indices `side` may switch to
    pub fn available_switches(&self, side: Side) -> Vec<usize> {
        let party = self.state.party(side);
        party
            .members()
            .iter()
            .enumerate()
            .filter(|(i, m)| *i != party.active_index() && !m.is_defeated())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.state.terrain = terrain;
    }

    pub fn set_ambient_magic(&mut self, ambient: AmbientMagic) {
        self.state.ambient_magic = ambient;
    }

    /// Direct access for scripted setups
    pub fn active_mut(&mut self, side: Side) -> &mut CharacterInstance {
        self.state.active_mut(side)
    }

    // === Actions ===

    /// Use `technique_name` from the active character of `side`.
    ///
    /// Validation runs first: the user and its targets must be standing, the technique
    /// must be usable, and only then is the condition check rolled. A `CannotAct`
    /// error means the action was spent.
    pub fn execute_technique(
        &mut self,
        side: Side,
        technique_name: &str,
        target: Option<&str>,
    ) -> Result<TechniqueReport, BattleError> {
        if self.is_complete() {
            return Err(BattleError::state("The battle is already over"));
        }

        let technique = {
            let user = self.state.active(side);
            if user.is_defeated() {
                return Err(BattleError::validation(format!("{} has been defeated", user.name)));
            }
            user.technique(technique_name).ok_or_else(|| {
                BattleError::validation(format!("{} does not know {}", user.name, technique_name))
            })?
        };
        let targets = resolve_targets(&technique, self.state.party(side.opponent()), target)?;
        technique.check_usable(self.state.active(side))?;
        self.check_can_act(side)?;

        let report = self.resolve_technique(side, &technique, &targets);
        self.settle_knockouts();
        self.audit();
        Ok(report)
    }

    /// Send in the party member at `index`
    pub fn switch_character(&mut self, side: Side, index: usize) -> Result<(), BattleError> {
        if self.is_complete() {
            return Err(BattleError::state("The battle is already over"));
        }
        let party = self.state.party(side);
        let incoming = party
            .member(index)
            .ok_or_else(|| BattleError::validation(format!("No party member at position {}", index)))?;
        if incoming.is_defeated() {
            return Err(BattleError::validation(format!("{} has been defeated", incoming.name)));
        }
        if index == party.active_index() {
            return Err(BattleError::validation(format!("{} is already in battle", incoming.name)));
        }

        let outgoing = party.active().name.clone();
        let incoming = incoming.name.clone();
        self.state.log.push(format!("{}, come back!", outgoing));
        self.state.active_mut(side).volatile.clear();
        self.state.party_mut(side).set_active(index);
        self.state.log.push(format!("Go, {}!", incoming));
        tracing::debug!(%side, from = %outgoing, to = %incoming, "switch");
        self.enter_field(side);
        self.audit();
        Ok(())
    }

    /// Concede for `side`. Nobody's HP changes.
    pub fn forfeit(&mut self, side: Side) -> Result<(), BattleError> {
        if self.is_complete() {
            return Err(BattleError::state("The battle is already over"));
        }
        self.state.forfeited = Some(side);
        self.state.log.push(format!("{} forfeits the battle!", side));
        Ok(())
    }

    /// End the battle with no winner. Nobody's HP changes.
    pub fn declare_draw(&mut self) -> Result<(), BattleError> {
        if self.is_complete() {
            return Err(BattleError::state("The battle is already over"));
        }
        self.state.drawn = true;
        self.state.log.push("Both sides abandon the battle. It ends in a draw!");
        Ok(())
    }

    // === Pipeline ===

    fn check_can_act(&mut self, side: Side) -> Result<(), BattleError> {
        let BattleEngine { state, rng, .. } = self;
        let user = state.active_mut(side);
        let condition = user.condition();
        if user.can_act(rng) {
            return Ok(());
        }
        let name = user.name.clone();
        state.log.push(format!("{} is {:?} and cannot act!", name, condition));
        Err(BattleError::CannotAct { name, condition })
    }

    fn resolve_technique(&mut self, side: Side, technique: &Technique, targets: &Targets) -> TechniqueReport {
        let BattleEngine { state, constants, rng } = self;
        let field = state.field();
        let BattleState { parties, log, .. } = state;
        let (own, other) = split_parties(parties, side);
        let mut ctx = HookContext::new(field, log, rng);
        let user = own.active_mut();

        // Step 1: Pay mana
        let mana_spent = user.spend_mana_for(technique);
        user.volatile.record_use(&technique.name);
        ctx.log.push(format!("{} used {}!", user.name, technique.name));
        tracing::debug!(user = %user.name, technique = %technique.name, mana_spent, "technique");
        let mut report = TechniqueReport {
            user: user.name.clone(),
            technique: technique.name.clone(),
            mana_spent,
            ..TechniqueReport::default()
        };

        if technique.properties.concentration {
            if user.volatile.channeling {
                user.volatile.channeling = false;
                ctx.log.push(format!("{} unleashes the gathered power!", user.name));
            } else {
                user.volatile.channeling = true;
                ctx.log.push(format!("{} begins gathering power!", user.name));
                report.charging = true;
                return report;
            }
        }

        if user.condition() == Condition::Confused
            && ctx.rng.gen::<f64>() < constants.conditions.confusion_self_hit_chance
        {
            let self_damage = confusion_damage(user, constants);
            let lost = user.take_damage(self_damage);
            ctx.log.push(format!("{} is confused and hurt itself! (-{} HP)", user.name, lost));
            report.self_hit = Some(lost);
            if user.is_defeated() {
                ctx.log.push(format!("{} has been defeated!", user.name));
                credit_knockout(other.active_mut(), &mut ctx);
            }
            return report;
        }

        // Step 2: Strike hooks, aimed at the primary target or the opposing active
        let primary = targets.primary().unwrap_or_else(|| other.active_index());
        if let Some(target) = other.member_mut(primary) {
            for hook in user.hooks() {
                hook.on_strike(user, target, technique, &mut ctx);
            }
        }

        // Step 3: Precision
        if !roll_hit(user, technique, &field, &mut *ctx.rng) {
            ctx.log.push(format!("{}'s {} missed!", user.name, technique.name));
            report.missed = true;
            after_technique(user, technique, &mut ctx);
            return report;
        }

        // Step 4: Effects
        let duration = constants.conditions.duration;
        for effect in &technique.effects {
            let recipients: Vec<Option<usize>> = match targets {
                Targets::User => vec![None],
                Targets::Opponents(indices) => {
                    let per_target = effect.target() == EffectTarget::Target
                        && !matches!(effect, TechniqueEffect::Hazard { .. });
                    if per_target {
                        indices.iter().map(|&i| Some(i)).collect()
                    } else {
                        vec![Some(primary)]
                    }
                }
            };
            for recipient in recipients {
                let outcome = match recipient.and_then(|i| other.member_mut(i)) {
                    Some(target) if target.is_defeated() => continue,
                    Some(target) => effect.apply(user, Some(target), &field, duration, &mut *ctx.rng),
                    None => effect.apply(user, None, &field, duration, &mut *ctx.rng),
                };
                if let EffectOutcome::HazardLaid(kind) = outcome {
                    if !other.hazards.add(kind, constants.hazard.max_layers) {
                        ctx.log.push(format!("{:?} cannot be layered any further!", kind));
                        continue;
                    }
                }
                if let Some(line) = outcome.describe() {
                    ctx.log.push(line);
                }
                report.effects.push(outcome);
            }
        }

        // Step 5: Damage
        if let (true, Targets::Opponents(indices)) = (technique.deals_damage(), targets) {
            for &index in indices {
                let Some(target) = other.member_mut(index) else {
                    continue;
                };
                if target.is_defeated() {
                    continue;
                }
                if target.volatile.immaterial {
                    target.volatile.immaterial = false;
                    ctx.log.push(format!("{}'s attack passes right through {}!", user.name, target.name));
                    continue;
                }
                if target.volatile.misty_aura {
                    target.volatile.misty_aura = false;
                    if ctx.rng.gen::<f64>() < MISTY_AURA_DECOY_CHANCE {
                        ctx.log.push(format!("{} struck one of {}'s decoys!", user.name, target.name));
                        continue;
                    }
                }
                let Some(roll) = calculate_damage(user, target, technique, &field, constants, &mut *ctx.rng) else {
                    break;
                };
                if roll.critical {
                    ctx.log.push("A critical hit!");
                }
                if let Some(text) = AffinityMatrix::advantage_text(roll.effectiveness) {
                    ctx.log.push(text);
                }

                let mut damage = roll.amount;
                for hook in target.hooks() {
                    damage = hook.on_receive_damage(target, user, damage, &mut ctx);
                }
                let lost = target.take_damage(damage);
                ctx.log.push(format!("{} took {} damage!", target.name, lost));
                if lost > 0 && target.volatile.channeling {
                    target.volatile.channeling = false;
                    ctx.log.push(format!("{}'s concentration is broken!", target.name));
                }
                for hook in user.hooks() {
                    hook.after_damage_dealt(user, target, lost, &mut ctx);
                }

                let defeated = target.is_defeated();
                if defeated {
                    ctx.log.push(format!("{} has been defeated!", target.name));
                    credit_knockout(user, &mut ctx);
                }
                report.hits.push(HitReport {
                    target: target.name.clone(),
                    damage: lost,
                    critical: roll.critical,
                    effectiveness: roll.effectiveness,
                    defeated,
                });
            }
        }

        after_technique(user, technique, &mut ctx);
        // Hooks may have hurt the user after its own attack
        if user.is_defeated() {
            ctx.log.push(format!("{} has been defeated!", user.name));
            credit_knockout(other.active_mut(), &mut ctx);
        }
        report
    }

    /// Replace any defeated active character with the next standing teammate
    pub(crate) fn settle_knockouts(&mut self) {
        for side in Side::BOTH {
            if self.state.active(side).is_defeated() {
                self.auto_switch(side);
            }
        }
    }

    /// First standing member at a different index, in party order
    fn auto_switch(&mut self, side: Side) -> Option<usize> {
        let party = self.state.party(side);
        match party.next_standing(party.active_index()) {
            Some(next) => {
                self.state.party_mut(side).set_active(next);
                let name = self.state.active(side).name.clone();
                self.state.log.push(format!("{} sends out {}!", side, name));
                self.enter_field(side);
                Some(next)
            }
            None => {
                self.state.log.push(format!("{} has no one left to fight!", side));
                None
            }
        }
    }

    fn enter_field(&mut self, side: Side) {
        let BattleEngine { state, rng, .. } = self;
        let field = state.field();
        let BattleState { parties, log, .. } = state;
        let (own, other) = split_parties(parties, side);
        let owner = own.active_mut();
        let opponent = other.active_mut();
        let mut ctx = HookContext::new(field, log, rng);
        for hook in owner.hooks() {
            hook.on_enter_field(owner, opponent, &mut ctx);
        }
    }

    // === Consistency ===

    /// Structural checks run after every action
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        for side in Side::BOTH {
            let party = self.state.party(side);
            if party.active_index() >= party.len() {
                violations.push(InvariantViolation::ActiveIndexOutOfRange {
                    side,
                    index: party.active_index(),
                    len: party.len(),
                });
                continue;
            }
            violations.extend(party.members().iter().filter_map(|m| m.check_invariants().err()));
            let alive = party.alive_count();
            if party.active().is_defeated() && alive > 0 {
                violations.push(InvariantViolation::DefeatedActive { side, alive });
            }
        }
        violations
    }

    pub(crate) fn audit(&self) {
        for violation in self.check_invariants() {
            tracing::error!(%violation, turn = self.state.turn, "battle invariant violated");
        }
    }
}

fn validate_party(side: Side, party: &[CharacterInstance], constants: &BattleConstants) -> Result<(), BattleError> {
    if party.is_empty() {
        return Err(BattleError::validation(format!("{} has no characters", side)));
    }
    if party.len() > constants.limits.max_party_size {
        return Err(BattleError::validation(format!(
            "{} brings {} characters, at most {} allowed",
            side,
            party.len(),
            constants.limits.max_party_size
        )));
    }
    for member in party {
        if member.max_hp() == 0 {
            return Err(BattleError::validation(format!("{} has no HP", member.name)));
        }
        if member.techniques().is_empty() {
            return Err(BattleError::validation(format!("{} knows no techniques", member.name)));
        }
    }
    Ok(())
}

/// Mana the survivor's hooks grant for a knockout; a fallen survivor gets nothing
fn credit_knockout(survivor: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
    if survivor.is_defeated() {
        return;
    }
    for hook in survivor.hooks() {
        let amount = hook.mana_restore_on_ko(survivor);
        let restored = survivor.restore_mana(amount);
        if restored > 0 {
            ctx.log.push(format!("{} absorbed {} mana!", survivor.name, restored));
        }
    }
}

fn after_technique(user: &mut CharacterInstance, technique: &Technique, ctx: &mut HookContext<'_>) {
    for hook in user.hooks() {
        hook.after_technique(user, technique, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{test_character, test_character_with, test_template};
    use crate::types::{Affinity, HazardKind, StatKind, TargetType, TechniqueCategory, VolatileFlag};
    use crate::technique::Activation;
    use std::sync::Arc;

    fn with_techniques(name: &str, techniques: Vec<Technique>) -> CharacterInstance {
        let template = test_template(name);
        CharacterInstance::new(&template, "tester", techniques.into_iter().map(Arc::new).collect()).unwrap()
    }

    fn zoltraak() -> Technique {
        Technique::new("Zoltraak", Affinity::Destruction, TechniqueCategory::Magical, 70, 15)
    }

    fn engine(a: Vec<CharacterInstance>, b: Vec<CharacterInstance>) -> BattleEngine {
        BattleEngine::with_seed(a, b, BattleConstants::default(), 12345).unwrap()
    }

    fn duel() -> BattleEngine {
        engine(
            vec![with_techniques("Fern", vec![zoltraak()])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        )
    }

    #[test]
    fn test_party_validation() {
        let err = BattleEngine::new(Vec::new(), vec![test_character("Aura", &["Zoltraak"])], BattleConstants::default())
            .unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));

        let four = (0..4).map(|i| test_character(&format!("M{}", i), &["Zoltraak"])).collect();
        let err = BattleEngine::new(four, vec![test_character("Aura", &["Zoltraak"])], BattleConstants::default())
            .unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));

        let err = BattleEngine::new(
            vec![test_character("Fern", &[])],
            vec![test_character("Aura", &["Zoltraak"])],
            BattleConstants::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));
    }

    #[test]
    fn test_technique_deals_damage_and_spends_mana() {
        let mut engine = duel();
        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert_eq!(report.mana_spent, 15);
        assert_eq!(engine.active(Side::A).current_mana(), 202 - 15);
        assert_eq!(report.hits.len(), 1);
        assert!(report.hits[0].damage >= 1);
        assert_eq!(engine.active(Side::B).current_hp(), 160 - report.total_damage());
    }

    #[test]
    fn test_insufficient_mana_mutates_nothing() {
        let mut engine = duel();
        engine.active_mut(Side::A).set_current_mana(5);
        let log_len = engine.log().len();
        let err = engine.execute_technique(Side::A, "Zoltraak", None).unwrap_err();
        assert_eq!(err, BattleError::Resource { required: 15, available: 5 });
        assert_eq!(engine.active(Side::A).current_mana(), 5);
        assert_eq!(engine.active(Side::B).current_hp(), 160);
        assert_eq!(engine.log().len(), log_len);
    }

    #[test]
    fn test_unknown_technique_rejected() {
        let mut engine = duel();
        let err = engine.execute_technique(Side::A, "Vollzanbel", None).unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));
    }

    #[test]
    fn test_stunned_user_cannot_act() {
        let mut engine = duel();
        engine.active_mut(Side::A).set_condition(Condition::Stunned, 3);
        let err = engine.execute_technique(Side::A, "Zoltraak", None).unwrap_err();
        assert!(matches!(err, BattleError::CannotAct { condition: Condition::Stunned, .. }));
        assert_eq!(engine.active(Side::A).current_mana(), 202);
        assert_eq!(engine.active(Side::B).current_hp(), 160);
    }

    #[test]
    fn test_support_technique_only_applies_effects() {
        let guard = Technique::new("Defense Magic", Affinity::Defense, TechniqueCategory::Support, 0, 10)
            .with_target_type(TargetType::SelfTarget)
            .with_effect(TechniqueEffect::StatBoost {
                stat: StatKind::Defense,
                stages: 2,
                chance: 1.0,
                target: EffectTarget::User,
                when: Activation::Always,
            });
        let mut engine = engine(
            vec![with_techniques("Fern", vec![guard])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        let report = engine.execute_technique(Side::A, "Defense Magic", None).unwrap();
        assert!(report.hits.is_empty());
        assert_eq!(engine.active(Side::A).stat_boosts().get(StatKind::Defense), 2);
        assert_eq!(engine.active(Side::B).current_hp(), 160);
    }

    #[test]
    fn test_knockout_auto_switches() {
        let mut engine = engine(
            vec![with_techniques("Fern", vec![zoltraak()])],
            vec![
                with_techniques("Aura", vec![zoltraak()]),
                with_techniques("Linie", vec![zoltraak()]),
            ],
        );
        engine.active_mut(Side::B).set_current_hp(1);
        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert!(report.hits[0].defeated);
        assert_eq!(engine.party(Side::B).active_index(), 1);
        assert_eq!(engine.active(Side::B).name, "Linie");
        assert!(!engine.is_complete());
        assert!(engine.check_invariants().is_empty());
    }

    #[test]
    fn test_last_knockout_ends_battle() {
        let mut engine = duel();
        engine.active_mut(Side::B).set_current_hp(1);
        engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert!(engine.is_complete());
        assert_eq!(engine.winner(), Some(Side::A));
        let err = engine.execute_technique(Side::B, "Zoltraak", None).unwrap_err();
        assert!(matches!(err, BattleError::State(_)));
    }

    #[test]
    fn test_switch_validation() {
        let mut engine = engine(
            vec![
                with_techniques("Fern", vec![zoltraak()]),
                with_techniques("Stark", vec![zoltraak()]),
            ],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        assert!(matches!(engine.switch_character(Side::A, 0), Err(BattleError::Validation(_))));
        assert!(matches!(engine.switch_character(Side::A, 5), Err(BattleError::Validation(_))));
        assert_eq!(engine.available_switches(Side::A), vec![1]);

        engine.switch_character(Side::A, 1).unwrap();
        assert_eq!(engine.active(Side::A).name, "Stark");
        assert_eq!(engine.available_switches(Side::A), vec![0]);
    }

    #[test]
    fn test_entry_hook_runs_on_switch() {
        let aura = test_character_with(test_template("Aura").with_ability("aura_of_domination").with_techniques(&["Zoltraak"]));
        let mut engine = engine(
            vec![with_techniques("Fern", vec![zoltraak()])],
            vec![with_techniques("Linie", vec![zoltraak()]), aura],
        );
        assert_eq!(engine.active(Side::A).stat_boosts().get(StatKind::MagicAttack), 0);
        engine.switch_character(Side::B, 1).unwrap();
        assert_eq!(engine.active(Side::A).stat_boosts().get(StatKind::MagicAttack), -1);
    }

    #[test]
    fn test_forfeit_keeps_hp() {
        let mut engine = duel();
        engine.forfeit(Side::B).unwrap();
        assert_eq!(engine.outcome(), Some(BattleOutcome::Victory(Side::A)));
        assert_eq!(engine.active(Side::B).current_hp(), 160);
        assert!(engine.forfeit(Side::A).is_err());
    }

    #[test]
    fn test_hazard_effect_lays_layers() {
        let spikes = Technique::new("Spiritual Spikes", Affinity::Curse, TechniqueCategory::Support, 0, 5).with_effect(
            TechniqueEffect::Hazard {
                kind: HazardKind::SpiritualSpikes,
                chance: 1.0,
                when: Activation::Always,
            },
        );
        let mut engine = engine(
            vec![with_techniques("Fern", vec![spikes])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        for _ in 0..4 {
            engine.execute_technique(Side::A, "Spiritual Spikes", None).unwrap();
        }
        assert_eq!(engine.party(Side::B).hazards.layers(HazardKind::SpiritualSpikes), 3);
    }

    #[test]
    fn test_mana_shield_flag_soaks_next_hit() {
        let shield = Technique::new("Mana Shield", Affinity::Defense, TechniqueCategory::Support, 0, 10)
            .with_target_type(TargetType::SelfTarget)
            .with_effect(TechniqueEffect::VolatileFlag {
                flag: VolatileFlag::ManaShield,
                chance: 1.0,
                target: EffectTarget::User,
                when: Activation::Always,
            });
        let mut engine = engine(
            vec![with_techniques("Fern", vec![shield])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        engine.execute_technique(Side::A, "Mana Shield", None).unwrap();
        assert!(engine.active(Side::A).volatile.mana_shield);
        let report = engine.execute_technique(Side::B, "Zoltraak", None).unwrap();
        // a 27..48 roll minus the 40 HP shield
        assert!(report.total_damage() <= 8);
        assert!(!engine.active(Side::A).volatile.mana_shield);
    }

    fn confused_constants() -> BattleConstants {
        let mut constants = BattleConstants::default();
        constants.conditions.confusion_self_hit_chance = 1.0;
        constants
    }

    #[test]
    fn test_confusion_self_hit_spares_the_target() {
        let mut engine = BattleEngine::with_seed(
            vec![with_techniques("Fern", vec![zoltraak()])],
            vec![with_techniques("Aura", vec![zoltraak()])],
            confused_constants(),
            12345,
        )
        .unwrap();
        engine.active_mut(Side::A).set_condition(Condition::Confused, 3);
        let expected = confusion_damage(engine.active(Side::A), engine.constants());

        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert_eq!(report.self_hit, Some(expected));
        assert!(report.hits.is_empty());
        assert_eq!(report.mana_spent, 15);
        assert_eq!(engine.active(Side::A).current_hp(), 160 - expected);
        assert_eq!(engine.active(Side::B).current_hp(), 160);
        assert_eq!(report.summary(), format!("Fern hurt itself in confusion for {} HP", expected));
    }

    #[test]
    fn test_confusion_knockout_credits_the_opponent() {
        let absorber = CharacterInstance::new(
            &test_template("Aura").with_ability("magic_absorption"),
            "tester",
            vec![Arc::new(zoltraak())],
        )
        .unwrap();
        let mut engine = BattleEngine::with_seed(
            vec![with_techniques("Fern", vec![zoltraak()])],
            vec![absorber],
            confused_constants(),
            12345,
        )
        .unwrap();
        engine.active_mut(Side::A).set_condition(Condition::Confused, 3);
        engine.active_mut(Side::A).set_current_hp(1);
        engine.active_mut(Side::B).set_current_mana(0);

        engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert!(engine.active(Side::A).is_defeated());
        assert_eq!(engine.active(Side::B).current_mana(), 202 / 4);
        assert_eq!(engine.winner(), Some(Side::B));
    }

    #[test]
    fn test_all_enemies_hits_every_standing_member() {
        let blast = zoltraak().with_target_type(TargetType::AllEnemies);
        let mut engine = engine(
            vec![with_techniques("Serie", vec![blast])],
            vec![
                with_techniques("Aura", vec![zoltraak()]),
                with_techniques("Linie", vec![zoltraak()]),
                with_techniques("Draht", vec![zoltraak()]),
            ],
        );
        engine.state.party_mut(Side::B).member_mut(2).unwrap().take_damage(10_000);

        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        let targets: Vec<&str> = report.hits.iter().map(|h| h.target.as_str()).collect();
        assert_eq!(targets, vec!["Aura", "Linie"]);
        for (index, hit) in report.hits.iter().enumerate() {
            assert_eq!(engine.party(Side::B).member(index).unwrap().current_hp(), 160 - hit.damage);
        }
        assert_eq!(report.mana_spent, 15);
    }

    #[test]
    fn test_multi_target_stops_at_count() {
        let volley = zoltraak().with_target_type(TargetType::MultiTarget);
        let mut engine = engine(
            vec![with_techniques("Fern", vec![volley])],
            vec![
                with_techniques("Aura", vec![zoltraak()]),
                with_techniques("Linie", vec![zoltraak()]),
                with_techniques("Draht", vec![zoltraak()]),
            ],
        );
        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert_eq!(report.hits.len(), 2);
        assert!(engine.party(Side::B).member(0).unwrap().current_hp() < 160);
        assert!(engine.party(Side::B).member(1).unwrap().current_hp() < 160);
        assert_eq!(engine.party(Side::B).member(2).unwrap().current_hp(), 160);
    }

    #[test]
    fn test_heal_caps_at_level_scaled_max() {
        let mend = Technique::new("Healing Magic", Affinity::Support, TechniqueCategory::Support, 0, 20)
            .with_target_type(TargetType::SelfTarget)
            .with_effect(TechniqueEffect::Heal {
                fraction: 0.5,
                chance: 1.0,
                target: EffectTarget::User,
                when: Activation::Always,
            });
        let mut engine = engine(
            vec![with_techniques("Himmel", vec![mend])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        assert_eq!(engine.active(Side::A).max_hp(), 160);
        engine.active_mut(Side::A).set_current_hp(150);

        let report = engine.execute_technique(Side::A, "Healing Magic", None).unwrap();
        assert_eq!(
            report.effects,
            vec![EffectOutcome::Healed {
                name: "Himmel".into(),
                amount: 10
            }]
        );
        assert_eq!(engine.active(Side::A).current_hp(), 160);
    }

    fn flame_charge() -> Technique {
        let mut technique = Technique::new("Flame Charge", Affinity::ElementalFire, TechniqueCategory::Magical, 150, 30);
        technique.properties.concentration = true;
        technique
    }

    #[test]
    fn test_concentration_charges_then_fires() {
        let mut engine = engine(
            vec![with_techniques("Flamme", vec![flame_charge()])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        let charge = engine.execute_technique(Side::A, "Flame Charge", None).unwrap();
        assert!(charge.charging);
        assert_eq!(charge.mana_spent, 30);
        assert!(charge.hits.is_empty());
        assert!(engine.active(Side::A).volatile.channeling);
        assert_eq!(engine.active(Side::B).current_hp(), 160);

        let release = engine.execute_technique(Side::A, "Flame Charge", None).unwrap();
        assert!(!release.charging);
        assert_eq!(release.mana_spent, 0);
        assert_eq!(release.hits.len(), 1);
        assert!(!engine.active(Side::A).volatile.channeling);
    }

    #[test]
    fn test_damage_breaks_concentration() {
        let mut engine = engine(
            vec![with_techniques("Flamme", vec![flame_charge()])],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        engine.execute_technique(Side::A, "Flame Charge", None).unwrap();
        engine.execute_technique(Side::B, "Zoltraak", None).unwrap();
        assert!(!engine.active(Side::A).volatile.channeling);

        let again = engine.execute_technique(Side::A, "Flame Charge", None).unwrap();
        assert!(again.charging);
        assert_eq!(again.mana_spent, 30);
    }

    #[test]
    fn test_immaterial_target_is_untouched() {
        let mut engine = duel();
        engine.active_mut(Side::B).volatile.immaterial = true;
        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert!(report.hits.is_empty());
        assert_eq!(engine.active(Side::B).current_hp(), 160);
        assert!(!engine.active(Side::B).volatile.immaterial);

        let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        assert_eq!(report.hits.len(), 1);
    }

    #[test]
    fn test_misty_aura_decoys_some_hits() {
        let mut engine = duel();
        let (mut decoyed, mut landed) = (0, 0);
        for _ in 0..20 {
            engine.active_mut(Side::A).set_current_mana(202);
            engine.active_mut(Side::B).set_current_hp(160);
            engine.active_mut(Side::B).volatile.misty_aura = true;
            let report = engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
            assert!(!engine.active(Side::B).volatile.misty_aura);
            if report.hits.is_empty() {
                decoyed += 1;
            } else {
                landed += 1;
            }
        }
        assert!(decoyed > 0);
        assert!(landed > 0);
    }

    #[test]
    fn test_switch_out_clears_volatile_flags() {
        let mut engine = engine(
            vec![
                with_techniques("Fern", vec![zoltraak()]),
                with_techniques("Stark", vec![zoltraak()]),
            ],
            vec![with_techniques("Aura", vec![zoltraak()])],
        );
        engine.execute_technique(Side::A, "Zoltraak", None).unwrap();
        engine.active_mut(Side::A).volatile.tormented = true;
        assert!(matches!(
            engine.execute_technique(Side::A, "Zoltraak", None),
            Err(BattleError::Validation(_))
        ));

        engine.switch_character(Side::A, 1).unwrap();
        let fern = engine.party(Side::A).member(0).unwrap();
        assert!(!fern.volatile.tormented);
        assert_eq!(fern.volatile.last_technique, None);
    }

    #[test]
    fn test_report_summary() {
        let report = TechniqueReport {
            user: "Fern".into(),
            technique: "Zoltraak".into(),
            hits: vec![HitReport {
                target: "Aura".into(),
                damage: 30,
                critical: false,
                effectiveness: 1.0,
                defeated: true,
            }],
            ..TechniqueReport::default()
        };
        assert_eq!(
            report.summary(),
            "Fern used Zoltraak, dealing 30 damage to Aura (Aura was defeated)"
        );
    }
}
