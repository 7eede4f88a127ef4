//! Simple battle AI - greedy damage with a retreat rule

use crate::battle::{expected_damage, resolve_targets, BattleEngine, Targets};
use crate::character::CharacterInstance;
use crate::session::PlayerAction;
use crate::technique::Technique;
use crate::types::{Side, TargetType};
use std::cmp::Ordering;

/// Below this share of max HP the active character retreats if it can
pub const RETREAT_HP_FRACTION: f64 = 0.25;

/// A technique the AI could use and what it expects from it
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub technique: &'a Technique,
    pub target: Option<String>,
    pub expected: f64,
}

/// Pick an action for `side`, or `None` when nothing legal is left to do
pub fn choose_action(engine: &BattleEngine, side: Side) -> Option<PlayerAction> {
    let user = engine.active(side);

    if user.hp_fraction() < RETREAT_HP_FRACTION {
        if let Some(name) = best_switch(engine, side) {
            return Some(PlayerAction::switch(name));
        }
    }

    let candidates = candidates(engine, side);
    if let Some(best) = candidates.into_iter().max_by(compare) {
        return Some(PlayerAction::Attack {
            technique: best.technique.name.clone(),
            target: best.target,
        });
    }

    // Out of mana: try a teammate who is not
    best_switch(engine, side).map(PlayerAction::switch)
}

/// Usable techniques of the active character, scored by expected damage
pub fn candidates(engine: &BattleEngine, side: Side) -> Vec<Candidate<'_>> {
    let user = engine.active(side);
    let opponents = engine.party(side.opponent());
    let field = engine.field();

    user.techniques()
        .iter()
        .filter(|t| t.can_use(user))
        .filter_map(|t| {
            let target = match t.target_type {
                TargetType::ChooseTarget => weakest(opponents.members()).map(|c| c.name.clone()),
                _ => None,
            };
            let expected = match resolve_targets(t, opponents, target.as_deref()).ok()? {
                Targets::User => 0.0,
                Targets::Opponents(indices) => indices
                    .iter()
                    .filter_map(|i| opponents.member(*i))
                    .map(|foe| expected_damage(user, foe, t, &field, engine.constants()))
                    .sum(),
            };
            Some(Candidate {
                technique: t.as_ref(),
                target,
                expected,
            })
        })
        .collect()
}

/// Higher expected damage wins, then higher initiative, then lower cost
fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.expected
        .partial_cmp(&b.expected)
        .unwrap_or(Ordering::Equal)
        .then(a.technique.initiative.cmp(&b.technique.initiative))
        .then(b.technique.mana_cost.cmp(&a.technique.mana_cost))
}

/// Healthiest benched teammate
fn best_switch(engine: &BattleEngine, side: Side) -> Option<String> {
    let party = engine.party(side);
    engine
        .available_switches(side)
        .into_iter()
        .filter_map(|i| party.member(i))
        .max_by(|a, b| a.hp_fraction().partial_cmp(&b.hp_fraction()).unwrap_or(Ordering::Equal))
        .map(|c| c.name.clone())
}

fn weakest(members: &[CharacterInstance]) -> Option<&CharacterInstance> {
    members
        .iter()
        .filter(|c| !c.is_defeated())
        .min_by_key(|c| c.current_hp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{test_character, test_template};
    use crate::config::BattleConstants;
    use crate::types::{Affinity, TechniqueCategory};
    use std::sync::Arc;

    fn engine(a: Vec<CharacterInstance>, b: Vec<CharacterInstance>) -> BattleEngine {
        BattleEngine::with_seed(a, b, BattleConstants::default(), 12345).unwrap()
    }

    #[test]
    fn test_prefers_stronger_technique() {
        let weak = Technique::new("Spark", Affinity::Destruction, TechniqueCategory::Magical, 40, 5);
        let strong = Technique::new("Zoltraak", Affinity::Destruction, TechniqueCategory::Magical, 90, 15);
        let fern = CharacterInstance::new(&test_template("Fern"), "tester", vec![Arc::new(weak), Arc::new(strong)]).unwrap();
        let e = engine(vec![fern], vec![test_character("Aura", &["Zoltraak"])]);

        let action = choose_action(&e, Side::A).unwrap();
        assert_eq!(action, PlayerAction::attack("Zoltraak"));
    }

    #[test]
    fn test_retreats_at_low_hp() {
        let mut e = engine(
            vec![test_character("Fern", &["Zoltraak"]), test_character("Stark", &["Zoltraak"])],
            vec![test_character("Aura", &["Zoltraak"])],
        );
        e.active_mut(Side::A).set_current_hp(10);
        assert_eq!(choose_action(&e, Side::A), Some(PlayerAction::switch("Stark")));
    }

    #[test]
    fn test_stays_in_when_alone() {
        let mut e = engine(
            vec![test_character("Fern", &["Zoltraak"])],
            vec![test_character("Aura", &["Zoltraak"])],
        );
        e.active_mut(Side::A).set_current_hp(10);
        assert_eq!(choose_action(&e, Side::A), Some(PlayerAction::attack("Zoltraak")));
    }

    #[test]
    fn test_nothing_to_do_without_mana() {
        let mut e = engine(
            vec![test_character("Fern", &["Zoltraak"])],
            vec![test_character("Aura", &["Zoltraak"])],
        );
        e.active_mut(Side::A).set_current_mana(0);
        assert!(candidates(&e, Side::A).is_empty());
        assert_eq!(choose_action(&e, Side::A), None);
    }
}
