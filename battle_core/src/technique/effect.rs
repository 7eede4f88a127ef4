//! TechniqueEffect - discriminated effect payloads and their application

use crate::battle::Field;
use crate::character::CharacterInstance;
use crate::types::{
    AmbientMagic, Condition, EffectTarget, HazardKind, Race, StatKind, Terrain, VolatileFlag,
};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

fn always() -> f64 {
    1.0
}

/// Gate evaluated against (user, target, field) before the chance roll
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Always,
    UserHpBelow(f64),
    TargetHpBelow(f64),
    TargetHasCondition(Condition),
    TargetHasRace(Race),
    UserHasFlag(VolatileFlag),
    TerrainIs(Terrain),
    AmbientIs(AmbientMagic),
}

impl Activation {
    pub fn holds(&self, user: &CharacterInstance, target: &CharacterInstance, field: &Field) -> bool {
        match *self {
            Activation::Always => true,
            Activation::UserHpBelow(fraction) => user.hp_fraction() < fraction,
            Activation::TargetHpBelow(fraction) => target.hp_fraction() < fraction,
            Activation::TargetHasCondition(condition) => target.condition() == condition,
            Activation::TargetHasRace(race) => target.races.contains(&race),
            Activation::UserHasFlag(flag) => user.volatile.is_set(flag),
            Activation::TerrainIs(terrain) => field.terrain == terrain,
            Activation::AmbientIs(ambient) => field.ambient_magic == ambient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TechniqueEffect {
    Condition {
        value: Condition,
        #[serde(default = "always")]
        chance: f64,
        #[serde(default)]
        target: EffectTarget,
        #[serde(default)]
        when: Activation,
    },
    StatBoost {
        stat: StatKind,
        stages: i32,
        #[serde(default = "always")]
        chance: f64,
        #[serde(default)]
        target: EffectTarget,
        #[serde(default)]
        when: Activation,
    },
    Heal {
        fraction: f64,
        #[serde(default = "always")]
        chance: f64,
        #[serde(default)]
        target: EffectTarget,
        #[serde(default)]
        when: Activation,
    },
    VolatileFlag {
        flag: VolatileFlag,
        #[serde(default = "always")]
        chance: f64,
        #[serde(default)]
        target: EffectTarget,
        #[serde(default)]
        when: Activation,
    },
    /// Lays one layer of a hazard on the target's side of the field
    Hazard {
        kind: HazardKind,
        #[serde(default = "always")]
        chance: f64,
        #[serde(default)]
        when: Activation,
    },
}

/// What an effect did, for the battle log and the engine's follow-up
#[derive(Debug, Clone, PartialEq)]
pub enum EffectOutcome {
    Skipped,
    ConditionApplied { name: String, condition: Condition },
    ConditionPrevented { name: String, condition: Condition },
    StatChanged { name: String, stat: StatKind, change: i8 },
    Healed { name: String, amount: u32 },
    FlagSet { name: String, flag: VolatileFlag },
    HazardLaid(HazardKind),
}

impl EffectOutcome {
    pub fn describe(&self) -> Option<String> {
        match self {
            EffectOutcome::Skipped => None,
            EffectOutcome::ConditionApplied { name, condition } => {
                Some(format!("{} is now {:?}!", name, condition))
            }
            EffectOutcome::ConditionPrevented { name, condition } => {
                Some(format!("{} resisted {:?}!", name, condition))
            }
            EffectOutcome::StatChanged { name, stat, change } => Some(match *change {
                0 => format!("{}'s {:?} won't go any further!", name, stat),
                c if c > 0 => format!("{}'s {:?} rose by {}!", name, stat, c),
                c => format!("{}'s {:?} fell by {}!", name, stat, -c),
            }),
            EffectOutcome::Healed { name, amount } => Some(format!("{} restored {} HP!", name, amount)),
            EffectOutcome::FlagSet { name, flag } => Some(format!("{} gained {:?}!", name, flag)),
            EffectOutcome::HazardLaid(kind) => Some(format!("{:?} were scattered around the field!", kind)),
        }
    }
}

impl TechniqueEffect {
    pub fn chance(&self) -> f64 {
        match self {
            TechniqueEffect::Condition { chance, .. }
            | TechniqueEffect::StatBoost { chance, .. }
            | TechniqueEffect::Heal { chance, .. }
            | TechniqueEffect::VolatileFlag { chance, .. }
            | TechniqueEffect::Hazard { chance, .. } => *chance,
        }
    }

    pub fn activation(&self) -> Activation {
        match self {
            TechniqueEffect::Condition { when, .. }
            | TechniqueEffect::StatBoost { when, .. }
            | TechniqueEffect::Heal { when, .. }
            | TechniqueEffect::VolatileFlag { when, .. }
            | TechniqueEffect::Hazard { when, .. } => *when,
        }
    }

    /// Which participant receives the effect. Hazards land on the target's side.
    pub fn target(&self) -> EffectTarget {
        match self {
            TechniqueEffect::Condition { target, .. }
            | TechniqueEffect::StatBoost { target, .. }
            | TechniqueEffect::Heal { target, .. }
            | TechniqueEffect::VolatileFlag { target, .. } => *target,
            TechniqueEffect::Hazard { .. } => EffectTarget::Target,
        }
    }

    /// Apply the effect.
    ///
    /// `target` is `None` when the technique targets its own user; both sides of the
    /// effect then resolve to `user`. Nothing happens unless the activation gate passes
    /// and a uniform draw falls under the chance.
    pub fn apply(
        &self,
        user: &mut CharacterInstance,
        target: Option<&mut CharacterInstance>,
        field: &Field,
        condition_turns: u32,
        rng: &mut dyn RngCore,
    ) -> EffectOutcome {
        let gate_open = match target.as_deref() {
            Some(t) => self.activation().holds(user, t, field),
            None => self.activation().holds(user, user, field),
        };
        if !gate_open || rng.gen::<f64>() >= self.chance() {
            return EffectOutcome::Skipped;
        }

        let recipient: &mut CharacterInstance = match (self.target(), target) {
            (EffectTarget::Target, Some(t)) => t,
            _ => user,
        };

        match *self {
            TechniqueEffect::Condition { value, .. } => {
                if recipient.prevents_condition(value, rng) {
                    return EffectOutcome::ConditionPrevented {
                        name: recipient.name.clone(),
                        condition: value,
                    };
                }
                recipient.set_condition(value, condition_turns);
                EffectOutcome::ConditionApplied {
                    name: recipient.name.clone(),
                    condition: value,
                }
            }
            TechniqueEffect::StatBoost { stat, stages, .. } => {
                let change = recipient.modify_stat_boost(stat, stages);
                EffectOutcome::StatChanged {
                    name: recipient.name.clone(),
                    stat,
                    change,
                }
            }
            TechniqueEffect::Heal { fraction, .. } => {
                let amount = (recipient.max_hp() as f64 * fraction).floor() as u32;
                let healed = recipient.heal(amount);
                EffectOutcome::Healed {
                    name: recipient.name.clone(),
                    amount: healed,
                }
            }
            TechniqueEffect::VolatileFlag { flag, .. } => {
                recipient.volatile.set(flag, true);
                EffectOutcome::FlagSet {
                    name: recipient.name.clone(),
                    flag,
                }
            }
            TechniqueEffect::Hazard { kind, .. } => EffectOutcome::HazardLaid(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_character;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stun(chance: f64) -> TechniqueEffect {
        TechniqueEffect::Condition {
            value: Condition::Stunned,
            chance,
            target: EffectTarget::Target,
            when: Activation::Always,
        }
    }

    #[test]
    fn test_condition_lands_for_three_turns() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut user = test_character("Fern", &["Sorganeil"]);
        let mut target = test_character("Aura", &["Zoltraak"]);

        let outcome = stun(1.0).apply(&mut user, Some(&mut target), &Field::default(), 3, &mut rng);
        assert!(matches!(outcome, EffectOutcome::ConditionApplied { .. }));
        assert_eq!(target.condition(), Condition::Stunned);
        assert_eq!(target.condition_turns(), 3);
        assert_eq!(user.condition(), Condition::Normal);
    }

    #[test]
    fn test_zero_chance_never_applies() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut user = test_character("Fern", &["Sorganeil"]);
        let mut target = test_character("Aura", &["Zoltraak"]);

        for _ in 0..50 {
            let outcome = stun(0.0).apply(&mut user, Some(&mut target), &Field::default(), 3, &mut rng);
            assert_eq!(outcome, EffectOutcome::Skipped);
        }
        assert_eq!(target.condition(), Condition::Normal);
    }

    #[test]
    fn test_activation_gate() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut user = test_character("Fern", &["Sorganeil"]);
        let mut target = test_character("Aura", &["Zoltraak"]);

        let gated = TechniqueEffect::Condition {
            value: Condition::Fear,
            chance: 1.0,
            target: EffectTarget::Target,
            when: Activation::TargetHpBelow(0.5),
        };
        let outcome = gated.apply(&mut user, Some(&mut target), &Field::default(), 3, &mut rng);
        assert_eq!(outcome, EffectOutcome::Skipped);

        let half = target.max_hp() / 2 + 1;
        target.take_damage(half);
        let outcome = gated.apply(&mut user, Some(&mut target), &Field::default(), 3, &mut rng);
        assert!(matches!(outcome, EffectOutcome::ConditionApplied { .. }));
    }

    #[test]
    fn test_self_boost_and_heal_use_user() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut user = test_character("Stark", &["Berserker Rage"]);
        let boost = TechniqueEffect::StatBoost {
            stat: StatKind::Attack,
            stages: 4,
            chance: 1.0,
            target: EffectTarget::User,
            when: Activation::Always,
        };
        boost.apply(&mut user, None, &Field::default(), 3, &mut rng);
        boost.apply(&mut user, None, &Field::default(), 3, &mut rng);
        assert_eq!(user.stat_boosts().get(StatKind::Attack), 6);

        user.take_damage(user.max_hp() / 2);
        let before = user.current_hp();
        let heal = TechniqueEffect::Heal {
            fraction: 0.25,
            chance: 1.0,
            target: EffectTarget::User,
            when: Activation::Always,
        };
        let outcome = heal.apply(&mut user, None, &Field::default(), 3, &mut rng);
        let expected = user.max_hp() / 4;
        assert_eq!(outcome, EffectOutcome::Healed { name: "Stark".into(), amount: expected });
        assert_eq!(user.current_hp(), before + expected);
    }

    #[test]
    fn test_heal_is_capped_at_max_hp() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut user = test_character("Sein", &["Healing Magic"]);
        user.take_damage(3);
        let heal = TechniqueEffect::Heal {
            fraction: 0.5,
            chance: 1.0,
            target: EffectTarget::User,
            when: Activation::Always,
        };
        heal.apply(&mut user, None, &Field::default(), 3, &mut rng);
        assert_eq!(user.current_hp(), user.max_hp());
    }

    #[test]
    fn test_parse_effect_list() {
        let toml = r#"
[[effects]]
type = "stat_boost"
stat = "attack"
stages = 2
target = "user"

[[effects]]
type = "heal"
fraction = 0.4
when = { kind = "user_hp_below", value = 0.5 }

[[effects]]
type = "hazard"
kind = "mana_traps"
chance = 0.5
"#;
        #[derive(Deserialize)]
        struct Wrapper {
            effects: Vec<TechniqueEffect>,
        }
        let parsed: Wrapper = toml::from_str(toml).unwrap();
        assert_eq!(parsed.effects.len(), 3);
        assert_eq!(parsed.effects[1].activation(), Activation::UserHpBelow(0.5));
        assert!((parsed.effects[0].chance() - 1.0).abs() < f64::EPSILON);
        assert_eq!(parsed.effects[2].target(), EffectTarget::Target);
    }
}
