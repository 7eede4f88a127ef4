//! Technique - immutable move definitions shared by every character that knows them

mod effect;

pub use effect::{Activation, EffectOutcome, TechniqueEffect};

use crate::character::CharacterInstance;
use crate::error::BattleError;
use crate::types::{Affinity, Condition, TargetType, TechniqueCategory};
use serde::{Deserialize, Serialize};

/// Boolean property flags carried by a technique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechniqueProperties {
    pub contact: bool,
    pub area_effect: bool,
    pub magic_based: bool,
    pub barrier_bypassing: bool,
    pub weapon_based: bool,
    pub dark_magic: bool,
    /// Charges on the first use and fires on the next; damage breaks the charge
    pub concentration: bool,
    /// Counts toward the pinnacle of humanity's magic
    pub theory: bool,
    pub slashing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub affinity: Affinity,
    pub category: TechniqueCategory,
    #[serde(default)]
    pub power: u32,
    /// Hit chance; `None` never misses
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub mana_cost: u32,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default)]
    pub effects: Vec<TechniqueEffect>,
    #[serde(default)]
    pub properties: TechniqueProperties,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default = "default_multi_target_count")]
    pub multi_target_count: usize,
}

fn default_multi_target_count() -> usize {
    2
}

impl Technique {
    pub fn new(
        name: impl Into<String>,
        affinity: Affinity,
        category: TechniqueCategory,
        power: u32,
        mana_cost: u32,
    ) -> Self {
        Technique {
            name: name.into(),
            description: String::new(),
            affinity,
            category,
            power,
            precision: None,
            mana_cost,
            initiative: 0,
            effects: Vec::new(),
            properties: TechniqueProperties::default(),
            target_type: TargetType::Single,
            multi_target_count: default_multi_target_count(),
        }
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_effect(mut self, effect: TechniqueEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    /// Whether the move goes through the damage formula at all
    pub fn deals_damage(&self) -> bool {
        self.power > 0 && self.category != TechniqueCategory::Support
    }

    /// Mana actually spent by `user`, after equipment reduction, floored at 1.
    /// Releasing a charged concentration technique is free.
    pub fn cost_for(&self, user: &CharacterInstance) -> u32 {
        if self.mana_cost == 0 || self.releases_charge(user) {
            return 0;
        }
        self.mana_cost.saturating_sub(user.mana_cost_reduction()).max(1)
    }

    /// Check that `user` may cast this technique right now
    pub fn check_usable(&self, user: &CharacterInstance) -> Result<(), BattleError> {
        let sealed = user.condition() == Condition::MagicSeal || user.volatile.magic_seal;
        if sealed && self.category == TechniqueCategory::Magical {
            return Err(BattleError::validation(format!(
                "{} is sealed and cannot use magical techniques",
                user.name
            )));
        }

        let repeat = user.volatile.last_technique.as_deref() == Some(self.name.as_str());
        if user.volatile.tormented && repeat && !self.releases_charge(user) {
            return Err(BattleError::validation(format!(
                "{} is tormented and cannot use {} twice in a row",
                user.name, self.name
            )));
        }
        if user.volatile.challenged && self.category == TechniqueCategory::Support {
            return Err(BattleError::validation(format!(
                "{} has been challenged and must attack",
                user.name
            )));
        }

        let required = self.cost_for(user);
        if user.current_mana() < required {
            return Err(BattleError::Resource {
                required,
                available: user.current_mana(),
            });
        }
        Ok(())
    }

    pub fn can_use(&self, user: &CharacterInstance) -> bool {
        self.check_usable(user).is_ok()
    }

    /// Whether `user` is holding a charge this technique would release
    pub fn releases_charge(&self, user: &CharacterInstance) -> bool {
        self.properties.concentration && user.volatile.channeling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_character;

    fn zoltraak() -> Technique {
        Technique::new("Zoltraak", Affinity::Destruction, TechniqueCategory::Magical, 70, 15)
            .with_precision(0.95)
    }

    #[test]
    fn test_can_use_checks_mana() {
        let mut user = test_character("Fern", &["Zoltraak"]);
        assert!(zoltraak().can_use(&user));

        user.set_current_mana(5);
        let err = zoltraak().check_usable(&user).unwrap_err();
        assert_eq!(err, BattleError::Resource { required: 15, available: 5 });
    }

    #[test]
    fn test_magic_seal_blocks_magical_only() {
        let mut user = test_character("Fern", &["Zoltraak"]);
        user.set_condition(Condition::MagicSeal, 3);
        assert!(!zoltraak().can_use(&user));

        let punch = Technique::new("Punch", Affinity::Physical, TechniqueCategory::Physical, 40, 0);
        assert!(punch.can_use(&user));
    }

    #[test]
    fn test_tormented_blocks_repeat_use() {
        let mut user = test_character("Fern", &["Zoltraak"]);
        user.volatile.record_use("Zoltraak");
        assert!(zoltraak().can_use(&user));

        user.volatile.tormented = true;
        let err = zoltraak().check_usable(&user).unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));

        user.volatile.record_use("Sorganeil");
        assert!(zoltraak().can_use(&user));
    }

    #[test]
    fn test_challenged_must_attack() {
        let mut user = test_character("Fern", &["Zoltraak"]);
        user.volatile.challenged = true;
        let guard = Technique::new("Defensive Magic", Affinity::Defense, TechniqueCategory::Support, 0, 10);
        assert!(matches!(guard.check_usable(&user), Err(BattleError::Validation(_))));
        assert!(zoltraak().can_use(&user));
    }

    #[test]
    fn test_charged_release_is_free() {
        let mut flame = Technique::new("Flame Charge", Affinity::ElementalFire, TechniqueCategory::Magical, 150, 30);
        flame.properties.concentration = true;
        let mut user = test_character("Fern", &["Flame Charge"]);
        assert_eq!(flame.cost_for(&user), 30);

        user.volatile.channeling = true;
        user.set_current_mana(0);
        assert_eq!(flame.cost_for(&user), 0);
        assert!(flame.can_use(&user));
    }

    #[test]
    fn test_support_moves_deal_no_damage() {
        let heal = Technique::new("Healing Magic", Affinity::Support, TechniqueCategory::Support, 0, 20);
        assert!(!heal.deals_damage());
        assert!(zoltraak().deals_damage());
    }

    #[test]
    fn test_parse_from_toml() {
        let toml = r#"
name = "Sorganeil"
affinity = "support"
category = "magical"
power = 25
precision = 0.85
mana_cost = 25

[[effects]]
type = "condition"
value = "stunned"
chance = 0.6
target = "target"
"#;
        let technique: Technique = toml::from_str(toml).unwrap();
        assert_eq!(technique.name, "Sorganeil");
        assert_eq!(technique.effects.len(), 1);
        assert_eq!(technique.multi_target_count, 2);
        assert_eq!(technique.target_type, TargetType::Single);
    }
}
