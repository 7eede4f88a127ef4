//! Roster loading - character templates and the technique catalogue

use super::ConfigError;
use crate::character::{CharacterInstance, CharacterTemplate, MAX_TECHNIQUES};
use crate::error::BattleError;
use crate::hooks;
use crate::technique::Technique;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TechniquesFile {
    techniques: Vec<Technique>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterFile {
    characters: Vec<CharacterTemplate>,
}

/// Supplies character templates and technique records
pub trait RosterProvider: Send + Sync {
    fn template(&self, name: &str) -> Option<&CharacterTemplate>;

    fn technique(&self, name: &str) -> Option<Arc<Technique>>;

    fn character_names(&self) -> Vec<String>;

    /// Build a fresh battle instance of `name` owned by `owner_id`
    fn instantiate(&self, name: &str, owner_id: &str) -> Result<CharacterInstance, BattleError> {
        let template = self
            .template(name)
            .ok_or_else(|| BattleError::validation(format!("Unknown character {}", name)))?;
        let techniques = template
            .techniques
            .iter()
            .map(|t| {
                self.technique(t)
                    .ok_or_else(|| BattleError::validation(format!("{} knows unknown technique {}", template.name, t)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CharacterInstance::new(template, owner_id, techniques)
    }
}

/// Roster held in memory, usually parsed from TOML
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    templates: Vec<CharacterTemplate>,
    techniques: HashMap<String, Arc<Technique>>,
}

impl StaticRoster {
    /// Build a roster, checking every reference a template makes
    pub fn new(templates: Vec<CharacterTemplate>, techniques: Vec<Technique>) -> Result<Self, ConfigError> {
        let techniques: HashMap<String, Arc<Technique>> = techniques
            .into_iter()
            .map(|t| (t.name.to_lowercase(), Arc::new(t)))
            .collect();

        for template in &templates {
            if template.techniques.is_empty() || template.techniques.len() > MAX_TECHNIQUES {
                return Err(ConfigError::ValidationError(format!(
                    "{} must know between 1 and {} techniques",
                    template.name, MAX_TECHNIQUES
                )));
            }
            if let Some(missing) = template
                .techniques
                .iter()
                .find(|t| !techniques.contains_key(&t.to_lowercase()))
            {
                return Err(ConfigError::ValidationError(format!(
                    "{} knows unknown technique {}",
                    template.name, missing
                )));
            }
            if hooks::ability(&template.ability).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "{} has unknown ability {}",
                    template.name, template.ability
                )));
            }
            if let Some(equipment) = &template.equipment {
                if hooks::equipment(equipment).is_none() {
                    return Err(ConfigError::ValidationError(format!(
                        "{} carries unknown equipment {}",
                        template.name, equipment
                    )));
                }
            }
        }

        Ok(StaticRoster { templates, techniques })
    }

    /// Parse a roster from its two TOML documents
    pub fn from_toml(roster: &str, techniques: &str) -> Result<Self, ConfigError> {
        let roster: RosterFile = super::parse_toml(roster)?;
        let techniques: TechniquesFile = super::parse_toml(techniques)?;
        Self::new(roster.characters, techniques.techniques)
    }

    /// Load a roster from `roster.toml` and `techniques.toml` in `dir`
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let roster: RosterFile = super::load_toml(&dir.join("roster.toml"))?;
        let techniques: TechniquesFile = super::load_toml(&dir.join("techniques.toml"))?;
        Self::new(roster.characters, techniques.techniques)
    }

    pub fn templates(&self) -> &[CharacterTemplate] {
        &self.templates
    }

    pub fn technique_count(&self) -> usize {
        self.techniques.len()
    }
}

impl RosterProvider for StaticRoster {
    fn template(&self, name: &str) -> Option<&CharacterTemplate> {
        self.templates.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    fn technique(&self, name: &str) -> Option<Arc<Technique>> {
        self.techniques.get(&name.to_lowercase()).cloned()
    }

    fn character_names(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name.clone()).collect()
    }
}

/// The roster shipped with the crate
pub fn default_roster() -> StaticRoster {
    let roster = include_str!("../../config/roster.toml");
    let techniques = include_str!("../../config/techniques.toml");
    StaticRoster::from_toml(roster, techniques).unwrap_or_else(|e| {
        tracing::error!(error = %e, "embedded roster failed to load");
        StaticRoster::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::AbilityState;
    use crate::types::TargetType;

    #[test]
    fn test_default_roster_loads() {
        let roster = default_roster();
        let names = roster.character_names();
        for name in [
            "Frieren", "Fern", "Stark", "Himmel", "Aura", "Serie", "Linie", "Denken", "Edel", "Flamme", "Laufen",
            "Sein", "Sense", "Stille", "Ubel", "Wirbel",
        ] {
            assert!(names.iter().any(|n| n == name), "missing {}", name);
        }
        assert_eq!(names.len(), 16);
        assert!(roster.technique_count() >= 30);
    }

    #[test]
    fn test_zoltraak_data() {
        let zoltraak = default_roster().technique("zoltraak").unwrap();
        assert_eq!(zoltraak.power, 90);
        assert_eq!(zoltraak.mana_cost, 15);
        assert_eq!(zoltraak.precision, Some(0.95));
    }

    #[test]
    fn test_vollzanbel_hits_everyone() {
        let vollzanbel = default_roster().technique("Vollzanbel").unwrap();
        assert_eq!(vollzanbel.target_type, TargetType::AllEnemies);
        assert!(vollzanbel.properties.area_effect);
    }

    #[test]
    fn test_instantiate_every_character() {
        let roster = default_roster();
        for name in roster.character_names() {
            let c = roster.instantiate(&name, "p1").unwrap();
            assert!(c.max_hp() > 0);
            assert!(!c.techniques().is_empty());
            assert_eq!(c.owner_id, "p1");
        }
    }

    #[test]
    fn test_signature_state_seeded() {
        let roster = default_roster();
        let aura = roster.instantiate("Aura", "p2").unwrap();
        assert!(matches!(aura.ability_state, AbilityState::UndeadArmy { .. }));
        let stark = roster.instantiate("stark", "p1").unwrap();
        assert!(matches!(stark.ability_state, AbilityState::Resolve { .. }));
        let denken = roster.instantiate("Denken", "p1").unwrap();
        assert_eq!(denken.ability_state, AbilityState::Perseverance { stacks: 3 });
        let sense = roster.instantiate("Sense", "p1").unwrap();
        assert!(matches!(sense.ability_state, AbilityState::Proctor { observations: 0, .. }));
    }

    #[test]
    fn test_special_technique_flags() {
        let roster = default_roster();
        assert!(roster.technique("Flame Charge").unwrap().properties.concentration);
        assert!(roster.technique("Theory Research").unwrap().properties.theory);
        let reigram = roster.technique("Reigram").unwrap();
        assert!(reigram.properties.slashing);
        assert_eq!(reigram.precision, Some(0.7));
    }

    #[test]
    fn test_unknown_character() {
        let err = default_roster().instantiate("Qual", "p1").unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));
    }

    #[test]
    fn test_missing_technique_rejected() {
        let roster = r#"
[[characters]]
name = "Linie"
level = 40
techniques = ["Mimicry"]
base_stats = { hp = 80, attack = 90 }
"#;
        let result = StaticRoster::from_toml(roster, "techniques = []");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
