//! CharacterTemplate - immutable roster record a battle instance is built from

use super::disposition::Disposition;
use super::stats::Stats;
use crate::types::{Affinity, Race};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub name: String,
    pub level: u32,
    #[serde(default)]
    pub races: Vec<Race>,
    /// Affinities this character defends with
    #[serde(default)]
    pub affinities: Vec<Affinity>,
    pub base_stats: Stats,
    #[serde(default)]
    pub ivs: Stats,
    #[serde(default)]
    pub growth: Stats,
    #[serde(default)]
    pub disposition: Disposition,
    /// Trait or signature ability id, resolved through the hook catalog
    #[serde(default = "default_ability")]
    pub ability: String,
    #[serde(default)]
    pub equipment: Option<String>,
    /// Technique names, resolved by the roster provider
    #[serde(default)]
    pub techniques: Vec<String>,
}

fn default_ability() -> String {
    "none".to_string()
}

impl CharacterTemplate {
    pub fn new(name: impl Into<String>, level: u32, base_stats: Stats) -> Self {
        CharacterTemplate {
            name: name.into(),
            level,
            races: Vec::new(),
            affinities: Vec::new(),
            base_stats,
            ivs: Stats::default(),
            growth: Stats::default(),
            disposition: Disposition::Balanced,
            ability: default_ability(),
            equipment: None,
            techniques: Vec::new(),
        }
    }

    pub fn with_races(mut self, races: Vec<Race>) -> Self {
        self.races = races;
        self
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = ability.into();
        self
    }

    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_techniques(mut self, techniques: &[&str]) -> Self {
        self.techniques = techniques.iter().map(|t| t.to_string()).collect();
        self
    }
}
