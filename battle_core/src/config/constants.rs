//! Battle and session tuning constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable battle constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleConstants {
    #[serde(default)]
    pub crit: CritConstants,
    #[serde(default)]
    pub variance: VarianceConstants,
    #[serde(default)]
    pub hazard: HazardConstants,
    #[serde(default)]
    pub ambient: AmbientConstants,
    #[serde(default)]
    pub conditions: ConditionConstants,
    #[serde(default)]
    pub limits: LimitConstants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritConstants {
    #[serde(default = "default_crit_chance")]
    pub base_chance: f64,
    /// Chance while the attacker holds the focused aura flag
    #[serde(default = "default_focused_chance")]
    pub focused_chance: f64,
    #[serde(default = "default_crit_multiplier")]
    pub multiplier: f64,
}

impl Default for CritConstants {
    fn default() -> Self {
        CritConstants {
            base_chance: default_crit_chance(),
            focused_chance: default_focused_chance(),
            multiplier: default_crit_multiplier(),
        }
    }
}

fn default_crit_chance() -> f64 {
    1.0 / 16.0
}
fn default_focused_chance() -> f64 {
    1.0 / 8.0
}
fn default_crit_multiplier() -> f64 {
    1.5
}

/// Uniform damage roll bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceConstants {
    #[serde(default = "default_variance_min")]
    pub min: f64,
    #[serde(default = "default_variance_max")]
    pub max: f64,
}

impl Default for VarianceConstants {
    fn default() -> Self {
        VarianceConstants {
            min: default_variance_min(),
            max: default_variance_max(),
        }
    }
}

impl VarianceConstants {
    pub fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

fn default_variance_min() -> f64 {
    0.85
}
fn default_variance_max() -> f64 {
    1.0
}

/// Hazard damage: floor((layers * percent / 100) * base_reference_hp)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardConstants {
    #[serde(default = "default_base_reference_hp")]
    pub base_reference_hp: f64,
    #[serde(default = "default_spike_percent")]
    pub mana_traps_percent: f64,
    #[serde(default = "default_spike_percent")]
    pub spiritual_spikes_percent: f64,
    #[serde(default = "default_illusory_percent")]
    pub illusory_terrain_percent: f64,
    #[serde(default = "default_max_layers")]
    pub max_layers: u8,
}

impl Default for HazardConstants {
    fn default() -> Self {
        HazardConstants {
            base_reference_hp: default_base_reference_hp(),
            mana_traps_percent: default_spike_percent(),
            spiritual_spikes_percent: default_spike_percent(),
            illusory_terrain_percent: default_illusory_percent(),
            max_layers: default_max_layers(),
        }
    }
}

fn default_base_reference_hp() -> f64 {
    50.0
}
fn default_spike_percent() -> f64 {
    12.5
}
fn default_illusory_percent() -> f64 {
    6.25
}
fn default_max_layers() -> u8 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConstants {
    /// Magical damage multiplier under dense mana
    #[serde(default = "default_dense_mana_damage")]
    pub dense_mana_damage: f64,
    #[serde(default = "default_ambient_mana_step")]
    pub dense_mana_restore: u32,
    /// Magical damage multiplier inside a null field
    #[serde(default = "default_null_field_damage")]
    pub null_field_damage: f64,
    #[serde(default = "default_ambient_mana_step")]
    pub null_field_drain: u32,
}

impl Default for AmbientConstants {
    fn default() -> Self {
        AmbientConstants {
            dense_mana_damage: default_dense_mana_damage(),
            dense_mana_restore: default_ambient_mana_step(),
            null_field_damage: default_null_field_damage(),
            null_field_drain: default_ambient_mana_step(),
        }
    }
}

fn default_dense_mana_damage() -> f64 {
    1.2
}
fn default_null_field_damage() -> f64 {
    0.5
}
fn default_ambient_mana_step() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionConstants {
    /// Turns a freshly applied condition lasts
    #[serde(default = "default_condition_duration")]
    pub duration: u32,
    #[serde(default = "default_confusion_chance")]
    pub confusion_self_hit_chance: f64,
    #[serde(default = "default_confusion_power")]
    pub confusion_self_hit_power: u32,
}

impl Default for ConditionConstants {
    fn default() -> Self {
        ConditionConstants {
            duration: default_condition_duration(),
            confusion_self_hit_chance: default_confusion_chance(),
            confusion_self_hit_power: default_confusion_power(),
        }
    }
}

fn default_condition_duration() -> u32 {
    3
}
fn default_confusion_chance() -> f64 {
    1.0 / 3.0
}
fn default_confusion_power() -> u32 {
    40
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConstants {
    #[serde(default = "default_max_party_size")]
    pub max_party_size: usize,
}

impl Default for LimitConstants {
    fn default() -> Self {
        LimitConstants {
            max_party_size: default_max_party_size(),
        }
    }
}

fn default_max_party_size() -> usize {
    3
}

/// Session housekeeping. Durations are whole seconds in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_turn_timeout")]
    pub turn_timeout_secs: u64,
    #[serde(default = "default_max_session_age")]
    pub max_session_age_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Consecutive timeouts that forfeit the battle
    #[serde(default = "default_max_consecutive_timeouts")]
    pub max_consecutive_timeouts: u32,
    /// Log lines carried in a snapshot
    #[serde(default = "default_recent_log_len")]
    pub recent_log_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            turn_timeout_secs: default_turn_timeout(),
            max_session_age_secs: default_max_session_age(),
            sweep_interval_secs: default_sweep_interval(),
            max_consecutive_timeouts: default_max_consecutive_timeouts(),
            recent_log_len: default_recent_log_len(),
        }
    }
}

impl SessionConfig {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn max_session_age(&self) -> Duration {
        Duration::from_secs(self.max_session_age_secs)
    }

    /// Time between sweeps, capped at the turn timeout so an overdue turn
    /// is charged within one timeout of its deadline
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.min(self.turn_timeout_secs))
    }
}

fn default_turn_timeout() -> u64 {
    120
}
fn default_max_session_age() -> u64 {
    30 * 60
}
fn default_sweep_interval() -> u64 {
    30
}
fn default_max_consecutive_timeouts() -> u32 {
    3
}
fn default_recent_log_len() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = BattleConstants::default();
        assert!((c.crit.base_chance - 0.0625).abs() < f64::EPSILON);
        assert!((c.crit.multiplier - 1.5).abs() < f64::EPSILON);
        assert_eq!(c.hazard.max_layers, 3);
        assert_eq!(c.conditions.duration, 3);
        assert_eq!(c.limits.max_party_size, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
[crit]
multiplier = 2.0

[hazard]
max_layers = 5
"#;
        let c: BattleConstants = toml::from_str(toml).unwrap();
        assert!((c.crit.multiplier - 2.0).abs() < f64::EPSILON);
        assert!((c.crit.base_chance - 0.0625).abs() < f64::EPSILON);
        assert_eq!(c.hazard.max_layers, 5);
        assert!((c.hazard.base_reference_hp - 50.0).abs() < f64::EPSILON);
        assert!((c.variance.min - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_config_durations() {
        let s = SessionConfig::default();
        assert_eq!(s.turn_timeout(), Duration::from_secs(120));
        assert_eq!(s.max_session_age(), Duration::from_secs(1800));
        assert_eq!(s.sweep_interval(), Duration::from_secs(30));
        assert!(s.sweep_interval() <= s.turn_timeout());
        assert_eq!(s.max_consecutive_timeouts, 3);
    }

    #[test]
    fn test_sweep_interval_capped_by_turn_timeout() {
        let s: SessionConfig = toml::from_str("turn_timeout_secs = 60\nsweep_interval_secs = 600").unwrap();
        assert_eq!(s.sweep_interval(), Duration::from_secs(60));
    }
}
