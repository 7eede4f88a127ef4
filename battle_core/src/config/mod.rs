//! Configuration loading from TOML files

mod constants;
mod roster;

pub use constants::{
    AmbientConstants, BattleConstants, ConditionConstants, CritConstants, HazardConstants, LimitConstants,
    SessionConfig, VarianceConstants,
};
pub use roster::{default_roster, RosterProvider, StaticRoster};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load battle constants, falling back to defaults for any missing field
pub fn load_battle_constants(path: &Path) -> Result<BattleConstants, ConfigError> {
    let constants: BattleConstants = load_toml(path)?;
    if constants.variance.min > constants.variance.max {
        return Err(ConfigError::ValidationError(format!(
            "variance.min {} exceeds variance.max {}",
            constants.variance.min, constants.variance.max
        )));
    }
    if constants.limits.max_party_size == 0 {
        return Err(ConfigError::ValidationError("limits.max_party_size must be at least 1".into()));
    }
    Ok(constants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_toml_error_is_typed() {
        let result: Result<BattleConstants, _> = parse_toml("[crit\nbroken");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_battle_constants(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_load_battle_constants_validates() {
        let path = std::env::temp_dir().join(format!("battle_constants_{}.toml", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[variance]\nmin = 1.2\nmax = 1.0").unwrap();
        drop(file);

        let result = load_battle_constants(&path);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
        fs::remove_file(&path).unwrap();
    }
}
