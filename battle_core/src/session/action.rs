//! Participant actions and their outcomes

use crate::error::BattleError;
use serde::{Deserialize, Serialize};

/// What a participant can submit for its turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Attack {
        technique: String,
        /// Opposing character name, for techniques that let the user choose
        #[serde(default)]
        target: Option<String>,
    },
    Switch {
        character: String,
    },
    Flee,
}

impl PlayerAction {
    pub fn attack(technique: impl Into<String>) -> Self {
        PlayerAction::Attack {
            technique: technique.into(),
            target: None,
        }
    }

    pub fn attack_target(technique: impl Into<String>, target: impl Into<String>) -> Self {
        PlayerAction::Attack {
            technique: technique.into(),
            target: Some(target.into()),
        }
    }

    pub fn switch(character: impl Into<String>) -> Self {
        PlayerAction::Switch {
            character: character.into(),
        }
    }
}

/// Result of a submitted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    pub battle_complete: bool,
    /// The typed failure behind `success == false`
    pub error: Option<BattleError>,
}

impl ActionOutcome {
    pub fn succeeded(message: impl Into<String>, battle_complete: bool) -> Self {
        ActionOutcome {
            success: true,
            message: message.into(),
            battle_complete,
            error: None,
        }
    }

    pub fn failed(error: BattleError, battle_complete: bool) -> Self {
        ActionOutcome {
            success: false,
            message: error.to_string(),
            battle_complete,
            error: Some(error),
        }
    }
}

/// Result of charging a participant with a missed deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutOutcome {
    pub forfeited: bool,
    pub message: String,
    pub battle_complete: bool,
    /// Participant id of the winner once the battle is over
    pub winner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_json_shape() {
        let json = serde_json::to_string(&PlayerAction::attack("Zoltraak")).unwrap();
        assert_eq!(json, r#"{"action":"attack","technique":"Zoltraak","target":null}"#);

        let flee: PlayerAction = serde_json::from_str(r#"{"action":"flee"}"#).unwrap();
        assert_eq!(flee, PlayerAction::Flee);

        let attack: PlayerAction = serde_json::from_str(r#"{"action":"attack","technique":"Zoltraak"}"#).unwrap();
        assert_eq!(attack, PlayerAction::attack("Zoltraak"));
    }

    #[test]
    fn test_failed_outcome_carries_message() {
        let outcome = ActionOutcome::failed(BattleError::Resource { required: 15, available: 5 }, false);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Not enough mana: needs 15, has 5 (10 short)");
    }
}
