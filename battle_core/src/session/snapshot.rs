//! Serializable view of a session for clients and persistence

use super::battle_session::Session;
use crate::battle::{BattleOutcome, HazardLayers, Party};
use crate::character::{CharacterInstance, StatBoosts};
use crate::types::{AmbientMagic, Condition, Side, Terrain};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub name: String,
    pub level: u32,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mana: u32,
    pub max_mana: u32,
    pub condition: Condition,
    pub stat_boosts: StatBoosts,
    pub techniques: Vec<String>,
    pub defeated: bool,
}

impl From<&CharacterInstance> for CharacterSnapshot {
    fn from(c: &CharacterInstance) -> Self {
        CharacterSnapshot {
            name: c.name.clone(),
            level: c.level,
            current_hp: c.current_hp(),
            max_hp: c.max_hp(),
            current_mana: c.current_mana(),
            max_mana: c.max_mana(),
            condition: c.condition(),
            stat_boosts: *c.stat_boosts(),
            techniques: c.techniques().iter().map(|t| t.name.clone()).collect(),
            defeated: c.is_defeated(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSnapshot {
    pub participant: String,
    pub active_index: usize,
    pub members: Vec<CharacterSnapshot>,
    pub hazards: HazardLayers,
    pub has_acted: bool,
}

impl SideSnapshot {
    fn capture(participant: &str, party: &Party, has_acted: bool) -> Self {
        SideSnapshot {
            participant: participant.to_string(),
            active_index: party.active_index(),
            members: party.members().iter().map(CharacterSnapshot::from).collect(),
            hazards: party.hazards,
            has_acted,
        }
    }

    pub fn active(&self) -> Option<&CharacterSnapshot> {
        self.members.get(self.active_index)
    }
}

/// Point-in-time state of one battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub session_id: Uuid,
    pub turn: u32,
    pub ambient_magic: AmbientMagic,
    pub terrain: Terrain,
    pub side_a: SideSnapshot,
    pub side_b: SideSnapshot,
    pub recent_log: Vec<String>,
    pub outcome: Option<BattleOutcome>,
    /// Participant id of the winner
    pub winner: Option<String>,
}

impl BattleSnapshot {
    pub fn capture(session: &Session, recent_log_len: usize) -> Self {
        let engine = session.engine();
        let side = |s: Side| SideSnapshot::capture(session.participant(s), engine.party(s), session.has_acted(s));
        let field = engine.field();

        BattleSnapshot {
            session_id: session.id(),
            turn: engine.turn(),
            ambient_magic: field.ambient_magic,
            terrain: field.terrain,
            side_a: side(Side::A),
            side_b: side(Side::B),
            recent_log: engine.log().recent(recent_log_len),
            outcome: engine.outcome(),
            winner: session.winner().map(str::to_string),
        }
    }

    pub fn side(&self, side: Side) -> &SideSnapshot {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleEngine;
    use crate::character::test_character;
    use crate::config::BattleConstants;
    use chrono::Utc;

    fn session() -> Session {
        let a = vec![test_character("Fern", &["Zoltraak"]), test_character("Stark", &["Zoltraak"])];
        let b = vec![test_character("Aura", &["Zoltraak"])];
        let engine = BattleEngine::with_seed(a, b, BattleConstants::default(), 12345).unwrap();
        Session::new("alice", "bob", engine, Utc::now())
    }

    #[test]
    fn test_capture_reflects_state() {
        let s = session();
        let snap = BattleSnapshot::capture(&s, 10);
        assert_eq!(snap.turn, 1);
        assert_eq!(snap.side_a.participant, "alice");
        assert_eq!(snap.side_a.members.len(), 2);
        assert_eq!(snap.side_a.active().unwrap().name, "Fern");
        assert_eq!(snap.side(Side::B).active().unwrap().current_hp, 160);
        assert!(!snap.is_complete());
        assert!(snap.winner.is_none());
        assert!(snap.recent_log.iter().any(|l| l.contains("sends out Fern")));
    }

    #[test]
    fn test_json_round_trip() {
        let snap = BattleSnapshot::capture(&session(), 10);
        let json = snap.to_json().unwrap();
        let back = BattleSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_recent_log_is_bounded() {
        let snap = BattleSnapshot::capture(&session(), 1);
        assert_eq!(snap.recent_log.len(), 1);
    }
}
