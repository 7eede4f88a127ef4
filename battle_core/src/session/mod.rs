//! Session registry - pairs participants into battles and enforces turn order

mod action;
mod battle_session;
mod clock;
mod snapshot;
mod sweep;

pub use action::{ActionOutcome, PlayerAction, TimeoutOutcome};
pub use battle_session::Session;
pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::{BattleSnapshot, CharacterSnapshot, SideSnapshot};
pub use sweep::spawn_sweeper;

use crate::battle::BattleEngine;
use crate::character::CharacterInstance;
use crate::config::{BattleConstants, SessionConfig};
use crate::error::BattleError;
use crate::types::Side;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// What one sweep pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Participants charged with a timeout
    pub timed_out: Vec<String>,
    /// Participants who forfeited by timing out
    pub forfeited: Vec<String>,
    /// Sessions dropped for age
    pub expired: Vec<Uuid>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.timed_out.is_empty() && self.forfeited.is_empty() && self.expired.is_empty()
    }
}

/// Owns every live session and indexes it by both participant ids.
///
/// A participant belongs to at most one session at a time. Finished battles
/// stay readable until the participant starts a new one or the sweep drops
/// them; a forfeit by timeout removes the session immediately.
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
    by_participant: HashMap<String, Uuid>,
    constants: BattleConstants,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(constants: BattleConstants, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        SessionRegistry {
            sessions: HashMap::new(),
            by_participant: HashMap::new(),
            constants,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start a battle between two participants and their teams
    pub fn create_battle(
        &mut self,
        participant_a: &str,
        team_a: Vec<CharacterInstance>,
        participant_b: &str,
        team_b: Vec<CharacterInstance>,
    ) -> Result<Uuid, BattleError> {
        self.check_participants(participant_a, participant_b)?;
        let engine = BattleEngine::new(team_a, team_b, self.constants.clone())?;
        Ok(self.insert(participant_a, participant_b, engine))
    }

    /// Like [`create_battle`](Self::create_battle) with a fixed rng seed
    pub fn create_seeded_battle(
        &mut self,
        participant_a: &str,
        team_a: Vec<CharacterInstance>,
        participant_b: &str,
        team_b: Vec<CharacterInstance>,
        seed: u64,
    ) -> Result<Uuid, BattleError> {
        self.check_participants(participant_a, participant_b)?;
        let engine = BattleEngine::with_seed(team_a, team_b, self.constants.clone(), seed)?;
        Ok(self.insert(participant_a, participant_b, engine))
    }

    pub fn submit_action(&mut self, participant: &str, action: PlayerAction) -> Result<ActionOutcome, BattleError> {
        let now = self.clock.now();
        let (session, side) = self.session_mut(participant)?;
        let outcome = session.apply_action(side, action, now).inspect_err(|e| {
            tracing::warn!(participant, error = %e, "action refused");
        })?;
        if !outcome.success {
            tracing::warn!(session_id = %session.id(), participant, reason = %outcome.message, "action rejected");
        }
        if outcome.battle_complete {
            tracing::info!(
                session_id = %session.id(),
                winner = session.winner().unwrap_or("none"),
                "battle complete"
            );
        }
        Ok(outcome)
    }

    /// Charge `participant` with a missed turn deadline
    pub fn handle_timeout(&mut self, participant: &str) -> Result<TimeoutOutcome, BattleError> {
        let now = self.clock.now();
        let max = self.config.max_consecutive_timeouts;
        let (session, side) = self.session_mut(participant)?;
        let outcome = session.apply_timeout(side, max, now)?;
        let id = session.id();

        if outcome.forfeited {
            tracing::warn!(session_id = %id, participant, "forfeit by timeout");
            self.remove(id);
        } else {
            tracing::info!(session_id = %id, participant, "turn timeout");
        }
        Ok(outcome)
    }

    pub fn get_session(&self, participant: &str) -> Option<&Session> {
        self.by_participant.get(participant).and_then(|id| self.sessions.get(id))
    }

    pub fn get_session_by_id(&self, id: Uuid) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_snapshot(&self, participant: &str) -> Option<BattleSnapshot> {
        self.get_session(participant)
            .map(|s| BattleSnapshot::capture(s, self.config.recent_log_len))
    }

    /// Drop a session and both participant mappings
    pub fn end_session(&mut self, participant: &str) -> Option<Uuid> {
        let id = *self.by_participant.get(participant)?;
        self.remove(id);
        Some(id)
    }

    /// Escalate overdue turns and drop sessions past their maximum age
    pub fn sweep(&mut self) -> SweepReport {
        self.sweep_at(self.clock.now())
    }

    fn sweep_at(&mut self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();
        let max_age = chrono::Duration::from_std(self.config.max_session_age()).unwrap_or(chrono::Duration::MAX);
        let turn_timeout = chrono::Duration::from_std(self.config.turn_timeout()).unwrap_or(chrono::Duration::MAX);

        // Step 1: Expire old sessions
        let expired: Vec<Uuid> = self
            .sessions
            .values()
            .filter(|s| now - s.created_at() > max_age)
            .map(|s| s.id())
            .collect();
        for id in expired {
            tracing::info!(session_id = %id, "session expired");
            self.remove(id);
            report.expired.push(id);
        }

        // Step 2: Charge every side still owing an action on an overdue turn.
        // Both sides of a session are charged together.
        let overdue: Vec<(Uuid, Vec<Side>)> = self
            .sessions
            .values()
            .filter(|s| !s.is_complete() && now - s.turn_started_at() >= turn_timeout)
            .map(|s| (s.id(), s.pending_sides()))
            .collect();
        let max = self.config.max_consecutive_timeouts;
        for (id, sides) in overdue {
            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };
            let outcomes = match session.apply_timeouts(&sides, max, now) {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "timeout not charged");
                    continue;
                }
            };
            let participants: Vec<String> = sides.iter().map(|side| session.participant(*side).to_string()).collect();

            let mut closed = false;
            for (participant, outcome) in participants.into_iter().zip(outcomes) {
                if outcome.forfeited {
                    tracing::warn!(session_id = %id, participant = %participant, "forfeit by timeout");
                    report.forfeited.push(participant);
                    closed = true;
                } else {
                    tracing::info!(session_id = %id, participant = %participant, "turn timeout");
                    report.timed_out.push(participant);
                }
            }
            if closed {
                self.remove(id);
            }
        }

        report
    }

    /// Read-only admission check; nothing changes until the engine is built
    fn check_participants(&self, participant_a: &str, participant_b: &str) -> Result<(), BattleError> {
        if participant_a == participant_b {
            return Err(BattleError::validation("A participant cannot battle itself"));
        }
        for participant in [participant_a, participant_b] {
            if let Some(session) = self.get_session(participant) {
                if !session.is_complete() {
                    return Err(BattleError::validation(format!("{} is already in a battle", participant)));
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, participant_a: &str, participant_b: &str, engine: BattleEngine) -> Uuid {
        // Finished battles give way to the new one
        for participant in [participant_a, participant_b] {
            self.end_session(participant);
        }
        let session = Session::new(participant_a, participant_b, engine, self.clock.now());
        let id = session.id();
        self.by_participant.insert(participant_a.to_string(), id);
        self.by_participant.insert(participant_b.to_string(), id);
        self.sessions.insert(id, session);
        tracing::info!(session_id = %id, participant_a, participant_b, "battle created");
        id
    }

    fn session_mut(&mut self, participant: &str) -> Result<(&mut Session, Side), BattleError> {
        let id = self
            .by_participant
            .get(participant)
            .ok_or_else(|| BattleError::state(format!("{} is not in a battle", participant)))?;
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| BattleError::state(format!("{} is not in a battle", participant)))?;
        let side = session
            .side_of(participant)
            .ok_or_else(|| BattleError::state(format!("{} is not in a battle", participant)))?;
        Ok((session, side))
    }

    fn remove(&mut self, id: Uuid) {
        if let Some(session) = self.sessions.remove(&id) {
            for participant in session.participants() {
                if self.by_participant.get(participant) == Some(&id) {
                    self.by_participant.remove(participant);
                }
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(BattleConstants::default(), SessionConfig::default(), Arc::new(SystemClock::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_character;

    fn registry() -> (SessionRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let registry = SessionRegistry::new(BattleConstants::default(), SessionConfig::default(), clock.clone());
        (registry, clock)
    }

    fn start(registry: &mut SessionRegistry) -> Uuid {
        registry
            .create_seeded_battle(
                "alice",
                vec![test_character("Fern", &["Zoltraak"])],
                "bob",
                vec![test_character("Aura", &["Zoltraak"])],
                12345,
            )
            .unwrap()
    }

    #[test]
    fn test_both_ids_reach_the_session() {
        let (mut reg, _) = registry();
        let id = start(&mut reg);
        assert_eq!(reg.get_session("alice").unwrap().id(), id);
        assert_eq!(reg.get_session("bob").unwrap().id(), id);
        assert!(reg.get_session("carol").is_none());
    }

    #[test]
    fn test_create_rejects_busy_participant() {
        let (mut reg, _) = registry();
        start(&mut reg);
        let err = reg
            .create_battle(
                "alice",
                vec![test_character("Fern", &["Zoltraak"])],
                "carol",
                vec![test_character("Stark", &["Zoltraak"])],
            )
            .unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));
        assert_eq!(reg.len(), 1);
        assert!(reg.get_session("carol").is_none());
    }

    #[test]
    fn test_rejected_create_keeps_finished_battle() {
        let (mut reg, _) = registry();
        let first = start(&mut reg);
        reg.submit_action("bob", PlayerAction::Flee).unwrap();

        let err = reg
            .create_battle("alice", Vec::new(), "carol", vec![test_character("Stark", &["Zoltraak"])])
            .unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));

        let snapshot = reg.get_snapshot("alice").unwrap();
        assert_eq!(snapshot.session_id, first);
        assert_eq!(snapshot.winner.as_deref(), Some("alice"));
        assert_eq!(reg.get_session("bob").unwrap().id(), first);
    }

    #[test]
    fn test_create_rejects_self_battle() {
        let (mut reg, _) = registry();
        let err = reg
            .create_battle(
                "alice",
                vec![test_character("Fern", &["Zoltraak"])],
                "alice",
                vec![test_character("Stark", &["Zoltraak"])],
            )
            .unwrap_err();
        assert!(matches!(err, BattleError::Validation(_)));
    }

    #[test]
    fn test_finished_battle_gives_way() {
        let (mut reg, _) = registry();
        let first = start(&mut reg);
        reg.submit_action("bob", PlayerAction::Flee).unwrap();
        let second = start(&mut reg);
        assert_ne!(first, second);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unknown_participant_is_state_error() {
        let (mut reg, _) = registry();
        let err = reg.submit_action("nobody", PlayerAction::Flee).unwrap_err();
        assert!(matches!(err, BattleError::State(_)));
    }

    #[test]
    fn test_sweep_charges_overdue_turns() {
        let (mut reg, clock) = registry();
        start(&mut reg);
        reg.submit_action("alice", PlayerAction::attack("Zoltraak")).unwrap();

        clock.advance(chrono::Duration::seconds(121));
        let report = reg.sweep();
        assert_eq!(report.timed_out, vec!["bob".to_string()]);

        let session = reg.get_session("bob").unwrap();
        assert_eq!(session.engine().turn(), 2);
        assert_eq!(session.consecutive_timeouts(Side::B), 1);
    }

    #[test]
    fn test_sweep_draws_when_both_sides_idle() {
        let (mut reg, clock) = registry();
        let id = start(&mut reg);

        for _ in 0..2 {
            clock.advance(chrono::Duration::seconds(121));
            let report = reg.sweep();
            assert_eq!(report.timed_out, vec!["alice".to_string(), "bob".to_string()]);
            assert!(report.forfeited.is_empty());
        }

        clock.advance(chrono::Duration::seconds(121));
        let report = reg.sweep();
        assert!(report.timed_out.is_empty());
        assert_eq!(report.forfeited, vec!["alice".to_string(), "bob".to_string()]);
        assert!(reg.get_session_by_id(id).is_none());
        assert!(reg.get_session("alice").is_none());
        assert!(reg.get_session("bob").is_none());
    }

    #[test]
    fn test_sweep_leaves_fresh_turns_alone() {
        let (mut reg, clock) = registry();
        start(&mut reg);
        clock.advance(chrono::Duration::seconds(30));
        assert!(reg.sweep().is_empty());
    }

    #[test]
    fn test_sweep_expires_old_sessions() {
        let (mut reg, clock) = registry();
        let id = start(&mut reg);
        reg.submit_action("bob", PlayerAction::Flee).unwrap();

        clock.advance(chrono::Duration::seconds(1801));
        let report = reg.sweep();
        assert_eq!(report.expired, vec![id]);
        assert!(reg.is_empty());
        assert!(reg.get_session("alice").is_none());
    }
}
