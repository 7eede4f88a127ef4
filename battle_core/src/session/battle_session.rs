//! Session - one battle between two participants, gated turn by turn

use super::action::{ActionOutcome, PlayerAction, TimeoutOutcome};
use crate::battle::BattleEngine;
use crate::error::BattleError;
use crate::types::Side;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A battle plus the bookkeeping that turns two participants' submissions
/// into engine turns.
///
/// Each side submits at most one action per turn. Once both have acted the
/// engine's turn-end pass runs exactly once and the gate reopens.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    participants: [String; 2],
    engine: BattleEngine,
    acted: [bool; 2],
    consecutive_timeouts: [u32; 2],
    created_at: DateTime<Utc>,
    turn_started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(participant_a: &str, participant_b: &str, engine: BattleEngine, now: DateTime<Utc>) -> Self {
        Session {
            id: Uuid::new_v4(),
            participants: [participant_a.to_string(), participant_b.to_string()],
            engine,
            acted: [false; 2],
            consecutive_timeouts: [0; 2],
            created_at: now,
            turn_started_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn participant(&self, side: Side) -> &str {
        &self.participants[side.index()]
    }

    pub fn participants(&self) -> &[String; 2] {
        &self.participants
    }

    pub fn side_of(&self, participant: &str) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.participants[side.index()] == participant)
    }

    pub fn has_acted(&self, side: Side) -> bool {
        self.acted[side.index()]
    }

    pub fn consecutive_timeouts(&self, side: Side) -> u32 {
        self.consecutive_timeouts[side.index()]
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turn_started_at(&self) -> DateTime<Utc> {
        self.turn_started_at
    }

    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    /// Participant id of the winner, if the battle has one
    pub fn winner(&self) -> Option<&str> {
        self.engine.winner().map(|side| self.participant(side))
    }

    /// Sides still owing an action this turn
    pub fn pending_sides(&self) -> Vec<Side> {
        Side::BOTH.into_iter().filter(|side| !self.has_acted(*side)).collect()
    }

    /// Apply one participant's action.
    ///
    /// Session-level refusals (battle over, already acted) come back as
    /// `Err(BattleError::State)` with nothing changed. Engine refusals come
    /// back as an unsuccessful outcome; only `CannotAct` among them spends
    /// the participant's action.
    pub(crate) fn apply_action(
        &mut self,
        side: Side,
        action: PlayerAction,
        now: DateTime<Utc>,
    ) -> Result<ActionOutcome, BattleError> {
        if self.is_complete() {
            return Err(BattleError::state("The battle is already over"));
        }
        if self.has_acted(side) {
            return Err(BattleError::state("Already acted this turn, waiting for the opponent"));
        }

        let result = match action {
            PlayerAction::Attack { technique, target } => self
                .engine
                .execute_technique(side, &technique, target.as_deref())
                .map(|report| report.summary()),
            PlayerAction::Switch { character } => self.switch_by_name(side, &character),
            PlayerAction::Flee => self.engine.forfeit(side).map(|()| format!("{} fled the battle", self.participant(side))),
        };

        match result {
            Ok(message) => {
                self.consecutive_timeouts[side.index()] = 0;
                self.mark_acted(side, now);
                Ok(ActionOutcome::succeeded(message, self.is_complete()))
            }
            Err(BattleError::State(msg)) => Err(BattleError::State(msg)),
            Err(err) if err.is_rejection() => Ok(ActionOutcome::failed(err, false)),
            Err(err) => {
                self.consecutive_timeouts[side.index()] = 0;
                self.mark_acted(side, now);
                Ok(ActionOutcome::failed(err, self.is_complete()))
            }
        }
    }

    /// Count a missed deadline against `side`.
    ///
    /// Below the limit the timeout stands in for the side's action. At the
    /// limit the side forfeits.
    pub(crate) fn apply_timeout(
        &mut self,
        side: Side,
        max_consecutive: u32,
        now: DateTime<Utc>,
    ) -> Result<TimeoutOutcome, BattleError> {
        self.apply_timeouts(&[side], max_consecutive, now)?
            .pop()
            .ok_or_else(|| BattleError::state("No timeout was charged"))
    }

    /// Charge every side in `sides` with the same missed deadline.
    ///
    /// All counts go up before any limit is checked. One side at the limit
    /// forfeits; both at the limit ends the battle in a draw. Outcomes come
    /// back in the order of `sides`.
    pub(crate) fn apply_timeouts(
        &mut self,
        sides: &[Side],
        max_consecutive: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeoutOutcome>, BattleError> {
        if self.is_complete() {
            return Err(BattleError::state("The battle is already over"));
        }

        for side in sides {
            self.consecutive_timeouts[side.index()] += 1;
        }
        let at_limit: Vec<Side> = sides
            .iter()
            .copied()
            .filter(|side| self.consecutive_timeouts(*side) >= max_consecutive)
            .collect();

        match at_limit.as_slice() {
            [] => {
                for side in sides {
                    if !self.has_acted(*side) {
                        self.mark_acted(*side, now);
                    }
                }
            }
            [side] => self.engine.forfeit(*side)?,
            _ => self.engine.declare_draw()?,
        }

        let complete = self.is_complete();
        let winner = self.winner().map(str::to_string);
        Ok(sides
            .iter()
            .map(|side| {
                let name = self.participant(*side);
                let count = self.consecutive_timeouts(*side);
                let forfeited = at_limit.contains(side);
                let message = if forfeited {
                    format!("{} timed out {} times in a row and forfeits", name, count)
                } else {
                    format!("{} timed out ({}/{})", name, count, max_consecutive)
                };
                TimeoutOutcome {
                    forfeited,
                    message,
                    battle_complete: complete,
                    winner: winner.clone(),
                }
            })
            .collect())
    }

    fn switch_by_name(&mut self, side: Side, character: &str) -> Result<String, BattleError> {
        let index = self
            .engine
            .party(side)
            .index_of(character)
            .ok_or_else(|| BattleError::validation(format!("{} is not in your party", character)))?;
        self.engine.switch_character(side, index)?;
        Ok(format!("Switched to {}", self.engine.active(side).name))
    }

    /// Record that `side` acted; resolves the turn when both have.
    /// Returns whether the turn ended.
    fn mark_acted(&mut self, side: Side, now: DateTime<Utc>) -> bool {
        self.acted[side.index()] = true;
        if self.acted.iter().all(|a| *a) && !self.is_complete() {
            let turn = self.engine.process_turn_end();
            self.acted = [false; 2];
            self.turn_started_at = now;
            tracing::debug!(session_id = %self.id, turn, "turn resolved");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleOutcome;
    use crate::character::test_character;
    use crate::config::BattleConstants;

    fn session() -> Session {
        let a = vec![test_character("Fern", &["Zoltraak"])];
        let b = vec![test_character("Aura", &["Zoltraak"])];
        let engine = BattleEngine::with_seed(a, b, BattleConstants::default(), 12345).unwrap();
        Session::new("alice", "bob", engine, Utc::now())
    }

    #[test]
    fn test_side_lookup() {
        let s = session();
        assert_eq!(s.side_of("alice"), Some(Side::A));
        assert_eq!(s.side_of("bob"), Some(Side::B));
        assert_eq!(s.side_of("carol"), None);
        assert_eq!(s.participant(Side::B), "bob");
    }

    #[test]
    fn test_turn_resolves_after_both_act() {
        let mut s = session();
        let now = Utc::now();
        s.apply_action(Side::A, PlayerAction::attack("Zoltraak"), now).unwrap();
        assert!(s.has_acted(Side::A));
        assert_eq!(s.engine().turn(), 1);

        s.apply_action(Side::B, PlayerAction::attack("Zoltraak"), now).unwrap();
        assert_eq!(s.engine().turn(), 2);
        assert!(!s.has_acted(Side::A));
        assert!(!s.has_acted(Side::B));
    }

    #[test]
    fn test_double_submit_is_state_error() {
        let mut s = session();
        let now = Utc::now();
        s.apply_action(Side::A, PlayerAction::attack("Zoltraak"), now).unwrap();
        let err = s.apply_action(Side::A, PlayerAction::attack("Zoltraak"), now).unwrap_err();
        assert!(matches!(err, BattleError::State(_)));
    }

    #[test]
    fn test_unknown_technique_leaves_gate_open() {
        let mut s = session();
        let outcome = s
            .apply_action(Side::A, PlayerAction::attack("Mimicry"), Utc::now())
            .unwrap();
        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(BattleError::Validation(_))));
        assert!(!s.has_acted(Side::A));
    }

    #[test]
    fn test_timeout_counts_as_action() {
        let mut s = session();
        let now = Utc::now();
        let outcome = s.apply_timeout(Side::A, 3, now).unwrap();
        assert!(!outcome.forfeited);
        assert!(s.has_acted(Side::A));
        assert_eq!(s.consecutive_timeouts(Side::A), 1);
    }

    #[test]
    fn test_third_timeout_forfeits() {
        let mut s = session();
        let now = Utc::now();
        s.apply_timeout(Side::A, 3, now).unwrap();
        s.apply_timeout(Side::A, 3, now).unwrap();
        let outcome = s.apply_timeout(Side::A, 3, now).unwrap();
        assert!(outcome.forfeited);
        assert!(outcome.battle_complete);
        assert_eq!(outcome.winner.as_deref(), Some("bob"));
    }

    #[test]
    fn test_joint_timeouts_at_limit_draw() {
        let mut s = session();
        let now = Utc::now();
        for _ in 0..2 {
            let outcomes = s.apply_timeouts(&[Side::A, Side::B], 3, now).unwrap();
            assert!(outcomes.iter().all(|o| !o.forfeited));
        }
        assert_eq!(s.engine().turn(), 3);

        let outcomes = s.apply_timeouts(&[Side::A, Side::B], 3, now).unwrap();
        assert!(outcomes.iter().all(|o| o.forfeited && o.battle_complete && o.winner.is_none()));
        assert_eq!(s.engine().outcome(), Some(BattleOutcome::Draw));
        assert_eq!(s.winner(), None);
    }

    #[test]
    fn test_joint_timeouts_longer_streak_forfeits() {
        let mut s = session();
        let now = Utc::now();
        s.apply_timeout(Side::A, 3, now).unwrap();
        s.apply_timeout(Side::B, 3, now).unwrap();
        s.apply_timeout(Side::A, 3, now).unwrap();

        // A is on its third miss, B only its second
        let outcomes = s.apply_timeouts(&[Side::A, Side::B], 3, now).unwrap();
        assert!(outcomes[0].forfeited);
        assert!(!outcomes[1].forfeited);
        assert_eq!(s.winner(), Some("bob"));
    }

    #[test]
    fn test_action_resets_timeout_streak() {
        let mut s = session();
        let now = Utc::now();
        s.apply_timeout(Side::A, 3, now).unwrap();
        s.apply_action(Side::B, PlayerAction::attack("Zoltraak"), now).unwrap();
        s.apply_action(Side::A, PlayerAction::attack("Zoltraak"), now).unwrap();
        assert_eq!(s.consecutive_timeouts(Side::A), 0);
    }

    #[test]
    fn test_flee_ends_battle() {
        let mut s = session();
        let outcome = s.apply_action(Side::B, PlayerAction::Flee, Utc::now()).unwrap();
        assert!(outcome.success);
        assert!(outcome.battle_complete);
        assert_eq!(s.winner(), Some("alice"));
    }

    #[test]
    fn test_switch_to_unknown_member() {
        let mut s = session();
        let outcome = s
            .apply_action(Side::A, PlayerAction::switch("Stark"), Utc::now())
            .unwrap();
        assert!(!outcome.success);
        assert!(!s.has_acted(Side::A));
    }
}
