//! BattleLog - player-facing narrative of a battle

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
    turn: u32,
}

impl BattleLog {
    pub fn new(turn: u32) -> Self {
        BattleLog {
            entries: Vec::new(),
            turn,
        }
    }

    /// Stamp subsequent entries with `turn`
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(turn = self.turn, "{}", message);
        self.entries.push(LogEntry {
            turn: self.turn,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The last `n` messages, oldest first
    pub fn recent(&self, n: usize) -> Vec<String> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(|e| e.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
