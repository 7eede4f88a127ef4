//! Dispositions: a fixed +10% / -10% pair set at character creation

use crate::types::StatKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Calm,
    Fierce,
    Studious,
    Stoic,
    Swift,
    Hardy,
    #[default]
    Balanced,
}

impl Disposition {
    pub const ALL: [Disposition; 7] = [
        Disposition::Calm,
        Disposition::Fierce,
        Disposition::Studious,
        Disposition::Stoic,
        Disposition::Swift,
        Disposition::Hardy,
        Disposition::Balanced,
    ];

    /// (increased, decreased)
    pub fn stats(self) -> (StatKind, StatKind) {
        match self {
            Disposition::Calm => (StatKind::MagicDefense, StatKind::Attack),
            Disposition::Fierce => (StatKind::Attack, StatKind::MagicDefense),
            Disposition::Studious => (StatKind::MagicAttack, StatKind::Defense),
            Disposition::Stoic => (StatKind::Defense, StatKind::MagicAttack),
            Disposition::Swift => (StatKind::Speed, StatKind::Hp),
            Disposition::Hardy => (StatKind::Hp, StatKind::Speed),
            Disposition::Balanced => (StatKind::Hp, StatKind::Hp),
        }
    }

    /// Apply the disposition to an already-scaled stat (floored)
    pub fn apply(self, stat: StatKind, value: u32) -> u32 {
        let (up, down) = self.stats();
        if up == down {
            return value;
        }
        if stat == up {
            (value as f64 * 1.1).floor() as u32
        } else if stat == down {
            (value as f64 * 0.9).floor() as u32
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fierce() {
        assert_eq!(Disposition::Fierce.apply(StatKind::Attack, 105), 115);
        assert_eq!(Disposition::Fierce.apply(StatKind::MagicDefense, 105), 94);
        assert_eq!(Disposition::Fierce.apply(StatKind::Speed, 105), 105);
    }

    #[test]
    fn test_balanced_is_neutral() {
        for stat in [StatKind::Hp, StatKind::Attack] {
            assert_eq!(Disposition::Balanced.apply(stat, 160), 160);
        }
    }
}
