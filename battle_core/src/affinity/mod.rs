//! AffinityMatrix - attack affinity vs defender affinities and races

mod chart;

use crate::types::{Affinity, Race};

/// Stateless lookup over the effectiveness chart and race bonus table
#[derive(Debug, Clone, Copy, Default)]
pub struct AffinityMatrix;

impl AffinityMatrix {
    /// Multiplier for `attack` landing on a defender with the given affinities.
    ///
    /// Multipliers for each defending affinity are multiplied together; a defender
    /// with no affinities takes neutral damage.
    pub fn effectiveness(attack: Affinity, defender: &[Affinity]) -> f64 {
        defender
            .iter()
            .filter_map(|&d| chart::chart_entry(attack, d))
            .product()
    }

    /// Multiplier for a character of the given races casting `affinity`
    pub fn race_bonus(affinity: Affinity, races: &[Race]) -> f64 {
        races
            .iter()
            .filter_map(|&r| chart::race_bonus(r, affinity))
            .product()
    }

    /// Short battle-log phrase for a combined multiplier
    pub fn advantage_text(multiplier: f64) -> Option<&'static str> {
        if multiplier >= 2.0 {
            Some("It's super effective!")
        } else if multiplier > 1.0 {
            Some("It's effective!")
        } else if multiplier <= 0.0 {
            Some("It has no effect...")
        } else if multiplier < 1.0 {
            Some("It's not very effective...")
        } else {
            None
        }
    }
}
