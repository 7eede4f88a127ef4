//! Target resolution for the four targeting modes

use super::state::Party;
use crate::error::BattleError;
use crate::technique::Technique;
use crate::types::TargetType;

/// Who a technique lands on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    /// The user itself
    User,
    /// Indices into the opposing party, primary target first
    Opponents(Vec<usize>),
}

impl Targets {
    pub fn primary(&self) -> Option<usize> {
        match self {
            Targets::User => None,
            Targets::Opponents(indices) => indices.first().copied(),
        }
    }
}

/// Resolve the targets of `technique` against the opposing party.
///
/// `chosen` names an opposing member and only matters for `choose_target`
/// techniques. Every resolved target is standing.
pub fn resolve_targets(technique: &Technique, opponents: &Party, chosen: Option<&str>) -> Result<Targets, BattleError> {
    let active = opponents.active_index();
    let indices = match technique.target_type {
        TargetType::SelfTarget => return Ok(Targets::User),
        TargetType::Single => vec![active],
        TargetType::ChooseTarget => match chosen {
            Some(name) => {
                let index = opponents
                    .index_of(name)
                    .ok_or_else(|| BattleError::validation(format!("No opposing character named {}", name)))?;
                vec![index]
            }
            None => vec![active],
        },
        TargetType::MultiTarget => {
            let len = opponents.len();
            (0..len)
                .map(|offset| (active + offset) % len)
                .filter(|&i| opponents.member(i).is_some_and(|m| !m.is_defeated()))
                .take(technique.multi_target_count.max(1))
                .collect()
        }
        TargetType::AllEnemies => opponents
            .members()
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_defeated())
            .map(|(i, _)| i)
            .collect(),
    };

    match indices.first().and_then(|&i| opponents.member(i)) {
        None => Err(BattleError::validation("No standing target")),
        Some(target) if target.is_defeated() => {
            Err(BattleError::validation(format!("{} has already been defeated", target.name)))
        }
        Some(_) => Ok(Targets::Opponents(indices)),
    }
}
