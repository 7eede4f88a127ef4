//! BattleState - parties, field conditions and outcome

use super::log::BattleLog;
use crate::character::CharacterInstance;
use crate::types::{AmbientMagic, HazardKind, Side, Terrain};
use serde::{Deserialize, Serialize};

/// Field-wide conditions visible to effects and hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    pub ambient_magic: AmbientMagic,
    pub terrain: Terrain,
    pub turn: u32,
}

/// Hazard layers laid on one side of the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HazardLayers {
    pub mana_traps: u8,
    pub spiritual_spikes: u8,
    pub illusory_terrain: u8,
}

impl HazardLayers {
    pub fn layers(&self, kind: HazardKind) -> u8 {
        match kind {
            HazardKind::ManaTraps => self.mana_traps,
            HazardKind::SpiritualSpikes => self.spiritual_spikes,
            HazardKind::IllusoryTerrain => self.illusory_terrain,
        }
    }

    /// Add one layer up to `max`. Returns false when already at the cap.
    pub fn add(&mut self, kind: HazardKind, max: u8) -> bool {
        let slot = match kind {
            HazardKind::ManaTraps => &mut self.mana_traps,
            HazardKind::SpiritualSpikes => &mut self.spiritual_spikes,
            HazardKind::IllusoryTerrain => &mut self.illusory_terrain,
        };
        if *slot >= max {
            return false;
        }
        *slot += 1;
        true
    }
}

/// One side's team. Defeated members stay in place until the battle ends.
#[derive(Debug, Clone)]
pub struct Party {
    members: Vec<CharacterInstance>,
    active: usize,
    pub hazards: HazardLayers,
}

impl Party {
    pub fn new(members: Vec<CharacterInstance>) -> Self {
        Party {
            members,
            active: 0,
            hazards: HazardLayers::default(),
        }
    }

    pub fn members(&self) -> &[CharacterInstance] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&CharacterInstance> {
        self.members.get(index)
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut CharacterInstance> {
        self.members.get_mut(index)
    }

    pub(crate) fn members_mut(&mut self) -> &mut [CharacterInstance] {
        &mut self.members
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub(crate) fn set_active(&mut self, index: usize) {
        self.active = index;
    }

    pub fn active(&self) -> &CharacterInstance {
        &self.members[self.active]
    }

    pub fn active_mut(&mut self) -> &mut CharacterInstance {
        &mut self.members[self.active]
    }

    /// Case-insensitive member lookup
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.members.iter().filter(|m| !m.is_defeated()).count()
    }

    pub fn all_defeated(&self) -> bool {
        self.members.iter().all(|m| m.is_defeated())
    }

    /// First standing member in party order other than `except`
    pub fn next_standing(&self, except: usize) -> Option<usize> {
        self.members
            .iter()
            .enumerate()
            .find(|(i, m)| *i != except && !m.is_defeated())
            .map(|(i, _)| i)
    }
}

/// How a finished battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "side", rename_all = "snake_case")]
pub enum BattleOutcome {
    Victory(Side),
    /// Both sides fell in the same resolution pass, or both walked away
    Draw,
}

impl BattleOutcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            BattleOutcome::Victory(side) => Some(side),
            BattleOutcome::Draw => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BattleState {
    pub(crate) parties: [Party; 2],
    pub turn: u32,
    pub ambient_magic: AmbientMagic,
    pub terrain: Terrain,
    pub log: BattleLog,
    pub(crate) forfeited: Option<Side>,
    pub(crate) drawn: bool,
}

impl BattleState {
    pub fn new(party_a: Party, party_b: Party) -> Self {
        BattleState {
            parties: [party_a, party_b],
            turn: 1,
            ambient_magic: AmbientMagic::None,
            terrain: Terrain::Normal,
            log: BattleLog::new(1),
            forfeited: None,
            drawn: false,
        }
    }

    pub fn party(&self, side: Side) -> &Party {
        &self.parties[side.index()]
    }

    pub fn party_mut(&mut self, side: Side) -> &mut Party {
        &mut self.parties[side.index()]
    }

    pub fn active(&self, side: Side) -> &CharacterInstance {
        self.party(side).active()
    }

    pub fn active_mut(&mut self, side: Side) -> &mut CharacterInstance {
        self.party_mut(side).active_mut()
    }

    pub fn field(&self) -> Field {
        Field {
            ambient_magic: self.ambient_magic,
            terrain: self.terrain,
            turn: self.turn,
        }
    }

    pub fn forfeited(&self) -> Option<Side> {
        self.forfeited
    }

    /// Terminal result, if any. Pure.
    pub fn outcome(&self) -> Option<BattleOutcome> {
        if self.drawn {
            return Some(BattleOutcome::Draw);
        }
        if let Some(side) = self.forfeited {
            return Some(BattleOutcome::Victory(side.opponent()));
        }
        let a_down = self.party(Side::A).all_defeated();
        let b_down = self.party(Side::B).all_defeated();
        match (a_down, b_down) {
            (true, true) => Some(BattleOutcome::Draw),
            (true, false) => Some(BattleOutcome::Victory(Side::B)),
            (false, true) => Some(BattleOutcome::Victory(Side::A)),
            (false, false) => None,
        }
    }
}

/// Split the two parties into (own, other) mutable halves
pub(crate) fn split_parties(parties: &mut [Party; 2], own: Side) -> (&mut Party, &mut Party) {
    let (first, second) = parties.split_at_mut(1);
    match own {
        Side::A => (&mut first[0], &mut second[0]),
        Side::B => (&mut second[0], &mut first[0]),
    }
}
