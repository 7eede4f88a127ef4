//! Stat blocks, stat stages and the level-scaled stat formula

use crate::types::StatKind;
use serde::{Deserialize, Serialize};

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// Six-stat block used for base stats, IVs and growth points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub magic_attack: u32,
    pub magic_defense: u32,
    pub speed: u32,
}

impl Stats {
    pub fn new(hp: u32, attack: u32, defense: u32, magic_attack: u32, magic_defense: u32, speed: u32) -> Self {
        Stats {
            hp,
            attack,
            defense,
            magic_attack,
            magic_defense,
            speed,
        }
    }

    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Hp => self.hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::MagicAttack => self.magic_attack,
            StatKind::MagicDefense => self.magic_defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn total(&self) -> u32 {
        self.hp + self.attack + self.defense + self.magic_attack + self.magic_defense + self.speed
    }
}

/// Per-stat stage in [-6, 6]. HP has no stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBoosts {
    attack: i8,
    defense: i8,
    magic_attack: i8,
    magic_defense: i8,
    speed: i8,
}

impl StatBoosts {
    pub fn get(&self, stat: StatKind) -> i8 {
        match stat {
            StatKind::Hp => 0,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::MagicAttack => self.magic_attack,
            StatKind::MagicDefense => self.magic_defense,
            StatKind::Speed => self.speed,
        }
    }

    /// Shift a stage by `delta`, clamped to [-6, 6]. Returns the change actually applied.
    pub fn modify(&mut self, stat: StatKind, delta: i32) -> i8 {
        let slot = match stat {
            StatKind::Hp => return 0,
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::MagicAttack => &mut self.magic_attack,
            StatKind::MagicDefense => &mut self.magic_defense,
            StatKind::Speed => &mut self.speed,
        };
        let before = *slot;
        let after = (before as i32 + delta).clamp(MIN_STAGE as i32, MAX_STAGE as i32) as i8;
        *slot = after;
        after - before
    }

    pub fn reset(&mut self) {
        *self = StatBoosts::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, i8)> + '_ {
        StatKind::BOOSTABLE.iter().map(move |&s| (s, self.get(s)))
    }
}

/// Multiplier for a stat stage: (2+s)/2 when s >= 0, 2/(2-s) otherwise
pub fn stage_multiplier(stage: i8) -> f64 {
    let s = stage.clamp(MIN_STAGE, MAX_STAGE) as f64;
    if s >= 0.0 {
        (2.0 + s) / 2.0
    } else {
        2.0 / (2.0 - s)
    }
}

/// Level-scaled stat before disposition, stages and equipment
pub fn scaled_stat(base: u32, iv: u32, growth: u32, level: u32, is_hp: bool) -> u32 {
    let core = ((2 * base + iv + growth / 4) * level) / 100;
    if is_hp {
        core + level + 10
    } else {
        core + 5
    }
}
