//! Shared enums used across characters, techniques and the battle engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of a battle a party belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other side
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Array index for per-side storage
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub const BOTH: [Side; 2] = [Side::A, Side::B];
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "side A"),
            Side::B => write!(f, "side B"),
        }
    }
}

/// Character race, used by the race affinity bonus table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Demon,
    Monster,
    Golem,
    Spirit,
}

/// Damage "type" of a technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affinity {
    ElementalFire,
    ElementalWater,
    ElementalEarth,
    ElementalWind,
    ElementalIce,
    ElementalLightning,
    Destruction,
    Binding,
    Curse,
    Physical,
    Support,
    Defense,
    Healing,
    Detection,
    Illusion,
    Transformation,
    Space,
    Mana,
    Ancient,
    Holy,
    DemonicAura,
    Nature,
    Folk,
    BattleMagic,
    ScholarMagic,
    PriestMagic,
    DemonMagic,
    HumanMagic,
    ElvenMagic,
}

/// Selects which stat pair drives damage, or that the move deals none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueCategory {
    Physical,
    Magical,
    Support,
}

/// Exclusive status with a turn-count duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Normal,
    Exhausted,
    Stunned,
    Confused,
    Frenzied,
    Charmed,
    Dazed,
    Fear,
    MagicSeal,
}

/// Stats a character carries; every stat except HP can be staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Hp,
    Attack,
    Defense,
    MagicAttack,
    MagicDefense,
    Speed,
}

impl StatKind {
    pub const BOOSTABLE: [StatKind; 5] = [
        StatKind::Attack,
        StatKind::Defense,
        StatKind::MagicAttack,
        StatKind::MagicDefense,
        StatKind::Speed,
    ];

    pub fn is_boostable(self) -> bool {
        self != StatKind::Hp
    }
}

/// Per-battle boolean modifiers, cleared on use or when the owner leaves the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatileFlag {
    ManaShield,
    LeechCurse,
    Tormented,
    Challenged,
    Channeling,
    Immaterial,
    FocusedAura,
    MistyAura,
    MagicSeal,
}

/// Battlefield-wide magic condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientMagic {
    #[default]
    None,
    DenseMana,
    ChaosSurge,
    ArcaneStorm,
    NullField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Normal,
    ForestCanopy,
    ObscuringMist,
    AncientRuins,
    DemonicGround,
}

/// Entry hazards laid on a side of the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    ManaTraps,
    SpiritualSpikes,
    IllusoryTerrain,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [
        HazardKind::ManaTraps,
        HazardKind::SpiritualSpikes,
        HazardKind::IllusoryTerrain,
    ];
}

/// How a technique picks its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Single,
    ChooseTarget,
    MultiTarget,
    AllEnemies,
    #[serde(rename = "self")]
    SelfTarget,
}

/// Which participant of a technique an effect lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    User,
    #[default]
    Target,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
        assert_eq!(Side::A.index(), 0);
        assert_eq!(Side::B.index(), 1);
    }

    #[test]
    fn test_hp_not_boostable() {
        assert!(!StatKind::Hp.is_boostable());
        assert!(StatKind::BOOSTABLE.iter().all(|s| s.is_boostable()));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Affinity::DemonicAura).unwrap();
        assert_eq!(json, "\"demonic_aura\"");
        let target: TargetType = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(target, TargetType::SelfTarget);
    }
}
