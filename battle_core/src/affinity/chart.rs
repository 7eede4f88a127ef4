//! Static effectiveness and race bonus tables

use crate::types::{Affinity, Race};

/// Attack affinity vs defender affinity. Pairs not listed are neutral.
pub(super) fn chart_entry(attack: Affinity, defend: Affinity) -> Option<f64> {
    use Affinity::*;
    let value = match (attack, defend) {
        (Destruction, Defense) => 0.5,
        (Destruction, Illusion) => 2.0,
        (Destruction, Support) => 1.5,

        (Support, Destruction) => 0.5,
        (Support, Defense) => 2.0,

        (Defense, Destruction) => 2.0,
        (Defense, Support) => 0.5,

        (Healing, DemonicAura) => 2.0,
        (Healing, Destruction) => 0.5,

        (Illusion, Support) => 2.0,
        (Illusion, Destruction) => 0.5,

        (ElementalFire, ElementalWater) => 0.5,
        (ElementalFire, ElementalWind) => 2.0,
        (ElementalFire, ElementalEarth) => 1.5,

        (ElementalWater, ElementalFire) => 2.0,
        (ElementalWater, ElementalEarth) => 0.5,

        (ElementalWind, ElementalEarth) => 2.0,
        (ElementalWind, ElementalFire) => 0.5,

        (ElementalEarth, ElementalWind) => 0.5,
        (ElementalEarth, ElementalWater) => 2.0,

        (DemonicAura, Healing) => 0.5,
        (DemonicAura, Support) => 2.0,
        (DemonicAura, Defense) => 1.5,

        _ => return None,
    };
    Some(value)
}

/// How well a race channels a given affinity. Pairs not listed are neutral.
pub(super) fn race_bonus(race: Race, affinity: Affinity) -> Option<f64> {
    use Affinity::*;
    let value = match (race, affinity) {
        (Race::Human, Support) => 1.2,
        (Race::Human, DemonicAura) => 0.8,

        (Race::Elf, Healing) => 1.3,
        (Race::Elf, Illusion) => 1.2,
        (Race::Elf, Destruction) => 1.1,

        (Race::Dwarf, Defense) => 1.3,
        (Race::Dwarf, ElementalEarth) => 1.2,
        (Race::Dwarf, Illusion) => 0.8,

        (Race::Demon, DemonicAura) => 1.5,
        (Race::Demon, Destruction) => 1.2,
        (Race::Demon, Healing) => 0.5,

        (Race::Monster, ElementalFire) => 1.1,
        (Race::Monster, ElementalWater) => 1.1,
        (Race::Monster, Support) => 0.9,

        (Race::Golem, Defense) => 1.5,
        (Race::Golem, ElementalEarth) => 1.3,
        (Race::Golem, ElementalWater) => 0.7,

        (Race::Spirit, Illusion) => 1.4,
        (Race::Spirit, Support) => 1.2,
        (Race::Spirit, Destruction) => 0.8,

        _ => return None,
    };
    Some(value)
}
