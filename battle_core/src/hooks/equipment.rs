//! Equipment catalogue

use super::{AbilityHooks, HookContext};
use crate::character::CharacterInstance;
use crate::technique::Technique;
use crate::types::{Affinity, StatKind};
use std::sync::Arc;

pub const EQUIPMENT_IDS: &[&str] = &[
    "staff_of_judgement",
    "axe_of_the_hero",
    "elixir_of_restoration",
    "mana_crystal",
    "barrier_ring",
    "swift_boots",
    "focus_lens",
    "life_orb",
    "scope_of_foresight",
    "grimoire",
    "dragon_scale",
    "spirit_cloak",
    "titan_gauntlets",
    "arcane_orb",
    "vampiric_fangs",
    "shadow_mask",
    "runic_armor",
];

pub(super) fn lookup(id: &str) -> Option<Arc<dyn AbilityHooks>> {
    let item: Arc<dyn AbilityHooks> = match id {
        "staff_of_judgement" => Arc::new(StatItem {
            id: "staff_of_judgement",
            name: "Staff of Judgement",
            boosts: &[(StatKind::MagicAttack, 1.3)],
            crit: 0.0,
        }),
        "axe_of_the_hero" => Arc::new(StatItem {
            id: "axe_of_the_hero",
            name: "Axe of the Hero",
            boosts: &[(StatKind::Attack, 1.2)],
            crit: 0.1,
        }),
        "barrier_ring" => Arc::new(StatItem {
            id: "barrier_ring",
            name: "Barrier Ring",
            boosts: &[(StatKind::Defense, 1.15), (StatKind::MagicDefense, 1.15)],
            crit: 0.0,
        }),
        "swift_boots" => Arc::new(StatItem {
            id: "swift_boots",
            name: "Swift Boots",
            boosts: &[(StatKind::Speed, 1.5)],
            crit: 0.0,
        }),
        "scope_of_foresight" => Arc::new(StatItem {
            id: "scope_of_foresight",
            name: "Scope of Foresight",
            boosts: &[],
            crit: 0.0625,
        }),
        "spirit_cloak" => Arc::new(StatItem {
            id: "spirit_cloak",
            name: "Spirit Cloak",
            boosts: &[(StatKind::Speed, 1.3)],
            crit: 0.0,
        }),
        "titan_gauntlets" => Arc::new(StatItem {
            id: "titan_gauntlets",
            name: "Titan Gauntlets",
            boosts: &[(StatKind::Attack, 1.4)],
            crit: 0.0,
        }),
        "shadow_mask" => Arc::new(StatItem {
            id: "shadow_mask",
            name: "Shadow Mask",
            boosts: &[(StatKind::Speed, 1.1)],
            crit: 0.15,
        }),
        "runic_armor" => Arc::new(StatItem {
            id: "runic_armor",
            name: "Runic Armor",
            boosts: &[
                (StatKind::Defense, 1.2),
                (StatKind::MagicDefense, 1.2),
                (StatKind::Hp, 1.1),
            ],
            crit: 0.0,
        }),
        "elixir_of_restoration" => Arc::new(ElixirOfRestoration),
        "mana_crystal" => Arc::new(ManaCrystal),
        "focus_lens" => Arc::new(FocusLens),
        "life_orb" => Arc::new(LifeOrb),
        "grimoire" => Arc::new(Grimoire),
        "dragon_scale" => Arc::new(DragonScale),
        "arcane_orb" => Arc::new(ArcaneOrb),
        "vampiric_fangs" => Arc::new(VampiricFangs),
        _ => return None,
    };
    Some(item)
}

/// Equipment that only scales stats and crit chance
#[derive(Debug)]
pub struct StatItem {
    id: &'static str,
    name: &'static str,
    boosts: &'static [(StatKind, f64)],
    crit: f64,
}

impl AbilityHooks for StatItem {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn stat_multiplier(&self, stat: StatKind) -> f64 {
        self.boosts
            .iter()
            .find(|(s, _)| *s == stat)
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }

    fn crit_chance_boost(&self) -> f64 {
        self.crit
    }
}

/// Restores 1/16 HP and 5% mana each turn
#[derive(Debug)]
pub struct ElixirOfRestoration;

impl AbilityHooks for ElixirOfRestoration {
    fn id(&self) -> &str {
        "elixir_of_restoration"
    }

    fn name(&self) -> &str {
        "Elixir of Restoration"
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        let healed = owner.heal(owner.max_hp() / 16);
        let restored = owner.restore_mana(owner.max_mana() / 20);
        if healed > 0 || restored > 0 {
            ctx.log.push(format!("{}'s elixir restored {} HP and {} mana.", owner.name, healed, restored));
        }
    }
}

#[derive(Debug)]
pub struct ManaCrystal;

impl AbilityHooks for ManaCrystal {
    fn id(&self) -> &str {
        "mana_crystal"
    }

    fn name(&self) -> &str {
        "Mana Crystal"
    }

    fn mana_cost_reduction(&self) -> u32 {
        3
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, _ctx: &mut HookContext<'_>) {
        owner.restore_mana(5);
    }
}

#[derive(Debug)]
pub struct FocusLens;

impl AbilityHooks for FocusLens {
    fn id(&self) -> &str {
        "focus_lens"
    }

    fn name(&self) -> &str {
        "Focus Lens"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        1.2
    }
}

/// +30% damage; 10% max HP recoil at turn end after taking a hit
#[derive(Debug)]
pub struct LifeOrb;

impl AbilityHooks for LifeOrb {
    fn id(&self) -> &str {
        "life_orb"
    }

    fn name(&self) -> &str {
        "Life Orb"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        _technique: &Technique,
    ) -> f64 {
        1.3
    }

    fn on_turn_end(&self, owner: &mut CharacterInstance, ctx: &mut HookContext<'_>) {
        if owner.volatile.last_damage == 0 {
            return;
        }
        let recoil = owner.take_damage(owner.max_hp() / 10);
        ctx.log.push(format!("{} is hurt by its Life Orb! (-{} HP)", owner.name, recoil));
    }
}

#[derive(Debug)]
pub struct Grimoire;

impl AbilityHooks for Grimoire {
    fn id(&self) -> &str {
        "grimoire"
    }

    fn name(&self) -> &str {
        "Grimoire"
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.properties.magic_based {
            1.2
        } else {
            1.0
        }
    }
}

#[derive(Debug)]
pub struct DragonScale;

impl AbilityHooks for DragonScale {
    fn id(&self) -> &str {
        "dragon_scale"
    }

    fn name(&self) -> &str {
        "Dragon Scale"
    }

    fn stat_multiplier(&self, stat: StatKind) -> f64 {
        if stat == StatKind::MagicDefense {
            1.2
        } else {
            1.0
        }
    }

    fn damage_output_multiplier(
        &self,
        _attacker: &CharacterInstance,
        _target: &CharacterInstance,
        technique: &Technique,
    ) -> f64 {
        if technique.affinity == Affinity::ElementalFire {
            1.25
        } else {
            1.0
        }
    }
}

#[derive(Debug)]
pub struct ArcaneOrb;

impl AbilityHooks for ArcaneOrb {
    fn id(&self) -> &str {
        "arcane_orb"
    }

    fn name(&self) -> &str {
        "Arcane Orb"
    }

    fn stat_multiplier(&self, stat: StatKind) -> f64 {
        if stat == StatKind::MagicAttack {
            1.25
        } else {
            1.0
        }
    }

    fn mana_cost_reduction(&self) -> u32 {
        5
    }
}

/// Heals the holder by a tenth of max HP whenever its hit lands
#[derive(Debug)]
pub struct VampiricFangs;

impl AbilityHooks for VampiricFangs {
    fn id(&self) -> &str {
        "vampiric_fangs"
    }

    fn name(&self) -> &str {
        "Vampiric Fangs"
    }

    fn after_damage_dealt(
        &self,
        attacker: &mut CharacterInstance,
        _target: &CharacterInstance,
        damage: u32,
        ctx: &mut HookContext<'_>,
    ) {
        if damage == 0 {
            return;
        }
        let healed = attacker.heal(attacker.max_hp() / 10);
        if healed > 0 {
            ctx.log.push(format!("{} drained {} HP!", attacker.name, healed));
        }
    }
}
