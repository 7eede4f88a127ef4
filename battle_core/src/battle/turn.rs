//! Turn-end pipeline

use super::state::{split_parties, BattleState};
use super::BattleEngine;
use crate::character::LEECH_CURSE_FRACTION;
use crate::config::HazardConstants;
use crate::hooks::HookContext;
use crate::types::{AmbientMagic, HazardKind, Side};

/// `floor((layers * percent / 100) * base_reference_hp)`
pub fn hazard_damage(kind: HazardKind, layers: u8, constants: &HazardConstants) -> u32 {
    let percent = match kind {
        HazardKind::ManaTraps => constants.mana_traps_percent,
        HazardKind::SpiritualSpikes => constants.spiritual_spikes_percent,
        HazardKind::IllusoryTerrain => constants.illusory_terrain_percent,
    };
    let layers = layers.min(constants.max_layers) as f64;
    (layers * percent / 100.0 * constants.base_reference_hp).floor() as u32
}

impl BattleEngine {
    /// Close the logical turn. Does nothing once the battle is complete.
    /// Returns the turn number now in progress.
    pub fn process_turn_end(&mut self) -> u32 {
        if self.is_complete() {
            return self.state.turn;
        }

        // Step 1: Condition damage
        for side in Side::BOTH {
            let c = self.state.active_mut(side);
            if c.is_defeated() {
                continue;
            }
            let lost = c.apply_condition_damage();
            if lost > 0 {
                let msg = format!("{} is worn down by exhaustion! (-{} HP)", c.name, lost);
                self.state.log.push(msg);
            }
        }

        // Step 2: Condition durations
        for side in Side::BOTH {
            let c = self.state.active_mut(side);
            if let Some(expired) = c.tick_condition() {
                let msg = format!("{} is no longer {:?}.", c.name, expired);
                self.state.log.push(msg);
            }
        }

        // Step 3: Leech curses feed the opposing active
        for side in Side::BOTH {
            self.apply_leech_curse(side);
        }

        // Step 4: Trait then equipment turn-end hooks
        for side in Side::BOTH {
            self.run_turn_end_hooks(side);
        }
        if self.settle_victory_claims() {
            self.audit();
            return self.state.turn;
        }

        // Step 5: Hazards
        for side in Side::BOTH {
            self.apply_hazards(side);
        }

        // Step 6: Ambient mana
        self.apply_ambient_mana();

        for side in Side::BOTH {
            for member in self.state.party_mut(side).members_mut() {
                member.volatile.last_damage = 0;
            }
        }

        // Step 7: Replace anyone who fell during the turn end
        self.settle_knockouts();

        // Step 8: Advance
        self.state.turn += 1;
        self.state.log.set_turn(self.state.turn);
        tracing::debug!(turn = self.state.turn, "turn advanced");
        self.audit();
        self.state.turn
    }

    fn run_turn_end_hooks(&mut self, side: Side) {
        let BattleEngine { state, rng, .. } = self;
        let field = state.field();
        let BattleState { parties, log, .. } = state;
        let owner = parties[side.index()].active_mut();
        if owner.is_defeated() {
            return;
        }
        let mut ctx = HookContext::new(field, log, rng);
        for hook in owner.hooks() {
            hook.on_turn_end(owner, &mut ctx);
        }
    }

    fn apply_leech_curse(&mut self, side: Side) {
        let BattleState { parties, log, .. } = &mut self.state;
        let (own, other) = split_parties(parties, side);
        let cursed = own.active_mut();
        if !cursed.volatile.leech_curse || cursed.is_defeated() {
            return;
        }
        let amount = ((cursed.max_hp() as f64 * LEECH_CURSE_FRACTION).floor() as u32).max(1);
        let lost = cursed.take_damage(amount);
        log.push(format!("{}'s health is sapped by the leech curse! (-{} HP)", cursed.name, lost));

        let leech = other.active_mut();
        if !leech.is_defeated() {
            let healed = leech.heal(lost);
            if healed > 0 {
                log.push(format!("{} drains {} HP.", leech.name, healed));
            }
        }
    }

    /// End the battle when an active character's ability claims it.
    /// Both claiming at once is a draw. Returns whether the battle ended.
    fn settle_victory_claims(&mut self) -> bool {
        let claims: Vec<Side> = Side::BOTH
            .into_iter()
            .filter(|side| {
                let c = self.state.active(*side);
                !c.is_defeated() && c.hooks().iter().any(|h| h.claims_victory(c))
            })
            .collect();
        match claims.as_slice() {
            [] => return false,
            [side] => {
                let winner = self.state.active(*side);
                let line = format!("{}'s {} decides the battle!", winner.name, winner.ability().name());
                self.state.log.push(line);
                self.state.forfeited = Some(side.opponent());
            }
            _ => self.state.drawn = true,
        }
        tracing::debug!(turn = self.state.turn, "battle decided by an ability");
        true
    }

    fn apply_hazards(&mut self, side: Side) {
        let BattleState { parties, log, .. } = &mut self.state;
        let party = &mut parties[side.index()];
        let hazards = party.hazards;
        let c = party.active_mut();
        for kind in HazardKind::ALL {
            let layers = hazards.layers(kind);
            if layers == 0 || c.is_defeated() {
                continue;
            }
            let lost = c.take_damage(hazard_damage(kind, layers, &self.constants.hazard));
            log.push(format!("{} is hurt by {:?}! (-{} HP)", c.name, kind, lost));
        }
    }

    fn apply_ambient_mana(&mut self) {
        let ambient = self.constants.ambient.clone();
        let field = self.state.ambient_magic;
        for side in Side::BOTH {
            let c = self.state.active_mut(side);
            if c.is_defeated() {
                continue;
            }
            match field {
                AmbientMagic::DenseMana => {
                    c.restore_mana(ambient.dense_mana_restore);
                }
                AmbientMagic::NullField => {
                    c.drain_mana(ambient.null_field_drain);
                }
                _ => {}
            }
        }
    }
}
