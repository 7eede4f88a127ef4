//! Volatile flags - per-battle booleans with no duration

use crate::types::VolatileFlag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatileFlags {
    pub mana_shield: bool,
    pub leech_curse: bool,
    pub tormented: bool,
    pub challenged: bool,
    pub channeling: bool,
    pub immaterial: bool,
    pub focused_aura: bool,
    pub misty_aura: bool,
    pub magic_seal: bool,
    /// HP lost to the last hit taken this turn
    pub last_damage: u32,
    /// Technique used on the owner's previous action
    pub last_technique: Option<String>,
}

impl VolatileFlags {
    fn slot(&mut self, flag: VolatileFlag) -> &mut bool {
        match flag {
            VolatileFlag::ManaShield => &mut self.mana_shield,
            VolatileFlag::LeechCurse => &mut self.leech_curse,
            VolatileFlag::Tormented => &mut self.tormented,
            VolatileFlag::Challenged => &mut self.challenged,
            VolatileFlag::Channeling => &mut self.channeling,
            VolatileFlag::Immaterial => &mut self.immaterial,
            VolatileFlag::FocusedAura => &mut self.focused_aura,
            VolatileFlag::MistyAura => &mut self.misty_aura,
            VolatileFlag::MagicSeal => &mut self.magic_seal,
        }
    }

    pub fn set(&mut self, flag: VolatileFlag, value: bool) {
        *self.slot(flag) = value;
    }

    pub fn is_set(&self, flag: VolatileFlag) -> bool {
        match flag {
            VolatileFlag::ManaShield => self.mana_shield,
            VolatileFlag::LeechCurse => self.leech_curse,
            VolatileFlag::Tormented => self.tormented,
            VolatileFlag::Challenged => self.challenged,
            VolatileFlag::Channeling => self.channeling,
            VolatileFlag::Immaterial => self.immaterial,
            VolatileFlag::FocusedAura => self.focused_aura,
            VolatileFlag::MistyAura => self.misty_aura,
            VolatileFlag::MagicSeal => self.magic_seal,
        }
    }

    pub fn record_use(&mut self, technique: &str) {
        self.last_technique = Some(technique.to_string());
    }

    /// Everything resets when the owner leaves the field
    pub fn clear(&mut self) {
        *self = VolatileFlags::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read() {
        let mut flags = VolatileFlags::default();
        flags.set(VolatileFlag::FocusedAura, true);
        assert!(flags.is_set(VolatileFlag::FocusedAura));
        assert!(flags.focused_aura);
        assert!(!flags.is_set(VolatileFlag::ManaShield));
    }

    #[test]
    fn test_clear_forgets_last_technique() {
        let mut flags = VolatileFlags::default();
        flags.record_use("Zoltraak");
        flags.set(VolatileFlag::Tormented, true);
        assert_eq!(flags.last_technique.as_deref(), Some("Zoltraak"));

        flags.clear();
        assert!(!flags.tormented);
        assert_eq!(flags.last_technique, None);
    }
}
