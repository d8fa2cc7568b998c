//! Nightly regeneration of LE, AE and KE.
//!
//! Each pool regains 1W6 plus the clamped global modifier plus the
//! character's bonus. LE gains one more point on a passed KO probe, AE on a
//! passed IN probe. Characters with master regeneration replace the AE die
//! with a fixed value. Pools with a maximum of 0 are skipped.
//!
//! Dice are consumed in a fixed order: LE die, KO probe, AE die (unless
//! master regeneration), IN probe, KE die.

use dsa_core::{Character, Energies};
use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;
use crate::probe::probe_single_attribute;

/// Lower bound of the global modifier.
pub const MIN_MODIFIER: i32 = -6;
/// Upper bound of the global modifier.
pub const MAX_MODIFIER: i32 = 2;

/// Inputs of a regeneration phase.
#[derive(Debug, Clone)]
pub struct RegenerationRequest<'a> {
    /// The resting character.
    pub character: &'a Character,
    /// Resting conditions (camp, weather, disturbance); clamped to -6..=2.
    pub modifier: i32,
}

/// Regeneration of one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRegeneration {
    /// Base regeneration: the W6 roll or the master formula.
    pub base: i32,
    /// The W6 roll, `None` when the master formula was used.
    pub die: Option<u32>,
    /// Whether the auxiliary attribute probe added a point.
    pub probe_bonus: bool,
    /// Points regained, never negative.
    pub total: i32,
}

/// Outcome of a regeneration phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationResult {
    /// Life points.
    pub le: PoolRegeneration,
    /// Astral points, for spellcasters.
    pub ae: Option<PoolRegeneration>,
    /// Karma points, for blessed characters.
    pub ke: Option<PoolRegeneration>,
}

/// Fixed AE base under master regeneration: `floor((max(KL, IN) + 1) / 3) + 3`.
pub fn master_regeneration_base(kl: i32, intuition: i32) -> i32 {
    (kl.max(intuition) + 1).div_euclid(3) + 3
}

/// Run one regeneration phase.
pub fn regenerate(request: &RegenerationRequest<'_>, dice: &mut impl DiceRoller) -> RegenerationResult {
    let character = request.character;
    let energies = &character.energies;
    let attrs = &character.attributes;
    let modifier = request.modifier.clamp(MIN_MODIFIER, MAX_MODIFIER);

    let le = {
        let die = dice.d6();
        let probe_bonus = probe_single_attribute(attrs.ko, 0, dice).success;
        pool(die as i32, Some(die), modifier + energies.le_regen_bonus, probe_bonus)
    };

    let ae = energies.is_spellcaster().then(|| {
        let (base, die) = if energies.has_master_regeneration {
            (master_regeneration_base(attrs.kl, attrs.intuition), None)
        } else {
            let die = dice.d6();
            (die as i32, Some(die))
        };
        let probe_bonus = probe_single_attribute(attrs.intuition, 0, dice).success;
        pool(base, die, modifier + energies.ae_regen_bonus, probe_bonus)
    });

    let ke = energies.is_blessed().then(|| {
        let die = dice.d6();
        pool(die as i32, Some(die), modifier + energies.ke_regen_bonus, false)
    });

    RegenerationResult { le, ae, ke }
}

fn pool(base: i32, die: Option<u32>, bonus: i32, probe_bonus: bool) -> PoolRegeneration {
    PoolRegeneration {
        base,
        die,
        probe_bonus,
        total: (base + bonus + i32::from(probe_bonus)).max(0),
    }
}

/// Energies after adding the regenerated points, capped at each maximum.
pub fn apply_regeneration(energies: &Energies, result: &RegenerationResult) -> Energies {
    let gain = |p: Option<PoolRegeneration>| p.map_or(0, |p| p.total);
    Energies {
        le_current: (energies.le_current + result.le.total).min(energies.le_max),
        ae_current: (energies.ae_current + gain(result.ae)).min(energies.ae_max),
        ke_current: (energies.ke_current + gain(result.ke)).min(energies.ke_max),
        ..energies.clone()
    }
}

#[cfg(test)]
mod tests {
    use dsa_core::Attributes;

    use super::*;
    use crate::dice::ScriptedDice;

    fn mage(master: bool) -> Character {
        Character::new("Rakorium")
            .with_attributes(Attributes::uniform(12).with(dsa_core::Attribute::KL, 16))
            .with_energies(Energies {
                le_current: 10,
                le_max: 30,
                ae_current: 5,
                ae_max: 40,
                ae_regen_bonus: 1,
                has_master_regeneration: master,
                ..Energies::default()
            })
    }

    #[test]
    fn master_formula() {
        assert_eq!(master_regeneration_base(16, 12), 8);
        assert_eq!(master_regeneration_base(14, 14), 8);
        assert_eq!(master_regeneration_base(10, 13), 7);
    }

    #[test]
    fn mundane_character_only_regenerates_le() {
        let c = Character::new("Alrik");
        let r = regenerate(
            &RegenerationRequest {
                character: &c,
                modifier: 0,
            },
            &mut ScriptedDice::new([4, 3]),
        );
        assert_eq!(r.le.total, 5);
        assert!(r.le.probe_bonus);
        assert!(r.ae.is_none());
        assert!(r.ke.is_none());
    }

    #[test]
    fn spellcaster_rolls_ae_with_in_probe() {
        let c = mage(false);
        // LE die 2, KO probe 20 fails, AE die 5, IN probe 3 passes.
        let r = regenerate(
            &RegenerationRequest {
                character: &c,
                modifier: 0,
            },
            &mut ScriptedDice::new([2, 20, 5, 3]),
        );
        assert_eq!(r.le.total, 2);
        let ae = r.ae.unwrap();
        assert_eq!(ae.die, Some(5));
        assert_eq!(ae.total, 5 + 1 + 1);
    }

    #[test]
    fn master_regeneration_skips_the_die() {
        let c = mage(true);
        let mut dice = ScriptedDice::new([2, 20, 20]);
        let r = regenerate(
            &RegenerationRequest {
                character: &c,
                modifier: 0,
            },
            &mut dice,
        );
        let ae = r.ae.unwrap();
        assert_eq!(ae.die, None);
        assert_eq!(ae.base, 8);
        assert_eq!(ae.total, 9);
        assert_eq!(dice.rolls_used(), 3);
    }

    #[test]
    fn modifier_is_clamped_and_totals_floor_at_zero() {
        let c = Character::new("Alrik");
        let r = regenerate(
            &RegenerationRequest {
                character: &c,
                modifier: -20,
            },
            &mut ScriptedDice::new([1, 20]),
        );
        assert_eq!(r.le.total, 0);
        let r = regenerate(
            &RegenerationRequest {
                character: &c,
                modifier: 9,
            },
            &mut ScriptedDice::new([6, 20]),
        );
        assert_eq!(r.le.total, 8);
    }

    #[test]
    fn blessed_regains_ke_without_probe() {
        let mut c = Character::new("Geweihter");
        c.energies.ke_max = 24;
        c.energies.ke_regen_bonus = 2;
        let r = regenerate(
            &RegenerationRequest {
                character: &c,
                modifier: 0,
            },
            &mut ScriptedDice::new([3, 20, 4]),
        );
        let ke = r.ke.unwrap();
        assert_eq!(ke.total, 6);
        assert!(!ke.probe_bonus);
    }

    #[test]
    fn apply_caps_at_maximum() {
        let c = mage(false);
        let result = RegenerationResult {
            le: pool(6, Some(6), 0, true),
            ae: Some(pool(40, None, 0, false)),
            ke: None,
        };
        let after = apply_regeneration(&c.energies, &result);
        assert_eq!(after.le_current, 17);
        assert_eq!(after.ae_current, 40);
        assert_eq!(after.ke_current, 0);
        assert!(!after.has_master_regeneration);
    }
}
