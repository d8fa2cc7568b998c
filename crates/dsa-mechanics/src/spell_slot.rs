//! Storing spells in slots and releasing them.
//!
//! An Applicatus slot first needs a successful Applicatus probe (KL/FF/FF)
//! to bind the spell to its carrier; other slot types go straight to the
//! spell probe. The slot's roll text records what happened either way.

use dsa_core::{Attribute, Character, SlotType, Spell, SpellSlot};
use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;
use crate::error::{MechError, MechResult};
use crate::probe::{ProbeRequest, ProbeResult, QualityLabel, perform_three_attribute_probe};

/// Attributes of the Applicatus spell.
pub const APPLICATUS_ATTRIBUTES: [Attribute; 3] = [Attribute::KL, Attribute::FF, Attribute::FF];

/// Inputs of a fill attempt.
#[derive(Debug, Clone)]
pub struct FillRequest<'a> {
    /// The caster.
    pub character: &'a Character,
    /// The slot to fill.
    pub slot: &'a SpellSlot,
    /// The spell to store.
    pub spell: &'a Spell,
    /// The caster's ZfW in that spell.
    pub spell_value: i32,
    /// Difficulty modifier of the spell probe.
    pub modifier: i32,
}

/// Outcome of a fill attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillResult {
    /// The Applicatus probe, for Applicatus slots.
    pub applicatus: Option<ProbeResult>,
    /// The spell probe, unless the Applicatus probe already failed.
    pub spell: Option<ProbeResult>,
    /// The slot after the attempt, ready to persist.
    pub slot: SpellSlot,
}

impl FillResult {
    /// Whether the spell is now stored.
    pub fn is_filled(&self) -> bool {
        self.slot.is_filled
    }
}

/// Attempt to store a spell in a slot.
pub fn fill_spell_slot(request: &FillRequest<'_>, dice: &mut impl DiceRoller) -> MechResult<FillResult> {
    let slot = request.slot;
    if slot.is_filled {
        return Err(MechError::SlotAlreadyFilled(slot.slot_number));
    }
    let character = request.character;
    let attrs = &character.attributes;

    let applicatus = if slot.slot_type == SlotType::Applicatus {
        if !character.skills.has_applicatus {
            return Err(MechError::MissingTalent("Applicatus".into()));
        }
        let probe = perform_three_attribute_probe(
            &ProbeRequest::new(character.skills.applicatus, 0, attrs.triple(APPLICATUS_ATTRIBUTES))
                .with_label(QualityLabel::ZfP),
            dice,
        );
        if !probe.success {
            return Ok(FillResult {
                slot: SpellSlot {
                    last_roll_result: Some(format!("Applicatus: {probe}")),
                    ..slot.clone()
                },
                applicatus: Some(probe),
                spell: None,
            });
        }
        Some(probe)
    } else {
        None
    };

    let probe = perform_three_attribute_probe(
        &ProbeRequest::new(
            request.spell_value,
            request.modifier,
            attrs.triple(request.spell.attributes),
        )
        .with_label(QualityLabel::ZfP),
        dice,
    );
    let text = match &applicatus {
        Some(a) => format!("Applicatus: {a} | {}: {probe}", request.spell.name),
        None => format!("{}: {probe}", request.spell.name),
    };
    let updated = if probe.success {
        slot.clone()
            .filled(request.spell.id, probe.quality_points, text)
    } else {
        SpellSlot {
            last_roll_result: Some(text),
            ..slot.clone()
        }
    };

    Ok(FillResult {
        applicatus,
        spell: Some(probe),
        slot: updated,
    })
}

/// Release the stored spell, emptying the slot.
pub fn release_spell(slot: &SpellSlot) -> MechResult<SpellSlot> {
    if !slot.is_filled {
        return Err(MechError::SlotEmpty(slot.slot_number));
    }
    Ok(slot.clone().emptied())
}

#[cfg(test)]
mod tests {
    use dsa_core::{Attributes, Skills};

    use super::*;
    use crate::dice::ScriptedDice;

    fn caster() -> Character {
        Character::new("Hesindiane")
            .with_attributes(Attributes::uniform(13))
            .with_skills(Skills {
                applicatus: 8,
                has_applicatus: true,
                ..Skills::default()
            })
    }

    fn ignifaxius() -> Spell {
        let mut spell = Spell::new(
            "Ignifaxius",
            [Attribute::KL, Attribute::FF, Attribute::KO],
        );
        spell.id = 12;
        spell
    }

    #[test]
    fn storage_slot_skips_applicatus() {
        let c = caster();
        let slot = SpellSlot::new(c.id, 1, SlotType::SpellStorage);
        let spell = ignifaxius();
        let r = fill_spell_slot(
            &FillRequest {
                character: &c,
                slot: &slot,
                spell: &spell,
                spell_value: 7,
                modifier: 0,
            },
            &mut ScriptedDice::new([4, 4, 4]),
        )
        .unwrap();
        assert!(r.applicatus.is_none());
        assert!(r.is_filled());
        assert_eq!(r.slot.zfp_star, 7);
        assert_eq!(r.slot.spell_id, Some(12));
        insta::assert_snapshot!(
            r.slot.last_roll_result.unwrap_or_default(),
            @"Ignifaxius: [4, 4, 4] gelungen, 7 ZfP*"
        );
    }

    #[test]
    fn failed_applicatus_stops_before_spell_probe() {
        let c = caster();
        let slot = SpellSlot::new(c.id, 1, SlotType::Applicatus);
        let spell = ignifaxius();
        let mut dice = ScriptedDice::new([18, 18, 18]);
        let r = fill_spell_slot(
            &FillRequest {
                character: &c,
                slot: &slot,
                spell: &spell,
                spell_value: 7,
                modifier: 0,
            },
            &mut dice,
        )
        .unwrap();
        assert!(!r.is_filled());
        assert!(r.spell.is_none());
        assert_eq!(dice.rolls_used(), 3);
        assert!(r.slot.last_roll_result.unwrap_or_default().starts_with("Applicatus:"));
    }

    #[test]
    fn applicatus_then_spell() {
        let c = caster();
        let slot = SpellSlot::new(c.id, 2, SlotType::Applicatus);
        let spell = ignifaxius();
        let r = fill_spell_slot(
            &FillRequest {
                character: &c,
                slot: &slot,
                spell: &spell,
                spell_value: 7,
                modifier: 3,
            },
            &mut ScriptedDice::new([5, 5, 5, 14, 5, 5]),
        )
        .unwrap();
        assert!(r.applicatus.as_ref().is_some_and(|p| p.success));
        assert!(r.is_filled());
        assert_eq!(r.slot.zfp_star, 3);
    }

    #[test]
    fn applicatus_slot_requires_the_spell() {
        let c = Character::new("Alrik");
        let slot = SpellSlot::new(c.id, 1, SlotType::Applicatus);
        let spell = ignifaxius();
        let r = fill_spell_slot(
            &FillRequest {
                character: &c,
                slot: &slot,
                spell: &spell,
                spell_value: 7,
                modifier: 0,
            },
            &mut ScriptedDice::new([1]),
        );
        assert!(matches!(r, Err(MechError::MissingTalent(_))));
    }

    #[test]
    fn filled_slot_cannot_be_refilled_and_release_empties() {
        let slot = SpellSlot::new(1, 1, SlotType::LongDuration).filled(12, 5, "x".into());
        let c = caster();
        let spell = ignifaxius();
        let r = fill_spell_slot(
            &FillRequest {
                character: &c,
                slot: &slot,
                spell: &spell,
                spell_value: 7,
                modifier: 0,
            },
            &mut ScriptedDice::new([1]),
        );
        assert!(matches!(r, Err(MechError::SlotAlreadyFilled(1))));

        let released = release_spell(&slot).unwrap();
        assert!(!released.is_filled);
        assert!(matches!(release_spell(&released), Err(MechError::SlotEmpty(1))));
    }
}
