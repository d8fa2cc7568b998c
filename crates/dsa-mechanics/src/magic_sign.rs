//! Magic sign (Zauberzeichen) activation.
//!
//! Activation is a ritual knowledge probe on KL/IN/FF. The sign's activation
//! modifier makes the probe easier. A botch spoils the sign for good; a
//! success activates it until an expiry date computed from its duration.

use dsa_core::{Attribute, Character, MagicSign, SignDuration};
use serde::{Deserialize, Serialize};

use crate::calendar::{DerianDate, DerianMonth};
use crate::dice::DiceRoller;
use crate::error::{MechError, MechResult};
use crate::probe::{ProbeRequest, ProbeResult, QualityLabel, perform_three_attribute_probe};

/// Attributes probed when activating a sign.
pub const SIGN_ATTRIBUTES: [Attribute; 3] = [Attribute::KL, Attribute::IN, Attribute::FF];

/// Inputs of an activation attempt.
#[derive(Debug, Clone)]
pub struct ActivationRequest<'a> {
    /// The activating character.
    pub character: &'a Character,
    /// The sign to activate.
    pub sign: &'a MagicSign,
    /// Current in-game date.
    pub today: DerianDate,
    /// Situational difficulty modifier.
    pub modifier: i32,
}

/// Outcome of an activation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResult {
    /// The underlying probe.
    pub probe: ProbeResult,
    /// Net difficulty probed against.
    pub difficulty: i32,
    /// The sign after the attempt, ready to persist.
    pub sign: MagicSign,
}

/// Expiry date of a sign activated on `today`.
pub fn expiry_date(today: DerianDate, duration: SignDuration, ritual_knowledge: i32) -> DerianDate {
    match duration {
        SignDuration::HalfRitualKnowledgeDays => {
            today.add_days(i64::from((ritual_knowledge.max(0) + 1) / 2))
        }
        SignDuration::Days30 => today.add_days(30),
        SignDuration::Days90 => today.add_days(90),
        SignDuration::UntilSummerSolstice => today.next_occurrence(1, DerianMonth::Praios),
    }
}

/// Attempt to activate a sign.
pub fn activate_magic_sign(
    request: &ActivationRequest<'_>,
    dice: &mut impl DiceRoller,
) -> MechResult<ActivationResult> {
    let skills = &request.character.skills;
    if !skills.has_ritual_knowledge {
        return Err(MechError::MissingTalent("Ritualkenntnis".into()));
    }
    let sign = request.sign;
    if sign.is_botched {
        return Err(MechError::SignSpoiled(sign.name.clone()));
    }

    let difficulty = request.modifier - sign.activation_modifier;
    let probe = perform_three_attribute_probe(
        &ProbeRequest::new(
            skills.ritual_knowledge,
            difficulty,
            request.character.attributes.triple(SIGN_ATTRIBUTES),
        )
        .with_label(QualityLabel::RkP),
        dice,
    );

    let updated = if probe.is_botch() {
        MagicSign {
            is_activated: false,
            is_botched: true,
            expiry_date: None,
            ..sign.clone()
        }
    } else if probe.success {
        let expiry = expiry_date(request.today, sign.duration, skills.ritual_knowledge);
        MagicSign {
            is_activated: true,
            expiry_date: Some(expiry.to_string()),
            ..sign.clone()
        }
    } else {
        sign.clone()
    };

    Ok(ActivationResult {
        probe,
        difficulty,
        sign: updated,
    })
}
