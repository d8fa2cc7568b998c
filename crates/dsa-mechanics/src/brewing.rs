//! Potion brewing.
//!
//! A brew is a talent probe (Alchimie or Kochen (Tränke)) against the
//! recipe's brewing difficulty, adjusted for the workshop, a voluntary
//! handicap and ingredient substitutions. On success the quality points are
//! topped up with 2W6, twice the handicap and the astral charge, and the
//! total selects the quality tier. A failed brew always yields quality M.

use std::fmt;

use dsa_core::{Attribute, Character, Laboratory, LocalId, Potion, PotionQuality, Recipe};
use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;
use crate::error::{MechError, MechResult};
use crate::probe::{ProbeRequest, ProbeResult, perform_three_attribute_probe};

/// Talent used to brew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrewingTalent {
    /// Alchimie (MU/KL/FF).
    Alchemy,
    /// Kochen (Tränke) (KL/IN/FF).
    CookingPotions,
}

impl BrewingTalent {
    /// The attribute triple probed.
    pub fn attributes(self) -> [Attribute; 3] {
        match self {
            Self::Alchemy => [Attribute::MU, Attribute::KL, Attribute::FF],
            Self::CookingPotions => [Attribute::KL, Attribute::IN, Attribute::FF],
        }
    }

    /// The character's talent value, `None` if they lack the talent.
    pub fn skill_value(self, character: &Character) -> Option<i32> {
        let skills = &character.skills;
        match self {
            Self::Alchemy => skills.has_alchemy.then_some(skills.alchemy),
            Self::CookingPotions => skills.has_cooking_potions.then_some(skills.cooking_potions),
        }
    }

    /// Whether the talent can be practised in `laboratory`.
    pub fn supports(self, laboratory: Laboratory) -> bool {
        matches!(
            (self, laboratory),
            (_, Laboratory::Archaic)
                | (Self::Alchemy, Laboratory::Laboratory)
                | (Self::CookingPotions, Laboratory::WitchKitchen)
        )
    }
}

impl fmt::Display for BrewingTalent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alchemy => write!(f, "Alchimie"),
            Self::CookingPotions => write!(f, "Kochen (Tränke)"),
        }
    }
}

/// Inputs of a brewing attempt.
#[derive(Debug, Clone)]
pub struct BrewingRequest<'a> {
    /// The brewer.
    pub character: &'a Character,
    /// What is being brewed.
    pub recipe: &'a Recipe,
    /// Talent used.
    pub talent: BrewingTalent,
    /// Workshop at hand.
    pub laboratory: Laboratory,
    /// Voluntary handicap: 0 or at least 2.
    pub voluntary_handicap: i32,
    /// Quality points bought with AsP (requires astral mastery).
    pub astral_charge: u32,
    /// Difficulty change from substituted ingredients.
    pub substitution_modifier: i32,
}

impl<'a> BrewingRequest<'a> {
    /// A plain brew with alchemy in the recipe's own workshop.
    pub fn new(character: &'a Character, recipe: &'a Recipe) -> Self {
        Self {
            character,
            recipe,
            talent: BrewingTalent::Alchemy,
            laboratory: recipe.laboratory,
            voluntary_handicap: 0,
            astral_charge: 0,
            substitution_modifier: 0,
        }
    }

    /// Set the talent.
    pub fn with_talent(mut self, talent: BrewingTalent) -> Self {
        self.talent = talent;
        self
    }

    /// Set the workshop.
    pub fn with_laboratory(mut self, laboratory: Laboratory) -> Self {
        self.laboratory = laboratory;
        self
    }

    /// Set the voluntary handicap.
    pub fn with_handicap(mut self, handicap: i32) -> Self {
        self.voluntary_handicap = handicap;
        self
    }

    /// Set the astral charge.
    pub fn with_astral_charge(mut self, points: u32) -> Self {
        self.astral_charge = points;
        self
    }

    /// Set the substitution modifier.
    pub fn with_substitution(mut self, modifier: i32) -> Self {
        self.substitution_modifier = modifier;
        self
    }
}

/// Outcome of a brewing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewingResult {
    /// The underlying talent probe.
    pub probe: ProbeResult,
    /// Net difficulty probed against.
    pub difficulty: i32,
    /// The 2W6 bonus roll, only rolled on success.
    pub bonus_dice: Option<[u32; 2]>,
    /// Total quality points after all bonuses; 0 on failure.
    pub total_points: i32,
    /// Resulting quality.
    pub quality: PotionQuality,
    /// AsP spent on the astral charge.
    pub astral_cost: i32,
}

impl BrewingResult {
    /// The brewed potion, ready to insert for `character_id`.
    pub fn to_potion(&self, character_id: LocalId, recipe_id: Option<LocalId>) -> Potion {
        Potion::new(character_id, recipe_id, self.quality)
    }
}

/// Largest legal voluntary handicap: `ceil(1.5 × brewing difficulty)`.
pub fn max_voluntary_handicap(brewing_difficulty: i32) -> i32 {
    if brewing_difficulty <= 0 {
        0
    } else {
        (3 * brewing_difficulty + 1) / 2
    }
}

/// Check a voluntary handicap against the recipe.
pub fn validate_handicap(handicap: i32, brewing_difficulty: i32) -> MechResult<()> {
    if handicap < 0 || handicap == 1 {
        return Err(MechError::IllegalHandicap(handicap));
    }
    let max = max_voluntary_handicap(brewing_difficulty);
    if handicap > max {
        return Err(MechError::HandicapTooHigh { handicap, max });
    }
    Ok(())
}

/// AsP cost of an astral charge of `points`: `2^(points-1)`, 0 for none.
pub fn astral_charge_cost(points: u32) -> i32 {
    match points {
        0 => 0,
        n => 2i32.checked_pow(n - 1).unwrap_or(i32::MAX),
    }
}

/// Difficulty change for brewing a recipe that needs `required` in
/// `available`. One step short costs +7, a better workshop eases by 3.
pub fn laboratory_modifier(required: Laboratory, available: Laboratory) -> MechResult<i32> {
    match available.rank() - required.rank() {
        0 => Ok(0),
        -1 => Ok(7),
        d if d > 0 => Ok(-3),
        _ => Err(MechError::LaboratoryTooPrimitive {
            required,
            available,
        }),
    }
}

/// Map total quality points to a potion quality.
pub fn quality_for_points(points: i32) -> PotionQuality {
    match points {
        ..=6 => PotionQuality::A,
        7..=12 => PotionQuality::B,
        13..=18 => PotionQuality::C,
        19..=24 => PotionQuality::D,
        25..=30 => PotionQuality::E,
        _ => PotionQuality::F,
    }
}

/// Brew a potion.
pub fn brew_potion(
    request: &BrewingRequest<'_>,
    dice: &mut impl DiceRoller,
) -> MechResult<BrewingResult> {
    let character = request.character;
    let talent = request.talent;
    let skill = talent
        .skill_value(character)
        .ok_or_else(|| MechError::MissingTalent(talent.to_string()))?;
    if !talent.supports(request.laboratory) {
        return Err(MechError::UnsupportedLaboratory {
            talent: talent.to_string(),
            laboratory: request.laboratory,
        });
    }
    let lab_modifier = laboratory_modifier(request.recipe.laboratory, request.laboratory)?;
    validate_handicap(request.voluntary_handicap, request.recipe.brewing_difficulty)?;

    let astral_cost = astral_charge_cost(request.astral_charge);
    if request.astral_charge > 0 {
        if !character.energies.has_astral_mastery {
            return Err(MechError::AstralMasteryRequired);
        }
        if astral_cost > character.energies.ae_current {
            return Err(MechError::InsufficientAstralEnergy {
                needed: astral_cost,
                available: character.energies.ae_current,
            });
        }
    }

    let difficulty = request.recipe.brewing_difficulty
        + lab_modifier
        + request.voluntary_handicap
        + request.substitution_modifier;
    let probe = perform_three_attribute_probe(
        &ProbeRequest::new(
            skill,
            difficulty,
            character.attributes.triple(talent.attributes()),
        ),
        dice,
    );

    if !probe.success {
        return Ok(BrewingResult {
            probe,
            difficulty,
            bonus_dice: None,
            total_points: 0,
            quality: PotionQuality::M,
            astral_cost,
        });
    }

    let bonus = [dice.d6(), dice.d6()];
    let total_points = probe.quality_points
        + (bonus[0] + bonus[1]) as i32
        + 2 * request.voluntary_handicap
        + request.astral_charge as i32;
    Ok(BrewingResult {
        probe,
        difficulty,
        bonus_dice: Some(bonus),
        total_points,
        quality: quality_for_points(total_points),
        astral_cost,
    })
}
