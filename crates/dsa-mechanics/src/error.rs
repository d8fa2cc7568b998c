//! Error types for the rules engine.

use dsa_core::Laboratory;

/// Errors that can occur while applying a rule.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// The character does not have the talent or spell a rule needs.
    #[error("character lacks {0}")]
    MissingTalent(String),

    /// The chosen talent cannot be used in the chosen workshop.
    #[error("{talent} cannot be used in a {laboratory:?} workshop")]
    UnsupportedLaboratory {
        /// The brewing talent.
        talent: String,
        /// The workshop it was attempted in.
        laboratory: Laboratory,
    },

    /// The workshop is two or more steps below what the recipe requires.
    #[error("recipe requires {required:?}, {available:?} is too primitive")]
    LaboratoryTooPrimitive {
        /// Workshop the recipe requires.
        required: Laboratory,
        /// Workshop at hand.
        available: Laboratory,
    },

    /// A voluntary handicap of 1 or below zero.
    #[error("voluntary handicap must be 0 or at least 2, got {0}")]
    IllegalHandicap(i32),

    /// A voluntary handicap above the recipe's allowance.
    #[error("voluntary handicap {handicap} exceeds the maximum of {max}")]
    HandicapTooHigh {
        /// Requested handicap.
        handicap: i32,
        /// Largest handicap the recipe allows.
        max: i32,
    },

    /// Astral charging needs the astral mastery special ability.
    #[error("astral charging requires astral mastery")]
    AstralMasteryRequired,

    /// Not enough AE for the requested astral charge.
    #[error("astral charge needs {needed} AsP, only {available} available")]
    InsufficientAstralEnergy {
        /// AsP the charge costs.
        needed: i32,
        /// Current AsP.
        available: i32,
    },

    /// The terrain knowledge bonus is outside 3..=7.
    #[error("terrain knowledge bonus must be between 3 and 7, got {0}")]
    TerrainBonusOutOfRange(i32),

    /// The magic sign was spoiled by an earlier botch.
    #[error("magic sign '{0}' is spoiled")]
    SignSpoiled(String),

    /// The spell slot already holds a spell.
    #[error("spell slot {0} is already filled")]
    SlotAlreadyFilled(i32),

    /// The spell slot holds nothing to release.
    #[error("spell slot {0} is empty")]
    SlotEmpty(i32),

    /// A Derian date string could not be parsed.
    #[error("invalid date: \"{0}\"")]
    InvalidDate(String),
}

/// Convenience result type for rules operations.
pub type MechResult<T> = Result<T, MechError>;
