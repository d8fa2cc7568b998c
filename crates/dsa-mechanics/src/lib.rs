//! DSA 4.1 rules engine.
//!
//! Everything in here is a pure function of its inputs and an injected
//! [`DiceRoller`], so every rule can be replayed with fixed dice. The
//! three-attribute probe in [`probe`] underlies every skill, spell, brewing
//! and analysis check; the domain calculators compose it with their own
//! modifiers and result interpretation.

pub mod analysis;
pub mod brewing;
pub mod calendar;
pub mod dice;
pub mod error;
pub mod herb_search;
pub mod magic_sign;
pub mod probe;
pub mod regeneration;
pub mod spell_slot;

pub use analysis::{AnalysisFindings, AnalysisMethod, AnalysisRequest, AnalysisResult, analyze_potion};
pub use brewing::{BrewingRequest, BrewingResult, BrewingTalent, brew_potion};
pub use calendar::{DerianDate, DerianMonth};
pub use dice::{DiceRoller, Die, FnDice, RandomDice, ScriptedDice};
pub use error::{MechError, MechResult};
pub use herb_search::{Herb, HerbSearchRequest, HerbSearchResult, Rarity, perform_herb_search};
pub use magic_sign::{ActivationRequest, ActivationResult, activate_magic_sign};
pub use probe::{
    ProbeRequest, ProbeResult, QualityLabel, SingleProbeResult, SpecialRoll, evaluate_probe,
    perform_three_attribute_probe, probe_single_attribute,
};
pub use regeneration::{RegenerationRequest, RegenerationResult, regenerate};
pub use spell_slot::{FillRequest, FillResult, fill_spell_slot, release_spell};
