//! Herb search (Kräutersuche).

use std::fmt;

use dsa_core::{Attribute, Character};
use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;
use crate::error::{MechError, MechResult};
use crate::probe::{ProbeRequest, ProbeResult, perform_three_attribute_probe};

/// Attributes probed during a herb search.
pub const SEARCH_ATTRIBUTES: [Attribute; 3] = [Attribute::MU, Attribute::IN, Attribute::FF];

/// How common a herb is in the searched region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    /// Sehr häufig.
    VeryCommon,
    /// Häufig.
    Common,
    /// Gelegentlich.
    Occasional,
    /// Selten.
    Rare,
    /// Sehr selten.
    VeryRare,
}

impl Rarity {
    /// Difficulty added by the rarity.
    pub fn modifier(self) -> i32 {
        match self {
            Self::VeryCommon => 1,
            Self::Common => 2,
            Self::Occasional => 4,
            Self::Rare => 8,
            Self::VeryRare => 16,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryCommon => write!(f, "sehr häufig"),
            Self::Common => write!(f, "häufig"),
            Self::Occasional => write!(f, "gelegentlich"),
            Self::Rare => write!(f, "selten"),
            Self::VeryRare => write!(f, "sehr selten"),
        }
    }
}

/// A herb as it occurs in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Herb {
    /// Name.
    pub name: String,
    /// Bestimmungsschwierigkeit.
    pub identification_difficulty: i32,
    /// Occurrence in the region.
    pub rarity: Rarity,
}

/// Inputs of a herb search.
#[derive(Debug, Clone)]
pub struct HerbSearchRequest<'a> {
    /// The searcher.
    pub character: &'a Character,
    /// What is being searched for.
    pub herb: &'a Herb,
    /// Geländekunde bonus for the terrain, 3 to 7 if the searcher has it.
    pub terrain_knowledge: Option<i32>,
    /// Whether the searcher spends double the time.
    pub doubled_search_time: bool,
    /// Situational difficulty modifier.
    pub modifier: i32,
}

/// Outcome of a herb search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerbSearchResult {
    /// The derived search talent value.
    pub talent_value: i32,
    /// Net difficulty probed against.
    pub difficulty: i32,
    /// The underlying probe.
    pub probe: ProbeResult,
}

impl HerbSearchResult {
    /// Whether the herb was found.
    pub fn found(&self) -> bool {
        self.probe.success
    }
}

/// Search talent value: the rounded average of sensory acuity, wilderness
/// survival and herbal lore, capped at twice the smallest of the three.
pub fn search_talent_value(sensory_acuity: i32, wilderness_survival: i32, herbal_lore: i32) -> i32 {
    let sum = sensory_acuity + wilderness_survival + herbal_lore;
    let average = (sum + 1).div_euclid(3);
    let smallest = sensory_acuity.min(wilderness_survival).min(herbal_lore);
    average.min(2 * smallest)
}

/// Net search difficulty.
pub fn search_difficulty(
    herb: &Herb,
    terrain_knowledge: Option<i32>,
    doubled_search_time: bool,
    modifier: i32,
) -> MechResult<i32> {
    let terrain = match terrain_knowledge {
        None => 0,
        Some(bonus @ 3..=7) => bonus,
        Some(bonus) => return Err(MechError::TerrainBonusOutOfRange(bonus)),
    };
    let time = if doubled_search_time { 2 } else { 0 };
    Ok(herb.identification_difficulty + herb.rarity.modifier() - terrain - time + modifier)
}

/// Search for a herb.
pub fn perform_herb_search(
    request: &HerbSearchRequest<'_>,
    dice: &mut impl DiceRoller,
) -> MechResult<HerbSearchResult> {
    let skills = &request.character.skills;
    let talent_value = search_talent_value(
        skills.sensory_acuity,
        skills.wilderness_survival,
        skills.herbal_lore,
    );
    let difficulty = search_difficulty(
        request.herb,
        request.terrain_knowledge,
        request.doubled_search_time,
        request.modifier,
    )?;
    let probe = perform_three_attribute_probe(
        &ProbeRequest::new(
            talent_value,
            difficulty,
            request.character.attributes.triple(SEARCH_ATTRIBUTES),
        ),
        dice,
    );
    Ok(HerbSearchResult {
        talent_value,
        difficulty,
        probe,
    })
}
