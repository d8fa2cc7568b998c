use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LocalId;
use crate::guid::Guid;

/// Workshop quality, ordered from least to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Laboratory {
    /// Archaisches Labor: campfire and a few vessels.
    #[default]
    Archaic,
    /// Hexenküche.
    WitchKitchen,
    /// Full alchemical laboratory.
    Laboratory,
}

impl Laboratory {
    /// Stable name used in the store and in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Archaic => "ARCHAIC",
            Self::WitchKitchen => "WITCH_KITCHEN",
            Self::Laboratory => "LABORATORY",
        }
    }

    /// Parse a stored name. Unknown names fall back to `Archaic`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "WITCH_KITCHEN" => Self::WitchKitchen,
            "LABORATORY" => Self::Laboratory,
            _ => Self::Archaic,
        }
    }

    /// Capability rank, 0 for the archaic lab.
    pub fn rank(self) -> i32 {
        match self {
            Self::Archaic => 0,
            Self::WitchKitchen => 1,
            Self::Laboratory => 2,
        }
    }
}

serde_by_name!(Laboratory);

/// Actual potion quality. `M` marks a failed brew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PotionQuality {
    /// Quality A (weakest working potion).
    A,
    /// Quality B.
    B,
    /// Quality C.
    C,
    /// Quality D.
    D,
    /// Quality E.
    E,
    /// Quality F (best).
    F,
    /// Failed brew.
    M,
}

impl PotionQuality {
    /// Stable name used in the store and in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::M => "M",
        }
    }

    /// Parse a stored name. Unknown names fall back to `M`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            "D" => Self::D,
            "E" => Self::E,
            "F" => Self::F,
            _ => Self::M,
        }
    }
}

serde_by_name!(PotionQuality);

impl fmt::Display for PotionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How well a character knows a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum KnowledgeLevel {
    /// Nothing known.
    #[default]
    Unknown,
    /// The general nature of the recipe is known.
    Rough,
    /// The recipe is fully understood and can be brewed.
    Understood,
}

impl KnowledgeLevel {
    /// Stable name used in the store and in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Rough => "ROUGH",
            Self::Understood => "UNDERSTOOD",
        }
    }

    /// Parse a stored name. Unknown names fall back to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "ROUGH" => Self::Rough,
            "UNDERSTOOD" => Self::Understood,
            _ => Self::Unknown,
        }
    }
}

serde_by_name!(KnowledgeLevel);

/// An alchemical recipe from the seeded catalog, referenced across devices
/// by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Device-local row id.
    pub id: LocalId,
    /// Unique recipe name.
    pub name: String,
    /// Brauschwierigkeit.
    pub brewing_difficulty: i32,
    /// Analyseschwierigkeit.
    pub analysis_difficulty: i32,
    /// Minimum workshop needed to brew it.
    pub laboratory: Laboratory,
    /// Shelf life as printed in the recipe (e.g. "1 Jahr").
    pub shelf_life: String,
}

impl Recipe {
    /// A new, not yet persisted catalog entry.
    pub fn new(name: impl Into<String>, brewing_difficulty: i32, analysis_difficulty: i32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            brewing_difficulty,
            analysis_difficulty,
            laboratory: Laboratory::Archaic,
            shelf_life: String::new(),
        }
    }
}

/// A brewed potion owned by a character.
///
/// The actual quality is hidden from the player; the analysis fields hold
/// what the player has found out so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potion {
    /// Device-local row id.
    pub id: LocalId,
    /// Stable identity so that deletions propagate through sync.
    pub guid: Guid,
    /// Owning character.
    pub character_id: LocalId,
    /// The recipe, resolved to a local catalog id.
    pub recipe_id: Option<LocalId>,
    /// True quality, hidden from the player.
    pub actual_quality: PotionQuality,
    /// Appearance description.
    pub appearance: String,
    /// In-game expiry date.
    pub expiry_date: String,
    /// Number of analysis attempts made so far.
    pub analysis_attempts: i32,
    /// Best analysis result in quality points.
    pub best_analysis_points: i32,
    /// Whether the shelf life has been revealed.
    pub shelf_life_known: bool,
    /// The revealed exact quality, if any.
    pub known_quality: Option<PotionQuality>,
    /// Whether the full recipe has been revealed.
    pub recipe_revealed: bool,
}

impl Potion {
    /// A new, unanalysed, not yet persisted potion.
    pub fn new(character_id: LocalId, recipe_id: Option<LocalId>, quality: PotionQuality) -> Self {
        Self {
            id: 0,
            guid: Guid::new(),
            character_id,
            recipe_id,
            actual_quality: quality,
            appearance: String::new(),
            expiry_date: String::new(),
            analysis_attempts: 0,
            best_analysis_points: 0,
            shelf_life_known: false,
            known_quality: None,
            recipe_revealed: false,
        }
    }

    /// Whether a later sync must rewrite this row: true if any content field
    /// differs. Local ids are ignored.
    pub fn content_differs(&self, other: &Potion) -> bool {
        let normalize = |p: &Potion| Potion {
            id: 0,
            character_id: 0,
            ..p.clone()
        };
        normalize(self) != normalize(other)
    }
}

/// A character's knowledge of one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeKnowledge {
    /// Device-local row id.
    pub id: LocalId,
    /// Owning character.
    pub character_id: LocalId,
    /// The recipe, resolved to a local catalog id.
    pub recipe_id: LocalId,
    /// Knowledge level.
    pub level: KnowledgeLevel,
}
