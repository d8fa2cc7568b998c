use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LocalId;
use crate::attribute::Attribute;

/// A spell from the seeded catalog. Catalogs are identical on every device,
/// but local ids are not, so spells are referenced across devices by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    /// Device-local row id.
    pub id: LocalId,
    /// Unique spell name.
    pub name: String,
    /// The three attributes tested by the spell probe.
    pub attributes: [Attribute; 3],
}

impl Spell {
    /// A new, not yet persisted catalog entry.
    pub fn new(name: impl Into<String>, attributes: [Attribute; 3]) -> Self {
        Self {
            id: 0,
            name: name.into(),
            attributes,
        }
    }
}

/// Kind of spell slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotType {
    /// A spell bound into an object via the Applicatus spell.
    #[default]
    Applicatus,
    /// A spell stored in a Zauberspeicher.
    SpellStorage,
    /// A long-duration binding.
    LongDuration,
}

impl SlotType {
    /// Stable name used in the store and in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applicatus => "APPLICATUS",
            Self::SpellStorage => "SPELL_STORAGE",
            Self::LongDuration => "LONG_DURATION",
        }
    }

    /// Parse a stored name. Unknown names fall back to `Applicatus`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "SPELL_STORAGE" => Self::SpellStorage,
            "LONG_DURATION" => Self::LongDuration,
            _ => Self::Applicatus,
        }
    }
}

serde_by_name!(SlotType);

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slot that can hold one prepared spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSlot {
    /// Device-local row id.
    pub id: LocalId,
    /// Owning character.
    pub character_id: LocalId,
    /// Position in the character's slot list.
    pub slot_number: i32,
    /// Kind of slot.
    pub slot_type: SlotType,
    /// Capacity in volume points (spell storage only).
    pub volume_points: i32,
    /// The stored spell, resolved to a local catalog id.
    pub spell_id: Option<LocalId>,
    /// Whether a spell is currently stored.
    pub is_filled: bool,
    /// ZfP* accumulated when the spell was stored.
    pub zfp_star: i32,
    /// Description of the carrier object.
    pub item_description: String,
    /// Human readable text of the last roll.
    pub last_roll_result: Option<String>,
}

impl SpellSlot {
    /// A new, empty, not yet persisted slot.
    pub fn new(character_id: LocalId, slot_number: i32, slot_type: SlotType) -> Self {
        Self {
            id: 0,
            character_id,
            slot_number,
            slot_type,
            volume_points: 0,
            spell_id: None,
            is_filled: false,
            zfp_star: 0,
            item_description: String::new(),
            last_roll_result: None,
        }
    }

    /// Copy holding `spell_id` with the given quality points.
    pub fn filled(self, spell_id: LocalId, zfp_star: i32, roll_text: String) -> Self {
        Self {
            spell_id: Some(spell_id),
            is_filled: true,
            zfp_star,
            last_roll_result: Some(roll_text),
            ..self
        }
    }

    /// Copy with the stored spell released. The spell reference is kept so
    /// the slot remembers what it last held.
    pub fn emptied(self) -> Self {
        Self {
            is_filled: false,
            zfp_star: 0,
            ..self
        }
    }
}

/// How long an activated magic sign stays effective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignDuration {
    /// Half the ritual knowledge value in days, rounded up.
    #[default]
    HalfRitualKnowledgeDays,
    /// A fixed 30-day window.
    Days30,
    /// A fixed 90-day window.
    Days90,
    /// Until the next summer solstice (1 Praios).
    UntilSummerSolstice,
}

impl SignDuration {
    /// Stable name used in the store and in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HalfRitualKnowledgeDays => "HALF_RKW_DAYS",
            Self::Days30 => "DAYS_30",
            Self::Days90 => "DAYS_90",
            Self::UntilSummerSolstice => "UNTIL_SUMMER_SOLSTICE",
        }
    }

    /// Parse a stored name. Unknown names fall back to the RkW-based duration.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "DAYS_30" => Self::Days30,
            "DAYS_90" => Self::Days90,
            "UNTIL_SUMMER_SOLSTICE" => Self::UntilSummerSolstice,
            _ => Self::HalfRitualKnowledgeDays,
        }
    }
}

serde_by_name!(SignDuration);

/// A magic sign (Zauberzeichen) painted onto an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicSign {
    /// Device-local row id.
    pub id: LocalId,
    /// Owning character.
    pub character_id: LocalId,
    /// The item carrying the sign.
    pub item_id: LocalId,
    /// Name of the sign.
    pub name: String,
    /// Free-text description of the effect.
    pub effect: String,
    /// How much easier the activation probe is.
    pub activation_modifier: i32,
    /// How long the sign lasts once activated.
    pub duration: SignDuration,
    /// Whether the sign has been activated.
    pub is_activated: bool,
    /// Whether a botched activation spoiled the sign.
    pub is_botched: bool,
    /// In-game expiry date once activated.
    pub expiry_date: Option<String>,
}

impl MagicSign {
    /// A new, inactive, not yet persisted sign.
    pub fn new(character_id: LocalId, item_id: LocalId, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            character_id,
            item_id,
            name: name.into(),
            effect: String::new(),
            activation_modifier: 0,
            duration: SignDuration::default(),
            is_activated: false,
            is_botched: false,
            expiry_date: None,
        }
    }
}
