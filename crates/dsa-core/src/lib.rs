//! Core data model for the DSA 4.1 character companion.
//!
//! This crate defines the entities every other crate works on: characters
//! with their attributes, skills and energy pools, the inventory graph of
//! locations and items, spell slots and magic signs, and the alchemy side
//! of recipes, potions and recipe knowledge. It performs no I/O; the store
//! and the rules engine live in their own crates.

/// Serialize an enum through its `as_str()` name and deserialize it through
/// `from_name()`, which never fails: enum values drift between app versions,
/// so an unknown name maps to the type's fallback variant.
macro_rules! serde_by_name {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok(<$ty>::from_name(&name))
            }
        }
    };
}

/// Alchemy: recipes, potions, qualities and recipe knowledge.
pub mod alchemy;
/// The eight primary attributes.
pub mod attribute;
/// Characters, skills, energy pools and groups.
pub mod character;
/// Error types used throughout the crate.
pub mod error;
/// Stable cross-device identifiers.
pub mod guid;
/// Locations, items, weights and currency.
pub mod inventory;
/// Spells, spell slots and magic signs.
pub mod magic;

/// Re-export alchemy types.
pub use alchemy::{KnowledgeLevel, Laboratory, Potion, PotionQuality, Recipe, RecipeKnowledge};
/// Re-export attribute types.
pub use attribute::{Attribute, Attributes};
/// Re-export character types.
pub use character::{Character, Energies, Group, Skills};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the identifier type.
pub use guid::Guid;
/// Re-export inventory types.
pub use inventory::{Currency, Item, Location, Weight};
/// Re-export magic types.
pub use magic::{MagicSign, SignDuration, SlotType, Spell, SpellSlot};

/// Device-local auto-increment row identifier. Never valid on another device.
pub type LocalId = i64;
