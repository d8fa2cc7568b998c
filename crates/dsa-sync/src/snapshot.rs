//! The portable character snapshot.
//!
//! A snapshot carries one character and everything it owns. Cross-device
//! references use natural keys only: spells and recipes by name, locations
//! by name, potions by GUID, self-items by flag plus owning location name.
//! Local row ids never appear in the document. Unknown fields are ignored
//! on decode so older builds can read documents written by newer ones of
//! the same version.

use dsa_core::{
    Attributes, Energies, Guid, KnowledgeLevel, PotionQuality, SignDuration, Skills, SlotType,
    Weight,
};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Schema version written by this build.
pub const SNAPSHOT_VERSION: u32 = 2;

/// A version-tagged character snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    /// Schema version.
    pub version: u32,
    /// The character's identity and content fields.
    pub character: CharacterData,
    /// Name of the character's group, if any.
    #[serde(default)]
    pub group_name: Option<String>,
    /// Spell slots.
    #[serde(default)]
    pub spell_slots: Vec<SpellSlotData>,
    /// Potions.
    #[serde(default)]
    pub potions: Vec<PotionData>,
    /// Recipe knowledge.
    #[serde(default)]
    pub recipe_knowledge: Vec<RecipeKnowledgeData>,
    /// Locations.
    #[serde(default)]
    pub locations: Vec<LocationData>,
    /// Items, self-items included.
    #[serde(default)]
    pub items: Vec<ItemData>,
    /// Magic signs.
    #[serde(default)]
    pub magic_signs: Vec<MagicSignData>,
    /// Epoch millis of the export; becomes `lastModifiedDate` on import.
    pub export_timestamp: i64,
}

/// Character identity and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    /// Stable identity.
    pub guid: Guid,
    /// Display name.
    pub name: String,
    /// Primary attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Learned skills.
    #[serde(default)]
    pub skills: Skills,
    /// Energy pools.
    #[serde(default)]
    pub energies: Energies,
}

/// A location, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    /// Name, unique per character.
    pub name: String,
    /// Default location flag.
    #[serde(default)]
    pub is_default: bool,
    /// Carried flag.
    #[serde(default = "default_true")]
    pub is_carried: bool,
    /// Display order.
    #[serde(default)]
    pub sort_order: i32,
}

/// An item. Its location and, for self-items, its owning location are
/// referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    /// Display name.
    pub name: String,
    /// Name of the containing location.
    #[serde(default)]
    pub location_name: Option<String>,
    /// Weight of one unit.
    #[serde(default)]
    pub weight: Weight,
    /// Purse flag.
    #[serde(default)]
    pub is_purse: bool,
    /// Money in kreuzer.
    #[serde(default)]
    pub kreuzer: i64,
    /// Countable flag.
    #[serde(default)]
    pub is_countable: bool,
    /// Stack size.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Self-item flag.
    #[serde(default)]
    pub is_self_item: bool,
    /// Name of the location this self-item stands for.
    #[serde(default)]
    pub self_item_for_location_name: Option<String>,
    /// Display order.
    #[serde(default)]
    pub sort_order: i32,
}

/// A spell slot; the stored spell is referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellSlotData {
    /// Position in the slot list.
    pub slot_number: i32,
    /// Slot kind; unknown kinds decode as Applicatus.
    #[serde(default)]
    pub slot_type: SlotType,
    /// Capacity in volume points.
    #[serde(default)]
    pub volume_points: i32,
    /// Name of the stored spell.
    #[serde(default)]
    pub spell_name: Option<String>,
    /// Fill state.
    #[serde(default)]
    pub is_filled: bool,
    /// Accumulated ZfP*.
    #[serde(default)]
    pub zfp_star: i32,
    /// Carrier description.
    #[serde(default)]
    pub item_description: String,
    /// Text of the last roll.
    #[serde(default)]
    pub last_roll_result: Option<String>,
}

/// A potion, keyed by GUID; the recipe is referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotionData {
    /// Stable identity.
    pub guid: Guid,
    /// Name of the recipe.
    #[serde(default)]
    pub recipe_name: Option<String>,
    /// Hidden true quality; unknown values decode as M.
    pub actual_quality: PotionQuality,
    /// Appearance.
    #[serde(default)]
    pub appearance: String,
    /// In-game expiry date.
    #[serde(default)]
    pub expiry_date: String,
    /// Analysis attempts so far.
    #[serde(default)]
    pub analysis_attempts: i32,
    /// Best analysis result.
    #[serde(default)]
    pub best_analysis_points: i32,
    /// Shelf life revealed.
    #[serde(default)]
    pub shelf_life_known: bool,
    /// Revealed quality.
    #[serde(default)]
    pub known_quality: Option<PotionQuality>,
    /// Recipe revealed.
    #[serde(default)]
    pub recipe_revealed: bool,
}

/// Knowledge of one recipe, referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeKnowledgeData {
    /// Name of the recipe.
    pub recipe_name: String,
    /// Knowledge level; unknown values decode as UNKNOWN.
    #[serde(default)]
    pub level: KnowledgeLevel,
}

/// A magic sign; its item is referenced by location name plus item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicSignData {
    /// Name of the carrying item.
    pub item_name: String,
    /// Name of the carrying item's location.
    #[serde(default)]
    pub item_location_name: Option<String>,
    /// Name of the sign.
    pub name: String,
    /// Effect description.
    #[serde(default)]
    pub effect: String,
    /// Activation modifier.
    #[serde(default)]
    pub activation_modifier: i32,
    /// Duration kind.
    #[serde(default)]
    pub duration: SignDuration,
    /// Activated flag.
    #[serde(default)]
    pub is_activated: bool,
    /// Botched flag.
    #[serde(default)]
    pub is_botched: bool,
    /// Expiry date once activated.
    #[serde(default)]
    pub expiry_date: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> i32 {
    1
}

impl CharacterSnapshot {
    /// Decode a snapshot, rejecting documents from a newer schema.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Reject documents written by a newer schema.
    pub fn check_version(&self) -> SyncResult<()> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SyncError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> SyncResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "version": 1,
        "character": {
            "guid": "6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11",
            "name": "Alrik",
            "mood": "grumpy"
        },
        "items": [
            { "name": "Seil", "locationName": "Rucksack", "colour": "brown" }
        ],
        "spellSlots": [
            { "slotNumber": 1, "slotType": "WAND_OF_WONDERS" }
        ],
        "exportTimestamp": 1700000000000,
        "somethingFromTheFuture": [1, 2, 3]
    }"#;

    #[test]
    fn unknown_fields_are_ignored() {
        let s = CharacterSnapshot::from_json(MINIMAL).unwrap();
        assert_eq!(s.character.name, "Alrik");
        assert_eq!(s.items[0].location_name.as_deref(), Some("Rucksack"));
        assert_eq!(s.items[0].quantity, 1);
        assert_eq!(s.export_timestamp, 1_700_000_000_000);
        assert!(s.locations.is_empty());
    }

    #[test]
    fn unknown_slot_type_falls_back() {
        let s = CharacterSnapshot::from_json(MINIMAL).unwrap();
        assert_eq!(s.spell_slots[0].slot_type, SlotType::Applicatus);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(
            CharacterSnapshot::from_json("{ not json"),
            Err(SyncError::Decode(_))
        ));
        assert!(matches!(
            CharacterSnapshot::from_json(r#"{"version": 2}"#),
            Err(SyncError::Decode(_))
        ));
    }

    #[test]
    fn bad_guid_is_a_decode_error() {
        let json = MINIMAL.replace("6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11", "nope");
        assert!(matches!(
            CharacterSnapshot::from_json(&json),
            Err(SyncError::Decode(_))
        ));
    }

    #[test]
    fn newer_versions_are_rejected() {
        let json = MINIMAL.replace("\"version\": 1", "\"version\": 99");
        assert!(matches!(
            CharacterSnapshot::from_json(&json),
            Err(SyncError::UnsupportedVersion { found: 99, supported: SNAPSHOT_VERSION })
        ));
    }

    #[test]
    fn encodes_camel_case() {
        let s = CharacterSnapshot::from_json(MINIMAL).unwrap();
        let json = s.to_json().unwrap();
        assert!(json.contains("\"exportTimestamp\""));
        assert!(json.contains("\"selfItemForLocationName\""));
        assert!(json.contains("\"slotType\": \"APPLICATUS\""));
        assert!(!json.contains("\"id\""));
    }
}
