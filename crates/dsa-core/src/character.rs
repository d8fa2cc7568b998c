use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::LocalId;
use crate::attribute::Attributes;
use crate::guid::Guid;

/// Learned skill values. Values are 0 or more; the `has_*` flags gate
/// skills a character may not possess at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skills {
    /// Alchimie talent value.
    pub alchemy: i32,
    /// Whether the character knows Alchimie.
    pub has_alchemy: bool,
    /// Kochen (Tränke) talent value.
    pub cooking_potions: i32,
    /// Whether the character knows Kochen (Tränke).
    pub has_cooking_potions: bool,
    /// Selbstbeherrschung.
    pub self_control: i32,
    /// Sinnenschärfe.
    pub sensory_acuity: i32,
    /// Magiekunde.
    pub magical_lore: i32,
    /// Pflanzenkunde.
    pub herbal_lore: i32,
    /// Wildnisleben.
    pub wilderness_survival: i32,
    /// Ritualkenntnis value used for magic signs.
    pub ritual_knowledge: i32,
    /// Whether the character has a ritual knowledge.
    pub has_ritual_knowledge: bool,
    /// ZfW of the Applicatus spell.
    pub applicatus: i32,
    /// Whether the character knows the Applicatus spell.
    pub has_applicatus: bool,
}

/// Life, astral and karmic energy pools with regeneration modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Energies {
    /// Current life points.
    pub le_current: i32,
    /// Maximum life points.
    pub le_max: i32,
    /// Current astral points.
    pub ae_current: i32,
    /// Maximum astral points.
    pub ae_max: i32,
    /// Current karma points.
    pub ke_current: i32,
    /// Maximum karma points.
    pub ke_max: i32,
    /// Flat bonus on nightly LE regeneration.
    pub le_regen_bonus: i32,
    /// Flat bonus on nightly AE regeneration.
    pub ae_regen_bonus: i32,
    /// Flat bonus on nightly KE regeneration.
    pub ke_regen_bonus: i32,
    /// Meisterliche Regeneration: AE uses a fixed formula instead of 1d6.
    pub has_master_regeneration: bool,
    /// Magisches Meisterhandwerk: allows astral charging while brewing.
    pub has_astral_mastery: bool,
}

impl Energies {
    /// Pools for a mundane character with full life points.
    pub fn mundane(le_max: i32) -> Self {
        Self {
            le_current: le_max,
            le_max,
            ..Self::default()
        }
    }

    /// Whether the character has an astral pool at all.
    pub fn is_spellcaster(&self) -> bool {
        self.ae_max > 0
    }

    /// Whether the character has a karmic pool at all.
    pub fn is_blessed(&self) -> bool {
        self.ke_max > 0
    }
}

/// A player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Device-local row id.
    pub id: LocalId,
    /// Stable identity across devices.
    pub guid: Guid,
    /// Display name.
    pub name: String,
    /// The group the character plays in.
    pub group_id: Option<LocalId>,
    /// Primary attributes.
    pub attributes: Attributes,
    /// Learned skills.
    pub skills: Skills,
    /// Energy pools.
    pub energies: Energies,
    /// Epoch millis of the last content change.
    pub last_modified_date: i64,
}

impl Character {
    /// A new, not yet persisted character with a fresh GUID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            guid: Guid::new(),
            name: name.into(),
            group_id: None,
            attributes: Attributes::default(),
            skills: Skills::default(),
            energies: Energies::mundane(30),
            last_modified_date: Utc::now().timestamp_millis(),
        }
    }

    /// Copy with different attributes.
    pub fn with_attributes(self, attributes: Attributes) -> Self {
        Self { attributes, ..self }
    }

    /// Copy with different skills.
    pub fn with_skills(self, skills: Skills) -> Self {
        Self { skills, ..self }
    }

    /// Copy with different energy pools.
    pub fn with_energies(self, energies: Energies) -> Self {
        Self { energies, ..self }
    }
}

/// A play group. Characters without a group are hidden from list views,
/// so every persisted character should reference one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Device-local row id.
    pub id: LocalId,
    /// Unique group name.
    pub name: String,
    /// Current in-game date, formatted as a Derian date.
    pub current_date: String,
    /// Whether this device acts as game master for the group.
    pub is_game_master: bool,
    /// Epoch millis of creation.
    pub created_at: i64,
}

impl Group {
    /// In-game date new groups start at.
    pub const DEFAULT_DATE: &'static str = "1 Praios 1040 BF";

    /// A new player-side group starting at the default in-game date.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            current_date: Self::DEFAULT_DATE.to_string(),
            is_game_master: false,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_character_has_guid_and_no_group() {
        let c = Character::new("Alrik");
        assert_eq!(c.name, "Alrik");
        assert!(c.group_id.is_none());
        assert_eq!(c.energies.le_current, 30);
    }

    #[test]
    fn with_skills_keeps_everything_else() {
        let c = Character::new("Alrik");
        let guid = c.guid;
        let updated = c.with_skills(Skills {
            alchemy: 7,
            has_alchemy: true,
            ..Skills::default()
        });
        assert_eq!(updated.guid, guid);
        assert_eq!(updated.name, "Alrik");
        assert_eq!(updated.skills.alchemy, 7);
    }

    #[test]
    fn pool_flags() {
        let mut e = Energies::mundane(30);
        assert!(!e.is_spellcaster());
        e.ae_max = 25;
        assert!(e.is_spellcaster());
        assert!(!e.is_blessed());
    }

    #[test]
    fn missing_skill_fields_default() {
        let skills: Skills = serde_json::from_str(r#"{"alchemy": 9, "hasAlchemy": true, "future": 1}"#).unwrap();
        assert_eq!(skills.alchemy, 9);
        assert!(skills.has_alchemy);
        assert_eq!(skills.self_control, 0);
    }

    #[test]
    fn new_group_is_not_game_master() {
        let g = Group::new("Die Streuner");
        assert!(!g.is_game_master);
        assert_eq!(g.current_date, Group::DEFAULT_DATE);
    }
}
