//! Spell catalog, spell slot and magic sign rows.

use dsa_core::{Attribute, LocalId, MagicSign, SignDuration, SlotType, Spell, SpellSlot};
use sqlx::SqliteConnection;

use crate::error::SyncResult;

#[derive(sqlx::FromRow)]
struct SpellRow {
    id: i64,
    name: String,
    attribute1: String,
    attribute2: String,
    attribute3: String,
}

impl TryFrom<SpellRow> for Spell {
    type Error = crate::error::SyncError;

    fn try_from(row: SpellRow) -> SyncResult<Self> {
        Ok(Spell {
            id: row.id,
            name: row.name,
            attributes: [
                row.attribute1.parse::<Attribute>()?,
                row.attribute2.parse::<Attribute>()?,
                row.attribute3.parse::<Attribute>()?,
            ],
        })
    }
}

/// Insert a catalog spell, returning its new local id.
pub async fn insert_spell(conn: &mut SqliteConnection, spell: &Spell) -> SyncResult<LocalId> {
    let [a, b, c] = spell.attributes;
    let result = sqlx::query(
        "INSERT INTO spells (name, attribute1, attribute2, attribute3) VALUES (?, ?, ?, ?)",
    )
    .bind(&spell.name)
    .bind(a.abbreviation())
    .bind(b.abbreviation())
    .bind(c.abbreviation())
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Look up a catalog spell by local id.
pub async fn find_spell(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<Option<Spell>> {
    let row = sqlx::query_as::<_, SpellRow>(
        "SELECT id, name, attribute1, attribute2, attribute3 FROM spells WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Spell::try_from).transpose()
}

/// Look up a catalog spell by name.
pub async fn find_spell_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> SyncResult<Option<Spell>> {
    let row = sqlx::query_as::<_, SpellRow>(
        "SELECT id, name, attribute1, attribute2, attribute3 FROM spells WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Spell::try_from).transpose()
}

/// The whole spell catalog, ordered by name.
pub async fn list_spells(conn: &mut SqliteConnection) -> SyncResult<Vec<Spell>> {
    let rows = sqlx::query_as::<_, SpellRow>(
        "SELECT id, name, attribute1, attribute2, attribute3 FROM spells ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(Spell::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct SpellSlotRow {
    id: i64,
    character_id: i64,
    slot_number: i32,
    slot_type: String,
    volume_points: i32,
    spell_id: Option<i64>,
    is_filled: bool,
    zfp_star: i32,
    item_description: String,
    last_roll_result: Option<String>,
}

impl From<SpellSlotRow> for SpellSlot {
    fn from(row: SpellSlotRow) -> Self {
        SpellSlot {
            id: row.id,
            character_id: row.character_id,
            slot_number: row.slot_number,
            slot_type: SlotType::from_name(&row.slot_type),
            volume_points: row.volume_points,
            spell_id: row.spell_id,
            is_filled: row.is_filled,
            zfp_star: row.zfp_star,
            item_description: row.item_description,
            last_roll_result: row.last_roll_result,
        }
    }
}

/// Insert a spell slot, returning its new local id.
pub async fn insert_spell_slot(conn: &mut SqliteConnection, slot: &SpellSlot) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO spell_slots (character_id, slot_number, slot_type, volume_points, spell_id,
             is_filled, zfp_star, item_description, last_roll_result)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(slot.character_id)
    .bind(slot.slot_number)
    .bind(slot.slot_type.as_str())
    .bind(slot.volume_points)
    .bind(slot.spell_id)
    .bind(slot.is_filled)
    .bind(slot.zfp_star)
    .bind(&slot.item_description)
    .bind(&slot.last_roll_result)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every column of a spell slot.
pub async fn update_spell_slot(conn: &mut SqliteConnection, slot: &SpellSlot) -> SyncResult<()> {
    sqlx::query(
        "UPDATE spell_slots SET slot_number = ?, slot_type = ?, volume_points = ?, spell_id = ?,
             is_filled = ?, zfp_star = ?, item_description = ?, last_roll_result = ?
         WHERE id = ?",
    )
    .bind(slot.slot_number)
    .bind(slot.slot_type.as_str())
    .bind(slot.volume_points)
    .bind(slot.spell_id)
    .bind(slot.is_filled)
    .bind(slot.zfp_star)
    .bind(&slot.item_description)
    .bind(&slot.last_roll_result)
    .bind(slot.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// A character's spell slots by slot number.
pub async fn list_spell_slots(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<Vec<SpellSlot>> {
    let rows = sqlx::query_as::<_, SpellSlotRow>(
        "SELECT id, character_id, slot_number, slot_type, volume_points, spell_id, is_filled,
             zfp_star, item_description, last_roll_result
         FROM spell_slots WHERE character_id = ? ORDER BY slot_number, id",
    )
    .bind(character_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(SpellSlot::from).collect())
}

/// Delete every spell slot of a character.
pub async fn delete_spell_slots_of_character(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<()> {
    sqlx::query("DELETE FROM spell_slots WHERE character_id = ?")
        .bind(character_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct MagicSignRow {
    id: i64,
    character_id: i64,
    item_id: i64,
    name: String,
    effect: String,
    activation_modifier: i32,
    duration: String,
    is_activated: bool,
    is_botched: bool,
    expiry_date: Option<String>,
}

impl From<MagicSignRow> for MagicSign {
    fn from(row: MagicSignRow) -> Self {
        MagicSign {
            id: row.id,
            character_id: row.character_id,
            item_id: row.item_id,
            name: row.name,
            effect: row.effect,
            activation_modifier: row.activation_modifier,
            duration: SignDuration::from_name(&row.duration),
            is_activated: row.is_activated,
            is_botched: row.is_botched,
            expiry_date: row.expiry_date,
        }
    }
}

/// Insert a magic sign, returning its new local id.
pub async fn insert_magic_sign(conn: &mut SqliteConnection, sign: &MagicSign) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO magic_signs (character_id, item_id, name, effect, activation_modifier,
             duration, is_activated, is_botched, expiry_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(sign.character_id)
    .bind(sign.item_id)
    .bind(&sign.name)
    .bind(&sign.effect)
    .bind(sign.activation_modifier)
    .bind(sign.duration.as_str())
    .bind(sign.is_activated)
    .bind(sign.is_botched)
    .bind(&sign.expiry_date)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every column of a magic sign.
pub async fn update_magic_sign(conn: &mut SqliteConnection, sign: &MagicSign) -> SyncResult<()> {
    sqlx::query(
        "UPDATE magic_signs SET character_id = ?, item_id = ?, name = ?, effect = ?,
             activation_modifier = ?, duration = ?, is_activated = ?, is_botched = ?, expiry_date = ?
         WHERE id = ?",
    )
    .bind(sign.character_id)
    .bind(sign.item_id)
    .bind(&sign.name)
    .bind(&sign.effect)
    .bind(sign.activation_modifier)
    .bind(sign.duration.as_str())
    .bind(sign.is_activated)
    .bind(sign.is_botched)
    .bind(&sign.expiry_date)
    .bind(sign.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// A character's magic signs.
pub async fn list_magic_signs(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<Vec<MagicSign>> {
    let rows = sqlx::query_as::<_, MagicSignRow>(
        "SELECT id, character_id, item_id, name, effect, activation_modifier, duration,
             is_activated, is_botched, expiry_date
         FROM magic_signs WHERE character_id = ? ORDER BY id",
    )
    .bind(character_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(MagicSign::from).collect())
}

/// Delete every magic sign of a character.
pub async fn delete_magic_signs_of_character(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<()> {
    sqlx::query("DELETE FROM magic_signs WHERE character_id = ?")
        .bind(character_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Give the signs on every item of a location to `character_id`.
pub async fn reassign_magic_signs_of_location(
    conn: &mut SqliteConnection,
    location_id: LocalId,
    character_id: LocalId,
) -> SyncResult<()> {
    sqlx::query(
        "UPDATE magic_signs SET character_id = ?
         WHERE item_id IN (
             SELECT id FROM items
             WHERE location_id = ? OR (is_self_item = TRUE AND self_item_for_location_id = ?)
         )",
    )
    .bind(character_id)
    .bind(location_id)
    .bind(location_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
