//! Character and group rows.
//!
//! Attributes, skills and energies are stored as JSON columns; everything
//! else is a plain column. A JSON column that cannot be written or read
//! back is a store failure (`SyncError::Store`), not a snapshot decode
//! error. None of these functions touch
//! `last_modified_date` on their own; the caller decides.

use chrono::Utc;
use dsa_core::{Character, Group, Guid, LocalId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqliteConnection;

use crate::error::{SyncError, SyncResult};

#[derive(sqlx::FromRow)]
struct CharacterRow {
    id: i64,
    guid: String,
    name: String,
    group_id: Option<i64>,
    attributes: String,
    skills: String,
    energies: String,
    last_modified_date: i64,
}

impl TryFrom<CharacterRow> for Character {
    type Error = SyncError;

    fn try_from(row: CharacterRow) -> SyncResult<Self> {
        Ok(Character {
            id: row.id,
            guid: row
                .guid
                .parse::<Guid>()
                .map_err(|e| SyncError::Store(sqlx::Error::Decode(Box::new(e))))?,
            name: row.name,
            group_id: row.group_id,
            attributes: from_column(&row.attributes)?,
            skills: from_column(&row.skills)?,
            energies: from_column(&row.energies)?,
            last_modified_date: row.last_modified_date,
        })
    }
}

fn to_column(value: &impl Serialize) -> SyncResult<String> {
    serde_json::to_string(value).map_err(|e| SyncError::Store(sqlx::Error::Encode(Box::new(e))))
}

fn from_column<T: DeserializeOwned>(json: &str) -> SyncResult<T> {
    serde_json::from_str(json).map_err(|e| SyncError::Store(sqlx::Error::Decode(Box::new(e))))
}

const CHARACTER_COLUMNS: &str =
    "id, guid, name, group_id, attributes, skills, energies, last_modified_date";

/// Insert a character, returning its new local id.
pub async fn insert_character(conn: &mut SqliteConnection, c: &Character) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO characters (guid, name, group_id, attributes, skills, energies, last_modified_date)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(c.guid.to_string())
    .bind(&c.name)
    .bind(c.group_id)
    .bind(to_column(&c.attributes)?)
    .bind(to_column(&c.skills)?)
    .bind(to_column(&c.energies)?)
    .bind(c.last_modified_date)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every content column of a character. The GUID is never
/// rewritten.
pub async fn update_character(conn: &mut SqliteConnection, c: &Character) -> SyncResult<()> {
    let result = sqlx::query(
        "UPDATE characters
         SET name = ?, group_id = ?, attributes = ?, skills = ?, energies = ?, last_modified_date = ?
         WHERE id = ?",
    )
    .bind(&c.name)
    .bind(c.group_id)
    .bind(to_column(&c.attributes)?)
    .bind(to_column(&c.skills)?)
    .bind(to_column(&c.energies)?)
    .bind(c.last_modified_date)
    .bind(c.id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(SyncError::not_found("character", c.id));
    }
    Ok(())
}

/// Set `last_modified_date` to an explicit timestamp.
pub async fn set_last_modified(
    conn: &mut SqliteConnection,
    id: LocalId,
    timestamp: i64,
) -> SyncResult<()> {
    sqlx::query("UPDATE characters SET last_modified_date = ? WHERE id = ?")
        .bind(timestamp)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Mark a character as changed now. Used by interactive edit paths only.
pub async fn touch_character(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<()> {
    set_last_modified(conn, id, Utc::now().timestamp_millis()).await
}

/// Look up a character by local id.
pub async fn find_character(
    conn: &mut SqliteConnection,
    id: LocalId,
) -> SyncResult<Option<Character>> {
    let row = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {CHARACTER_COLUMNS} FROM characters WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Character::try_from).transpose()
}

/// Look up a character by local id, failing if it does not exist.
pub async fn get_character(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<Character> {
    find_character(conn, id)
        .await?
        .ok_or_else(|| SyncError::not_found("character", id))
}

/// Look up a character by GUID.
pub async fn find_character_by_guid(
    conn: &mut SqliteConnection,
    guid: &Guid,
) -> SyncResult<Option<Character>> {
    let row = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {CHARACTER_COLUMNS} FROM characters WHERE guid = ?"
    ))
    .bind(guid.to_string())
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Character::try_from).transpose()
}

/// All characters, ordered by name.
pub async fn list_characters(conn: &mut SqliteConnection) -> SyncResult<Vec<Character>> {
    let rows = sqlx::query_as::<_, CharacterRow>(&format!(
        "SELECT {CHARACTER_COLUMNS} FROM characters ORDER BY name, id"
    ))
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(Character::try_from).collect()
}

/// Delete a character and, through cascades, everything it owns.
pub async fn delete_character(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<()> {
    sqlx::query("DELETE FROM characters WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    game_date: String,
    is_game_master: bool,
    created_at: i64,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            name: row.name,
            current_date: row.game_date,
            is_game_master: row.is_game_master,
            created_at: row.created_at,
        }
    }
}

/// Insert a group, returning its new local id.
pub async fn insert_group(conn: &mut SqliteConnection, group: &Group) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO play_groups (name, game_date, is_game_master, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&group.name)
    .bind(&group.current_date)
    .bind(group.is_game_master)
    .bind(group.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Look up a group by local id.
pub async fn find_group(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<Option<Group>> {
    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, game_date, is_game_master, created_at FROM play_groups WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Group::from))
}

/// Look up a group by its unique name.
pub async fn find_group_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> SyncResult<Option<Group>> {
    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, game_date, is_game_master, created_at FROM play_groups WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Group::from))
}

/// The group called `name`, created as a player-side group if missing.
pub async fn find_or_create_group(conn: &mut SqliteConnection, name: &str) -> SyncResult<Group> {
    if let Some(group) = find_group_by_name(conn, name).await? {
        return Ok(group);
    }
    let mut group = Group::new(name);
    group.id = insert_group(conn, &group).await?;
    tracing::info!(group = %group.name, id = group.id, "created group");
    Ok(group)
}

/// All groups, ordered by name.
pub async fn list_groups(conn: &mut SqliteConnection) -> SyncResult<Vec<Group>> {
    let rows = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, game_date, is_game_master, created_at FROM play_groups ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Group::from).collect())
}
