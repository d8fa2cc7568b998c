//! Location and item rows.

use dsa_core::{Item, LocalId, Location, Weight};
use sqlx::SqliteConnection;

use crate::error::{SyncError, SyncResult};

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: i64,
    character_id: i64,
    name: String,
    is_default: bool,
    is_carried: bool,
    sort_order: i32,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            character_id: row.character_id,
            name: row.name,
            is_default: row.is_default,
            is_carried: row.is_carried,
            sort_order: row.sort_order,
        }
    }
}

const LOCATION_COLUMNS: &str = "id, character_id, name, is_default, is_carried, sort_order";

/// Insert a location, returning its new local id.
pub async fn insert_location(conn: &mut SqliteConnection, loc: &Location) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO locations (character_id, name, is_default, is_carried, sort_order)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(loc.character_id)
    .bind(&loc.name)
    .bind(loc.is_default)
    .bind(loc.is_carried)
    .bind(loc.sort_order)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every column of a location.
pub async fn update_location(conn: &mut SqliteConnection, loc: &Location) -> SyncResult<()> {
    sqlx::query(
        "UPDATE locations SET character_id = ?, name = ?, is_default = ?, is_carried = ?, sort_order = ?
         WHERE id = ?",
    )
    .bind(loc.character_id)
    .bind(&loc.name)
    .bind(loc.is_default)
    .bind(loc.is_carried)
    .bind(loc.sort_order)
    .bind(loc.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Look up a location by local id.
pub async fn find_location(
    conn: &mut SqliteConnection,
    id: LocalId,
) -> SyncResult<Option<Location>> {
    let row = sqlx::query_as::<_, LocationRow>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Location::from))
}

/// Look up a location by its natural key.
pub async fn find_location_by_name(
    conn: &mut SqliteConnection,
    character_id: LocalId,
    name: &str,
) -> SyncResult<Option<Location>> {
    let row = sqlx::query_as::<_, LocationRow>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE character_id = ? AND name = ?"
    ))
    .bind(character_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Location::from))
}

/// A character's locations in display order.
pub async fn list_locations(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<Vec<Location>> {
    let rows = sqlx::query_as::<_, LocationRow>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE character_id = ? ORDER BY sort_order, id"
    ))
    .bind(character_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Location::from).collect())
}

/// Delete a location row. Its items, including its self-item, go with it.
pub async fn delete_location_row(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<()> {
    sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    character_id: i64,
    location_id: Option<i64>,
    name: String,
    weight_ounces: i32,
    is_purse: bool,
    kreuzer: i64,
    is_countable: bool,
    quantity: i32,
    is_self_item: bool,
    self_item_for_location_id: Option<i64>,
    sort_order: i32,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            character_id: row.character_id,
            location_id: row.location_id,
            name: row.name,
            weight: Weight::from_ounces(row.weight_ounces),
            is_purse: row.is_purse,
            kreuzer: row.kreuzer,
            is_countable: row.is_countable,
            quantity: row.quantity,
            is_self_item: row.is_self_item,
            self_item_for_location_id: row.self_item_for_location_id,
            sort_order: row.sort_order,
        }
    }
}

const ITEM_COLUMNS: &str = "id, character_id, location_id, name, weight_ounces, is_purse, kreuzer, \
     is_countable, quantity, is_self_item, self_item_for_location_id, sort_order";

/// Insert an item, returning its new local id.
pub async fn insert_item(conn: &mut SqliteConnection, item: &Item) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO items (character_id, location_id, name, weight_ounces, is_purse, kreuzer,
             is_countable, quantity, is_self_item, self_item_for_location_id, sort_order)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.character_id)
    .bind(item.location_id)
    .bind(&item.name)
    .bind(item.weight.total_ounces())
    .bind(item.is_purse)
    .bind(item.kreuzer)
    .bind(item.is_countable)
    .bind(item.quantity)
    .bind(item.is_self_item)
    .bind(item.self_item_for_location_id)
    .bind(item.sort_order)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every column of an item, self-item flags included.
pub async fn update_item(conn: &mut SqliteConnection, item: &Item) -> SyncResult<()> {
    let result = sqlx::query(
        "UPDATE items SET character_id = ?, location_id = ?, name = ?, weight_ounces = ?,
             is_purse = ?, kreuzer = ?, is_countable = ?, quantity = ?, is_self_item = ?,
             self_item_for_location_id = ?, sort_order = ?
         WHERE id = ?",
    )
    .bind(item.character_id)
    .bind(item.location_id)
    .bind(&item.name)
    .bind(item.weight.total_ounces())
    .bind(item.is_purse)
    .bind(item.kreuzer)
    .bind(item.is_countable)
    .bind(item.quantity)
    .bind(item.is_self_item)
    .bind(item.self_item_for_location_id)
    .bind(item.sort_order)
    .bind(item.id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(SyncError::not_found("item", item.id));
    }
    Ok(())
}

/// Look up an item by local id.
pub async fn find_item(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<Option<Item>> {
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Item::from))
}

/// A character's items, grouped by location in display order.
pub async fn list_items(conn: &mut SqliteConnection, character_id: LocalId) -> SyncResult<Vec<Item>> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE character_id = ?
         ORDER BY location_id, sort_order, id"
    ))
    .bind(character_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Item::from).collect())
}

/// Items currently placed in a location.
pub async fn list_items_in_location(
    conn: &mut SqliteConnection,
    location_id: LocalId,
) -> SyncResult<Vec<Item>> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE location_id = ? ORDER BY sort_order, id"
    ))
    .bind(location_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Item::from).collect())
}

/// Number of self-items standing for a location.
pub async fn count_self_items(conn: &mut SqliteConnection, location_id: LocalId) -> SyncResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM items WHERE is_self_item = TRUE AND self_item_for_location_id = ?",
    )
    .bind(location_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

/// Delete one item.
pub async fn delete_item(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<()> {
    sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Delete every item of a character.
pub async fn delete_items_of_character(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<u64> {
    let result = sqlx::query("DELETE FROM items WHERE character_id = ?")
        .bind(character_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Self-items standing for a location, oldest first.
pub async fn list_self_items(
    conn: &mut SqliteConnection,
    location_id: LocalId,
) -> SyncResult<Vec<Item>> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items
         WHERE is_self_item = TRUE AND self_item_for_location_id = ? ORDER BY id"
    ))
    .bind(location_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Item::from).collect())
}

/// Hand a location to another character under `name`, together with every
/// item inside it and its self-item wherever that sits. Returns the number
/// of items moved.
pub async fn reassign_location(
    conn: &mut SqliteConnection,
    location_id: LocalId,
    character_id: LocalId,
    name: &str,
) -> SyncResult<u64> {
    sqlx::query("UPDATE locations SET character_id = ?, name = ? WHERE id = ?")
        .bind(character_id)
        .bind(name)
        .bind(location_id)
        .execute(&mut *conn)
        .await?;
    let moved = sqlx::query(
        "UPDATE items SET character_id = ?
         WHERE location_id = ? OR (is_self_item = TRUE AND self_item_for_location_id = ?)",
    )
    .bind(character_id)
    .bind(location_id)
    .bind(location_id)
    .execute(&mut *conn)
    .await?;
    Ok(moved.rows_affected())
}
