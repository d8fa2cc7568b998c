//! The relational store.
//!
//! A [`Store`] wraps a SQLite pool with foreign keys enforced. Row-level
//! repository functions live in the submodules and take a plain
//! `&mut SqliteConnection`, so the same function runs on a pooled
//! connection or inside a transaction. The methods on `Store` are the
//! interactive edit paths: each runs in its own transaction and marks the
//! character as modified.

pub mod alchemy;
pub mod catalog;
pub mod characters;
pub mod inventory;
pub mod magic;
mod schema;

use std::str::FromStr;
use std::sync::Arc;

use dsa_core::{Character, Item, LocalId, Location};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

/// Handle to the persisted character graph. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    config: Arc<SyncConfig>,
    writer: Arc<Mutex<()>>,
}

impl Store {
    /// Open (and create if needed) the database named by `config`, then
    /// bring the schema up to date.
    pub async fn open(config: SyncConfig) -> SyncResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size())
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self {
            pool,
            config: Arc::new(config),
            writer: Arc::new(Mutex::new(())),
        };
        store.migrate().await?;
        tracing::debug!(url = %store.config.database_url, "store opened");
        Ok(store)
    }

    /// An empty in-memory store with default configuration.
    pub async fn in_memory() -> SyncResult<Self> {
        Self::open(SyncConfig::default()).await
    }

    async fn migrate(&self) -> SyncResult<()> {
        for statement in schema::SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The configuration the store was opened with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Begin a transaction.
    pub async fn begin(&self) -> SyncResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Serialize multi-step writers. Imports and transfers hold this for
    /// their whole transaction so that two of them never interleave.
    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Seed the default spell and recipe catalogs.
    pub async fn seed_default_catalog(&self) -> SyncResult<usize> {
        let mut conn = self.pool.acquire().await?;
        catalog::seed_catalog(&mut conn, &catalog::default_spells(), &catalog::default_recipes())
            .await
    }

    /// Create a character with its default locations and their self-items,
    /// placed in the configured default group.
    pub async fn create_character(&self, character: Character) -> SyncResult<Character> {
        let mut tx = self.begin().await?;
        let group = characters::find_or_create_group(&mut tx, &self.config.default_group_name).await?;
        let mut character = Character {
            group_id: character.group_id.or(Some(group.id)),
            ..character
        };
        character.id = characters::insert_character(&mut tx, &character).await?;
        for location in Location::defaults(character.id) {
            insert_location_with_self_item(&mut tx, location).await?;
        }
        tx.commit().await?;
        tracing::info!(id = character.id, name = %character.name, "created character");
        Ok(character)
    }

    /// Save an edited character and mark it as modified.
    pub async fn save_character(&self, character: &Character) -> SyncResult<()> {
        let mut tx = self.begin().await?;
        characters::update_character(&mut tx, character).await?;
        characters::touch_character(&mut tx, character.id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Load a character.
    pub async fn character(&self, id: LocalId) -> SyncResult<Character> {
        let mut conn = self.pool.acquire().await?;
        characters::get_character(&mut conn, id).await
    }

    /// All characters, ordered by name.
    pub async fn characters(&self) -> SyncResult<Vec<Character>> {
        let mut conn = self.pool.acquire().await?;
        characters::list_characters(&mut conn).await
    }

    /// Delete a character and everything it owns.
    pub async fn delete_character(&self, id: LocalId) -> SyncResult<()> {
        let mut conn = self.pool.acquire().await?;
        characters::delete_character(&mut conn, id).await
    }

    /// Add a location, with its self-item, to a character.
    pub async fn add_location(&self, location: Location) -> SyncResult<Location> {
        let mut tx = self.begin().await?;
        characters::get_character(&mut tx, location.character_id).await?;
        if inventory::find_location_by_name(&mut tx, location.character_id, &location.name)
            .await?
            .is_some()
        {
            return Err(SyncError::Validation(format!(
                "location '{}' already exists",
                location.name
            )));
        }
        let location = insert_location_with_self_item(&mut tx, location).await?;
        characters::touch_character(&mut tx, location.character_id).await?;
        tx.commit().await?;
        Ok(location)
    }

    /// Delete a non-default location and its items.
    pub async fn delete_location(&self, location_id: LocalId) -> SyncResult<()> {
        let mut tx = self.begin().await?;
        let location = inventory::find_location(&mut tx, location_id)
            .await?
            .ok_or_else(|| SyncError::not_found("location", location_id))?;
        if location.is_default {
            return Err(SyncError::Validation(format!(
                "default location '{}' cannot be deleted",
                location.name
            )));
        }
        inventory::delete_location_row(&mut tx, location_id).await?;
        characters::touch_character(&mut tx, location.character_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// A character's locations in display order.
    pub async fn locations(&self, character_id: LocalId) -> SyncResult<Vec<Location>> {
        let mut conn = self.pool.acquire().await?;
        inventory::list_locations(&mut conn, character_id).await
    }

    /// Add an item to a character.
    pub async fn add_item(&self, item: Item) -> SyncResult<Item> {
        let mut tx = self.begin().await?;
        let id = inventory::insert_item(&mut tx, &item).await?;
        characters::touch_character(&mut tx, item.character_id).await?;
        tx.commit().await?;
        Ok(Item { id, ..item })
    }

    /// Save an edited item. All fields are written, including the
    /// self-item flags, so callers must start from the stored item.
    pub async fn save_item(&self, item: &Item) -> SyncResult<()> {
        let mut tx = self.begin().await?;
        inventory::update_item(&mut tx, item).await?;
        characters::touch_character(&mut tx, item.character_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// A character's items.
    pub async fn items(&self, character_id: LocalId) -> SyncResult<Vec<Item>> {
        let mut conn = self.pool.acquire().await?;
        inventory::list_items(&mut conn, character_id).await
    }
}

/// Insert a location together with its synthetic self-item.
pub(crate) async fn insert_location_with_self_item(
    conn: &mut sqlx::SqliteConnection,
    location: Location,
) -> SyncResult<Location> {
    let location = Location {
        id: inventory::insert_location(conn, &location).await?,
        ..location
    };
    inventory::insert_item(conn, &Item::self_item_for(&location)).await?;
    Ok(location)
}

#[cfg(test)]
mod tests {
    use dsa_core::Weight;

    use super::*;

    #[tokio::test]
    async fn new_character_gets_default_locations_with_self_items() {
        let store = Store::in_memory().await.unwrap();
        let c = store.create_character(Character::new("Alrik")).await.unwrap();
        assert!(c.group_id.is_some());

        let locations = store.locations(c.id).await.unwrap();
        let names: Vec<_> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec![Location::BODY, Location::BACKPACK]);

        let items = store.items(c.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.is_self_item));
    }

    #[tokio::test]
    async fn default_locations_cannot_be_deleted() {
        let store = Store::in_memory().await.unwrap();
        let c = store.create_character(Character::new("Alrik")).await.unwrap();
        let body = store.locations(c.id).await.unwrap().remove(0);
        assert!(matches!(
            store.delete_location(body.id).await,
            Err(SyncError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_location_cascades_to_items() {
        let store = Store::in_memory().await.unwrap();
        let c = store.create_character(Character::new("Alrik")).await.unwrap();
        let bag = store
            .add_location(Location::new(c.id, "Satteltasche"))
            .await
            .unwrap();
        store
            .add_item(Item::new(c.id, "Seil").with_location(Some(bag.id)))
            .await
            .unwrap();
        assert_eq!(store.items(c.id).await.unwrap().len(), 4);

        store.delete_location(bag.id).await.unwrap();
        let items = store.items(c.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.location_id != Some(bag.id)));
    }

    #[tokio::test]
    async fn duplicate_location_names_are_rejected() {
        let store = Store::in_memory().await.unwrap();
        let c = store.create_character(Character::new("Alrik")).await.unwrap();
        let err = store
            .add_location(Location::new(c.id, Location::BACKPACK))
            .await;
        assert!(matches!(err, Err(SyncError::Validation(_))));
    }

    #[tokio::test]
    async fn saving_an_item_keeps_self_item_flags() {
        let store = Store::in_memory().await.unwrap();
        let c = store.create_character(Character::new("Alrik")).await.unwrap();
        let self_item = store.items(c.id).await.unwrap().remove(0);
        store
            .save_item(&self_item.clone().with_weight(Weight::from_ounces(30)))
            .await
            .unwrap();
        let reloaded = store.items(c.id).await.unwrap().remove(0);
        assert!(reloaded.is_self_item);
        assert_eq!(reloaded.self_item_for_location_id, self_item.self_item_for_location_id);
        assert_eq!(reloaded.weight.total_ounces(), 30);
    }

    #[tokio::test]
    async fn edits_touch_the_character() {
        let store = Store::in_memory().await.unwrap();
        let mut c = Character::new("Alrik");
        c.last_modified_date = 1;
        let c = store.create_character(c).await.unwrap();
        assert_eq!(store.character(c.id).await.unwrap().last_modified_date, 1);
        store.add_item(Item::new(c.id, "Fackel")).await.unwrap();
        assert!(store.character(c.id).await.unwrap().last_modified_date > 1);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let store = Store::in_memory().await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();
        let orphan = Item::new(999, "Geisterschwert");
        let err = inventory::insert_item(&mut conn, &orphan).await;
        assert!(matches!(err, Err(SyncError::Integrity(_))));
    }

    #[tokio::test]
    async fn seeding_is_keyed_by_name() {
        let store = Store::in_memory().await.unwrap();
        let first = store.seed_default_catalog().await.unwrap();
        assert!(first > 0);
        assert_eq!(store.seed_default_catalog().await.unwrap(), 0);
        let mut conn = store.pool().acquire().await.unwrap();
        let spell = magic::find_spell_by_name(&mut conn, "Applicatus")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(spell.attributes[1], dsa_core::Attribute::FF);
    }
}
