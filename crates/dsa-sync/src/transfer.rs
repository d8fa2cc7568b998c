//! Handing a location with its contents from one character to another.

use dsa_core::{Item, LocalId, Location};
use sqlx::SqliteConnection;

use crate::error::{SyncError, SyncResult};
use crate::store::{Store, characters, inventory, magic};

/// Move a location, every item in it and its self-item to another
/// character.
///
/// The location leaves its owner entirely and arrives at the target
/// exactly once, with exactly one self-item. Magic signs on the moved items
/// go with them. If the target already has a location of that name, the
/// moved one is renamed with a numeric suffix. Default locations cannot be
/// transferred. Both characters are marked as modified.
pub async fn transfer_location_to_character(
    store: &Store,
    location_id: LocalId,
    target_character_id: LocalId,
) -> SyncResult<Location> {
    let _writer = store.write_lock().await;
    let mut tx = store.begin().await?;

    let location = inventory::find_location(&mut tx, location_id)
        .await?
        .ok_or_else(|| SyncError::not_found("location", location_id))?;
    if location.is_default {
        return Err(SyncError::Validation(format!(
            "default location '{}' cannot be transferred",
            location.name
        )));
    }
    if location.character_id == target_character_id {
        return Err(SyncError::Validation(format!(
            "location '{}' already belongs to character {target_character_id}",
            location.name
        )));
    }
    let target = characters::get_character(&mut tx, target_character_id).await?;
    let source_id = location.character_id;

    let name = free_location_name(&mut tx, target.id, &location.name).await?;
    let moved = inventory::reassign_location(&mut tx, location.id, target.id, &name).await?;
    magic::reassign_magic_signs_of_location(&mut tx, location.id, target.id).await?;
    let location = Location {
        character_id: target.id,
        name,
        ..location
    };
    ensure_single_self_item(&mut tx, &location).await?;

    characters::touch_character(&mut tx, source_id).await?;
    characters::touch_character(&mut tx, target.id).await?;
    tx.commit().await?;

    tracing::info!(
        location = %location.name,
        from = source_id,
        to = target.id,
        items = moved,
        "transferred location"
    );
    Ok(location)
}

/// `name`, or `name (2)`, `name (3)`, ... whichever the character does not
/// use yet.
async fn free_location_name(
    conn: &mut SqliteConnection,
    character_id: LocalId,
    name: &str,
) -> SyncResult<String> {
    let mut candidate = name.to_string();
    let mut n = 2;
    while inventory::find_location_by_name(conn, character_id, &candidate)
        .await?
        .is_some()
    {
        candidate = format!("{name} ({n})");
        n += 1;
    }
    Ok(candidate)
}

/// Keep the oldest self-item of `location` in step with its name and owner,
/// drop any extra ones, and synthesize one if none exists. A self-item left
/// behind in one of the previous owner's locations moves into `location`.
async fn ensure_single_self_item(conn: &mut SqliteConnection, location: &Location) -> SyncResult<()> {
    let owned: Vec<LocalId> = inventory::list_locations(conn, location.character_id)
        .await?
        .iter()
        .map(|l| l.id)
        .collect();
    let mut self_items = inventory::list_self_items(conn, location.id).await?.into_iter();
    match self_items.next() {
        Some(first) => {
            let stranded = first.location_id.is_some_and(|id| !owned.contains(&id));
            if first.name != location.name || stranded {
                let location_id = if stranded {
                    Some(location.id)
                } else {
                    first.location_id
                };
                let fixed = first
                    .renamed(location.name.clone())
                    .with_location(location_id);
                inventory::update_item(conn, &fixed).await?;
            }
            for extra in self_items {
                tracing::warn!(location = %location.name, item = extra.id, "dropping duplicate self-item");
                inventory::delete_item(conn, extra.id).await?;
            }
        }
        None => {
            inventory::insert_item(conn, &Item::self_item_for(location)).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use dsa_core::Character;

    use super::*;

    #[tokio::test]
    async fn clashing_names_get_a_suffix() {
        let store = Store::in_memory().await.unwrap();
        let a = store.create_character(Character::new("Alrik")).await.unwrap();
        let b = store.create_character(Character::new("Bosper")).await.unwrap();
        let bag = store.add_location(Location::new(a.id, "Satteltasche")).await.unwrap();
        store.add_location(Location::new(b.id, "Satteltasche")).await.unwrap();

        let moved = transfer_location_to_character(&store, bag.id, b.id).await.unwrap();
        assert_eq!(moved.name, "Satteltasche (2)");

        let self_item = store
            .items(b.id)
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.self_item_for_location_id == Some(bag.id))
            .unwrap();
        assert_eq!(self_item.name, "Satteltasche (2)");
    }

    #[tokio::test]
    async fn default_locations_stay_put() {
        let store = Store::in_memory().await.unwrap();
        let a = store.create_character(Character::new("Alrik")).await.unwrap();
        let b = store.create_character(Character::new("Bosper")).await.unwrap();
        let backpack = store.locations(a.id).await.unwrap().remove(1);
        assert!(matches!(
            transfer_location_to_character(&store, backpack.id, b.id).await,
            Err(SyncError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let store = Store::in_memory().await.unwrap();
        let a = store.create_character(Character::new("Alrik")).await.unwrap();
        let bag = store.add_location(Location::new(a.id, "Satteltasche")).await.unwrap();
        assert!(matches!(
            transfer_location_to_character(&store, bag.id, 999).await,
            Err(SyncError::NotFound { entity: "character", .. })
        ));
        assert_eq!(store.locations(a.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn missing_self_item_is_synthesized() {
        let store = Store::in_memory().await.unwrap();
        let a = store.create_character(Character::new("Alrik")).await.unwrap();
        let b = store.create_character(Character::new("Bosper")).await.unwrap();
        let bag = store.add_location(Location::new(a.id, "Satteltasche")).await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();
        let self_item = inventory::list_self_items(&mut conn, bag.id).await.unwrap().remove(0);
        inventory::delete_item(&mut conn, self_item.id).await.unwrap();
        drop(conn);

        transfer_location_to_character(&store, bag.id, b.id).await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();
        assert_eq!(inventory::count_self_items(&mut conn, bag.id).await.unwrap(), 1);
    }
}
