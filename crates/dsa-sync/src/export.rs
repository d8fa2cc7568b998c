//! Export Serializer: live character graph to snapshot.

use std::collections::HashMap;

use chrono::Utc;
use dsa_core::LocalId;
use sqlx::SqliteConnection;

use crate::error::SyncResult;
use crate::snapshot::{
    CharacterData, CharacterSnapshot, ItemData, LocationData, MagicSignData, PotionData,
    RecipeKnowledgeData, SNAPSHOT_VERSION, SpellSlotData,
};
use crate::store::{Store, alchemy, characters, inventory, magic};

/// Export one character as a snapshot stamped with the current time.
pub async fn export_character(store: &Store, character_id: LocalId) -> SyncResult<CharacterSnapshot> {
    let mut tx = store.begin().await?;
    let snapshot =
        build_snapshot(&mut tx, character_id, Utc::now().timestamp_millis()).await?;
    tx.commit().await?;
    tracing::info!(
        character = %snapshot.character.guid.short(),
        items = snapshot.items.len(),
        potions = snapshot.potions.len(),
        "exported character"
    );
    Ok(snapshot)
}

/// Export one character as pretty-printed JSON.
pub async fn export_character_json(store: &Store, character_id: LocalId) -> SyncResult<String> {
    export_character(store, character_id).await?.to_json()
}

/// Read the graph of `character_id` into a snapshot. Every local id is
/// translated to its natural key on the way out.
pub async fn build_snapshot(
    conn: &mut SqliteConnection,
    character_id: LocalId,
    export_timestamp: i64,
) -> SyncResult<CharacterSnapshot> {
    let character = characters::get_character(conn, character_id).await?;
    let group_name = match character.group_id {
        Some(id) => characters::find_group(conn, id).await?.map(|g| g.name),
        None => None,
    };

    let locations = inventory::list_locations(conn, character_id).await?;
    let location_names: HashMap<LocalId, String> =
        locations.iter().map(|l| (l.id, l.name.clone())).collect();
    let location_name = |id: Option<LocalId>| id.and_then(|id| location_names.get(&id).cloned());

    let items = inventory::list_items(conn, character_id).await?;
    let item_keys: HashMap<LocalId, (String, Option<String>)> = items
        .iter()
        .map(|i| (i.id, (i.name.clone(), location_name(i.location_id))))
        .collect();

    let spell_names: HashMap<LocalId, String> = magic::list_spells(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let recipe_names: HashMap<LocalId, String> = alchemy::list_recipes(conn)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let spell_slots = magic::list_spell_slots(conn, character_id)
        .await?
        .into_iter()
        .map(|s| SpellSlotData {
            slot_number: s.slot_number,
            slot_type: s.slot_type,
            volume_points: s.volume_points,
            spell_name: s.spell_id.and_then(|id| spell_names.get(&id).cloned()),
            is_filled: s.is_filled,
            zfp_star: s.zfp_star,
            item_description: s.item_description,
            last_roll_result: s.last_roll_result,
        })
        .collect();

    let potions = alchemy::list_potions(conn, character_id)
        .await?
        .into_iter()
        .map(|p| PotionData {
            guid: p.guid,
            recipe_name: p.recipe_id.and_then(|id| recipe_names.get(&id).cloned()),
            actual_quality: p.actual_quality,
            appearance: p.appearance,
            expiry_date: p.expiry_date,
            analysis_attempts: p.analysis_attempts,
            best_analysis_points: p.best_analysis_points,
            shelf_life_known: p.shelf_life_known,
            known_quality: p.known_quality,
            recipe_revealed: p.recipe_revealed,
        })
        .collect();

    let recipe_knowledge = alchemy::list_recipe_knowledge(conn, character_id)
        .await?
        .into_iter()
        .filter_map(|k| {
            recipe_names
                .get(&k.recipe_id)
                .map(|name| RecipeKnowledgeData {
                    recipe_name: name.clone(),
                    level: k.level,
                })
        })
        .collect();

    let magic_signs = magic::list_magic_signs(conn, character_id)
        .await?
        .into_iter()
        .filter_map(|s| {
            let (item_name, item_location_name) = item_keys.get(&s.item_id)?.clone();
            Some(MagicSignData {
                item_name,
                item_location_name,
                name: s.name,
                effect: s.effect,
                activation_modifier: s.activation_modifier,
                duration: s.duration,
                is_activated: s.is_activated,
                is_botched: s.is_botched,
                expiry_date: s.expiry_date,
            })
        })
        .collect();

    let items = items
        .into_iter()
        .map(|i| ItemData {
            location_name: location_name(i.location_id),
            self_item_for_location_name: if i.is_self_item {
                location_name(i.self_item_for_location_id)
            } else {
                None
            },
            name: i.name,
            weight: i.weight,
            is_purse: i.is_purse,
            kreuzer: i.kreuzer,
            is_countable: i.is_countable,
            quantity: i.quantity,
            is_self_item: i.is_self_item,
            sort_order: i.sort_order,
        })
        .collect();

    let locations = locations
        .into_iter()
        .map(|l| LocationData {
            name: l.name,
            is_default: l.is_default,
            is_carried: l.is_carried,
            sort_order: l.sort_order,
        })
        .collect();

    Ok(CharacterSnapshot {
        version: SNAPSHOT_VERSION,
        character: CharacterData {
            guid: character.guid,
            name: character.name,
            attributes: character.attributes,
            skills: character.skills,
            energies: character.energies,
        },
        group_name,
        spell_slots,
        potions,
        recipe_knowledge,
        locations,
        items,
        magic_signs,
        export_timestamp,
    })
}

#[cfg(test)]
mod tests {
    use dsa_core::{Character, Item, Location, Potion, PotionQuality, SlotType, SpellSlot};

    use super::*;

    #[tokio::test]
    async fn export_uses_natural_keys() {
        let store = Store::in_memory().await.unwrap();
        store.seed_default_catalog().await.unwrap();
        let c = store.create_character(Character::new("Alrik")).await.unwrap();
        let backpack = store.locations(c.id).await.unwrap().remove(1);
        store
            .add_item(Item::new(c.id, "Seil").with_location(Some(backpack.id)))
            .await
            .unwrap();

        let mut conn = store.pool().acquire().await.unwrap();
        let spell = magic::find_spell_by_name(&mut conn, "Ignifaxius")
            .await
            .unwrap()
            .unwrap();
        let mut slot = SpellSlot::new(c.id, 1, SlotType::SpellStorage);
        slot.spell_id = Some(spell.id);
        magic::insert_spell_slot(&mut conn, &slot).await.unwrap();
        let recipe = alchemy::find_recipe_by_name(&mut conn, "Heiltrank")
            .await
            .unwrap()
            .unwrap();
        alchemy::insert_potion(&mut conn, &Potion::new(c.id, Some(recipe.id), PotionQuality::B))
            .await
            .unwrap();
        drop(conn);

        let s = export_character(&store, c.id).await.unwrap();
        assert_eq!(s.version, SNAPSHOT_VERSION);
        assert_eq!(s.character.guid, c.guid);
        assert_eq!(s.group_name.as_deref(), Some("Meine Gruppe"));
        assert_eq!(s.locations.len(), 2);
        assert_eq!(s.spell_slots[0].spell_name.as_deref(), Some("Ignifaxius"));
        assert_eq!(s.potions[0].recipe_name.as_deref(), Some("Heiltrank"));

        let rope = s.items.iter().find(|i| i.name == "Seil").unwrap();
        assert_eq!(rope.location_name.as_deref(), Some(Location::BACKPACK));
        let self_items: Vec<_> = s.items.iter().filter(|i| i.is_self_item).collect();
        assert_eq!(self_items.len(), 2);
        assert!(self_items.iter().all(|i| i.self_item_for_location_name.is_some()));
    }

    #[tokio::test]
    async fn exporting_a_missing_character_fails() {
        let store = Store::in_memory().await.unwrap();
        assert!(matches!(
            export_character(&store, 42).await,
            Err(crate::SyncError::NotFound { entity: "character", .. })
        ));
    }
}
