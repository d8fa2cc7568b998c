//! Import Reconciler: merge a snapshot into the live graph.
//!
//! The whole merge runs in one transaction while holding the store's writer
//! lock, so readers never observe a half-applied snapshot and two imports
//! never interleave. Applying the same snapshot any number of times leaves
//! the same graph behind.
//!
//! Entities are reconciled by natural key in dependency order:
//!
//! 1. the character (by explicit target, then by GUID, else created),
//! 2. its group (by name),
//! 3. locations (by name),
//! 4. items, including self-items (recreated; locations by name),
//! 5. spell slots (recreated; spells by name),
//! 6. potions (by GUID; rewritten only when their content differs),
//! 7. recipe knowledge (by recipe name),
//! 8. magic signs (recreated; items by location name plus item name).
//!
//! The character's `last_modified_date` is set to the snapshot's export
//! timestamp as the very last write.

use std::collections::{BTreeMap, HashMap, HashSet};

use dsa_core::{Character, Guid, Item, LocalId, Location, MagicSign, Potion, SpellSlot};
use sqlx::SqliteConnection;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::snapshot::CharacterSnapshot;
use crate::store::{Store, alchemy, characters, inventory, magic};

/// What an import did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Local id of the character the snapshot was applied to.
    pub character_id: LocalId,
    /// Whether the character was created by this import.
    pub created: bool,
    /// Non-fatal problems: degraded references, skipped duplicates, and a
    /// disagreement between an explicit target and a GUID match.
    pub warnings: Vec<String>,
}

impl ImportOutcome {
    /// All warnings joined into one message, `None` if there were none.
    pub fn warning(&self) -> Option<String> {
        (!self.warnings.is_empty()).then(|| self.warnings.join("; "))
    }
}

/// Decode a JSON snapshot and import it.
pub async fn import_character_json(
    store: &Store,
    json: &str,
    target_character_id: Option<LocalId>,
) -> SyncResult<ImportOutcome> {
    let snapshot = CharacterSnapshot::from_json(json)?;
    import_character(store, &snapshot, target_character_id).await
}

/// Import a snapshot, into `target_character_id` when given.
///
/// Without an explicit target the character is matched by GUID. If nothing
/// matches, a new character is created when the store's configuration
/// allows it.
pub async fn import_character(
    store: &Store,
    snapshot: &CharacterSnapshot,
    target_character_id: Option<LocalId>,
) -> SyncResult<ImportOutcome> {
    let allow_create_new = store.config().allow_create_new;
    reconcile(store, snapshot, target_character_id, allow_create_new).await
}

/// Apply a snapshot received from a peer. The character is matched by GUID
/// only; an unknown GUID is created when `allow_create_new` is set and is a
/// `NotFound` error otherwise.
pub async fn apply_snapshot_from_sync(
    store: &Store,
    snapshot: &CharacterSnapshot,
    allow_create_new: bool,
) -> SyncResult<ImportOutcome> {
    reconcile(store, snapshot, None, allow_create_new).await
}

async fn reconcile(
    store: &Store,
    snapshot: &CharacterSnapshot,
    target_character_id: Option<LocalId>,
    allow_create_new: bool,
) -> SyncResult<ImportOutcome> {
    let guid = snapshot.character.guid;
    let _writer = store.write_lock().await;
    let mut tx = store.begin().await?;

    let mut reconciler = Reconciler::new(&mut tx, store.config(), snapshot);
    let (character_id, created) = reconciler
        .character(target_character_id, allow_create_new)
        .await
        .map_err(abort(guid, "character"))?;
    reconciler.locations().await.map_err(abort(guid, "locations"))?;
    reconciler.items().await.map_err(abort(guid, "items"))?;
    reconciler.spell_slots().await.map_err(abort(guid, "spell slots"))?;
    reconciler.potions().await.map_err(abort(guid, "potions"))?;
    reconciler
        .recipe_knowledge()
        .await
        .map_err(abort(guid, "recipe knowledge"))?;
    reconciler.magic_signs().await.map_err(abort(guid, "magic signs"))?;
    characters::set_last_modified(reconciler.conn, character_id, snapshot.export_timestamp)
        .await
        .map_err(abort(guid, "timestamp"))?;
    let warnings = reconciler.warnings;

    tx.commit().await?;
    tracing::info!(
        character = %guid.short(),
        id = character_id,
        created,
        warnings = warnings.len(),
        "imported snapshot"
    );
    Ok(ImportOutcome {
        character_id,
        created,
        warnings,
    })
}

/// Log a failed step before the transaction is rolled back.
fn abort(guid: Guid, step: &'static str) -> impl FnOnce(SyncError) -> SyncError {
    move |err| {
        match &err {
            SyncError::Integrity(message) => {
                tracing::error!(character = %guid, step, error = %message, "integrity violation, import aborted");
            }
            other => tracing::debug!(character = %guid, step, error = %other, "import aborted"),
        }
        err
    }
}

struct Reconciler<'a> {
    conn: &'a mut SqliteConnection,
    config: &'a SyncConfig,
    snapshot: &'a CharacterSnapshot,
    character_id: LocalId,
    warnings: Vec<String>,
    /// Reconciled locations by name.
    locations: BTreeMap<String, Location>,
    /// Recreated items by (snapshot location name, item name), first wins.
    items: HashMap<(Option<String>, String), LocalId>,
}

impl<'a> Reconciler<'a> {
    fn new(
        conn: &'a mut SqliteConnection,
        config: &'a SyncConfig,
        snapshot: &'a CharacterSnapshot,
    ) -> Self {
        Self {
            conn,
            config,
            snapshot,
            character_id: 0,
            warnings: Vec::new(),
            locations: BTreeMap::new(),
            items: HashMap::new(),
        }
    }

    fn warn(&mut self, message: String) {
        tracing::warn!(character = %self.snapshot.character.guid.short(), "{message}");
        self.warnings.push(message);
    }

    /// Resolve and write the character row. Local id, GUID and an existing
    /// group are kept; only content fields come from the snapshot.
    async fn character(
        &mut self,
        target_character_id: Option<LocalId>,
        allow_create_new: bool,
    ) -> SyncResult<(LocalId, bool)> {
        let snapshot = self.snapshot;
        let data = &snapshot.character;
        let by_guid = characters::find_character_by_guid(self.conn, &data.guid).await?;

        let existing = match target_character_id {
            Some(target) => {
                let character = characters::get_character(self.conn, target).await?;
                if let Some(other) = by_guid.filter(|c| c.id != target) {
                    self.warn(format!(
                        "snapshot GUID {} belongs to '{}' (id {}), imported into '{}' (id {}) as requested",
                        data.guid, other.name, other.id, character.name, character.id
                    ));
                }
                Some(character)
            }
            None => by_guid,
        };

        let (character_id, created) = match existing {
            Some(local) => {
                let group_id = match local.group_id {
                    Some(id) => id,
                    None => self.group_id().await?,
                };
                let updated = Character {
                    name: data.name.clone(),
                    group_id: Some(group_id),
                    attributes: data.attributes,
                    skills: data.skills.clone(),
                    energies: data.energies.clone(),
                    ..local
                };
                characters::update_character(self.conn, &updated).await?;
                (updated.id, false)
            }
            None if allow_create_new => {
                let group_id = self.group_id().await?;
                let new = Character {
                    id: 0,
                    guid: data.guid,
                    name: data.name.clone(),
                    group_id: Some(group_id),
                    attributes: data.attributes,
                    skills: data.skills.clone(),
                    energies: data.energies.clone(),
                    last_modified_date: snapshot.export_timestamp,
                };
                (characters::insert_character(self.conn, &new).await?, true)
            }
            None => return Err(SyncError::not_found("character", data.guid)),
        };
        self.character_id = character_id;
        tracing::debug!(id = character_id, created, "character resolved");
        Ok((character_id, created))
    }

    /// The snapshot's group, created if this store does not know it yet.
    async fn group_id(&mut self) -> SyncResult<LocalId> {
        let snapshot = self.snapshot;
        let name = snapshot
            .group_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.config.default_group_name);
        Ok(characters::find_or_create_group(self.conn, name).await?.id)
    }

    /// Match locations by name. Snapshot locations without a local match are
    /// created without a self-item; local ones absent from the snapshot are
    /// deleted unless they are default locations, which are always kept.
    async fn locations(&mut self) -> SyncResult<()> {
        let snapshot = self.snapshot;
        let mut local: HashMap<String, Location> =
            inventory::list_locations(self.conn, self.character_id)
                .await?
                .into_iter()
                .map(|l| (l.name.clone(), l))
                .collect();

        for data in &snapshot.locations {
            if self.locations.contains_key(&data.name) {
                self.warn(format!("duplicate location '{}' skipped", data.name));
                continue;
            }
            let location = match local.remove(&data.name) {
                Some(existing) => {
                    let updated = Location {
                        is_default: data.is_default,
                        is_carried: data.is_carried,
                        sort_order: data.sort_order,
                        ..existing.clone()
                    };
                    if updated != existing {
                        inventory::update_location(self.conn, &updated).await?;
                    }
                    updated
                }
                None => {
                    let new = Location {
                        is_default: data.is_default,
                        is_carried: data.is_carried,
                        sort_order: data.sort_order,
                        ..Location::new(self.character_id, data.name.clone())
                    };
                    Location {
                        id: inventory::insert_location(self.conn, &new).await?,
                        ..new
                    }
                }
            };
            self.locations.insert(location.name.clone(), location);
        }

        for default in Location::defaults(self.character_id) {
            if self.locations.contains_key(&default.name) {
                continue;
            }
            let location = match local.remove(&default.name) {
                Some(existing) => existing,
                None => Location {
                    id: inventory::insert_location(self.conn, &default).await?,
                    ..default
                },
            };
            self.locations.insert(location.name.clone(), location);
        }

        for (name, stale) in local {
            if stale.is_default {
                self.locations.insert(name, stale);
            } else {
                tracing::debug!(location = %name, "deleting location absent from snapshot");
                inventory::delete_location_row(self.conn, stale.id).await?;
            }
        }
        Ok(())
    }

    fn location_id(&self, name: &str) -> Option<LocalId> {
        self.locations.get(name).map(|l| l.id)
    }

    /// Recreate every item. Each location ends up with exactly one
    /// self-item: the snapshot's if it carries one, a synthesized one
    /// otherwise.
    async fn items(&mut self) -> SyncResult<()> {
        let snapshot = self.snapshot;
        inventory::delete_items_of_character(self.conn, self.character_id).await?;

        let mut has_self_item: HashSet<LocalId> = HashSet::new();
        for data in &snapshot.items {
            let location_id = match data.location_name.as_deref() {
                Some(name) => {
                    let id = self.location_id(name);
                    if id.is_none() && !data.is_self_item {
                        self.warn(format!(
                            "item '{}' references unknown location '{name}', stored without location",
                            data.name
                        ));
                    }
                    id
                }
                None => None,
            };

            let mut item = Item {
                location_id,
                weight: data.weight,
                is_purse: data.is_purse,
                kreuzer: data.kreuzer,
                is_countable: data.is_countable,
                quantity: data.quantity,
                sort_order: data.sort_order,
                ..Item::new(self.character_id, data.name.clone())
            };

            if data.is_self_item {
                let owner = data
                    .self_item_for_location_name
                    .as_deref()
                    .or(data.location_name.as_deref())
                    .and_then(|name| self.location_id(name));
                match owner {
                    Some(owner) if has_self_item.insert(owner) => {
                        item.is_self_item = true;
                        item.self_item_for_location_id = Some(owner);
                        item.location_id = item.location_id.or(Some(owner));
                    }
                    Some(_) => {
                        self.warn(format!("duplicate self-item '{}' skipped", data.name));
                        continue;
                    }
                    None => {
                        self.warn(format!(
                            "self-item '{}' has no resolvable location, skipped",
                            data.name
                        ));
                        continue;
                    }
                }
            }

            let id = inventory::insert_item(self.conn, &item).await?;
            self.items
                .entry((data.location_name.clone(), data.name.clone()))
                .or_insert(id);
        }

        for location in self.locations.values() {
            if !has_self_item.contains(&location.id) {
                tracing::debug!(location = %location.name, "synthesizing self-item");
                inventory::insert_item(self.conn, &Item::self_item_for(location)).await?;
            }
        }
        Ok(())
    }

    async fn spell_slots(&mut self) -> SyncResult<()> {
        let snapshot = self.snapshot;
        let spells: HashMap<String, LocalId> = magic::list_spells(self.conn)
            .await?
            .into_iter()
            .map(|s| (s.name, s.id))
            .collect();
        magic::delete_spell_slots_of_character(self.conn, self.character_id).await?;

        for data in &snapshot.spell_slots {
            let spell_id = match data.spell_name.as_deref() {
                Some(name) => {
                    let id = spells.get(name).copied();
                    if id.is_none() {
                        self.warn(format!(
                            "slot {} references unknown spell '{name}', stored without spell",
                            data.slot_number
                        ));
                    }
                    id
                }
                None => None,
            };
            let slot = SpellSlot {
                volume_points: data.volume_points,
                spell_id,
                is_filled: data.is_filled,
                zfp_star: data.zfp_star,
                item_description: data.item_description.clone(),
                last_roll_result: data.last_roll_result.clone(),
                ..SpellSlot::new(self.character_id, data.slot_number, data.slot_type)
            };
            magic::insert_spell_slot(self.conn, &slot).await?;
        }
        Ok(())
    }

    async fn recipes(&mut self) -> SyncResult<HashMap<String, LocalId>> {
        Ok(alchemy::list_recipes(self.conn)
            .await?
            .into_iter()
            .map(|r| (r.name, r.id))
            .collect())
    }

    /// Match potions by GUID. Unchanged potions are left untouched.
    async fn potions(&mut self) -> SyncResult<()> {
        let snapshot = self.snapshot;
        let recipes = self.recipes().await?;
        let mut local: HashMap<Guid, Potion> = alchemy::list_potions(self.conn, self.character_id)
            .await?
            .into_iter()
            .map(|p| (p.guid, p))
            .collect();
        let mut seen = HashSet::new();

        for data in &snapshot.potions {
            if !seen.insert(data.guid) {
                self.warn(format!("duplicate potion {} skipped", data.guid));
                continue;
            }
            let recipe_id = match data.recipe_name.as_deref() {
                Some(name) => {
                    let id = recipes.get(name).copied();
                    if id.is_none() {
                        self.warn(format!(
                            "potion {} references unknown recipe '{name}', stored without recipe",
                            data.guid.short()
                        ));
                    }
                    id
                }
                None => None,
            };
            let incoming = Potion {
                id: 0,
                guid: data.guid,
                character_id: self.character_id,
                recipe_id,
                actual_quality: data.actual_quality,
                appearance: data.appearance.clone(),
                expiry_date: data.expiry_date.clone(),
                analysis_attempts: data.analysis_attempts,
                best_analysis_points: data.best_analysis_points,
                shelf_life_known: data.shelf_life_known,
                known_quality: data.known_quality,
                recipe_revealed: data.recipe_revealed,
            };
            match local.remove(&data.guid) {
                Some(existing) if existing.content_differs(&incoming) => {
                    alchemy::update_potion(self.conn, &Potion { id: existing.id, ..incoming })
                        .await?;
                }
                Some(_) => {}
                None => {
                    alchemy::insert_potion(self.conn, &incoming).await?;
                }
            }
        }

        for stale in local.into_values() {
            alchemy::delete_potion(self.conn, stale.id).await?;
        }
        Ok(())
    }

    async fn recipe_knowledge(&mut self) -> SyncResult<()> {
        let snapshot = self.snapshot;
        let recipes = self.recipes().await?;
        let mut kept = HashSet::new();
        for data in &snapshot.recipe_knowledge {
            match recipes.get(&data.recipe_name) {
                Some(&recipe_id) => {
                    alchemy::upsert_recipe_knowledge(
                        self.conn,
                        self.character_id,
                        recipe_id,
                        data.level,
                    )
                    .await?;
                    kept.insert(recipe_id);
                }
                None => self.warn(format!(
                    "knowledge of unknown recipe '{}' skipped",
                    data.recipe_name
                )),
            }
        }
        for stale in alchemy::list_recipe_knowledge(self.conn, self.character_id).await? {
            if !kept.contains(&stale.recipe_id) {
                alchemy::delete_recipe_knowledge(self.conn, stale.id).await?;
            }
        }
        Ok(())
    }

    /// Recreate magic signs. Their old rows went with the items.
    async fn magic_signs(&mut self) -> SyncResult<()> {
        let snapshot = self.snapshot;
        for data in &snapshot.magic_signs {
            let key = (data.item_location_name.clone(), data.item_name.clone());
            let item_id = self.items.get(&key).copied();
            let Some(item_id) = item_id else {
                self.warn(format!(
                    "magic sign '{}' references unknown item '{}', skipped",
                    data.name, data.item_name
                ));
                continue;
            };
            let sign = MagicSign {
                effect: data.effect.clone(),
                activation_modifier: data.activation_modifier,
                duration: data.duration,
                is_activated: data.is_activated,
                is_botched: data.is_botched,
                expiry_date: data.expiry_date.clone(),
                ..MagicSign::new(self.character_id, item_id, data.name.clone())
            };
            magic::insert_magic_sign(self.conn, &sign).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dsa_core::{Attributes, PotionQuality};

    use super::*;
    use crate::export::export_character;
    use crate::snapshot::{CharacterData, ItemData, LocationData};

    fn bare_snapshot(name: &str) -> CharacterSnapshot {
        CharacterSnapshot {
            version: crate::SNAPSHOT_VERSION,
            character: CharacterData {
                guid: Guid::new(),
                name: name.into(),
                attributes: Attributes::uniform(11),
                skills: Default::default(),
                energies: Default::default(),
            },
            group_name: None,
            spell_slots: vec![],
            potions: vec![],
            recipe_knowledge: vec![],
            locations: vec![],
            items: vec![],
            magic_signs: vec![],
            export_timestamp: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn missing_locations_fall_back_to_defaults() {
        let store = Store::in_memory().await.unwrap();
        let outcome = import_character(&store, &bare_snapshot("Alrik"), None)
            .await
            .unwrap();
        assert!(outcome.created);
        assert!(outcome.warning().is_none());

        let locations = store.locations(outcome.character_id).await.unwrap();
        assert_eq!(locations.len(), 2);
        assert!(locations.iter().all(|l| l.is_default));
        let items = store.items(outcome.character_id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.is_self_item));
    }

    #[tokio::test]
    async fn groupless_import_lands_in_default_group() {
        let store = Store::in_memory().await.unwrap();
        let outcome = import_character(&store, &bare_snapshot("Alrik"), None)
            .await
            .unwrap();
        let c = store.character(outcome.character_id).await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();
        let group = characters::find_group(&mut conn, c.group_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(group.name, "Meine Gruppe");
        assert!(!group.is_game_master);
    }

    #[tokio::test]
    async fn named_group_is_created_once() {
        let store = Store::in_memory().await.unwrap();
        let mut a = bare_snapshot("Alrik");
        a.group_name = Some("Die Streuner".into());
        let mut b = bare_snapshot("Bosper");
        b.group_name = Some("Die Streuner".into());
        let a = import_character(&store, &a, None).await.unwrap();
        let b = import_character(&store, &b, None).await.unwrap();
        let ca = store.character(a.character_id).await.unwrap();
        let cb = store.character(b.character_id).await.unwrap();
        assert_eq!(ca.group_id, cb.group_id);
    }

    #[tokio::test]
    async fn duplicate_self_items_collapse() {
        let store = Store::in_memory().await.unwrap();
        let mut s = bare_snapshot("Alrik");
        s.locations.push(LocationData {
            name: "Satteltasche".into(),
            is_default: false,
            is_carried: true,
            sort_order: 2,
        });
        for _ in 0..2 {
            s.items.push(ItemData {
                name: "Satteltasche".into(),
                location_name: Some("Satteltasche".into()),
                weight: Default::default(),
                is_purse: false,
                kreuzer: 0,
                is_countable: false,
                quantity: 1,
                is_self_item: true,
                self_item_for_location_name: Some("Satteltasche".into()),
                sort_order: -1,
            });
        }
        let outcome = import_character(&store, &s, None).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        let self_items = store
            .items(outcome.character_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.is_self_item)
            .count();
        assert_eq!(self_items, 3);
    }

    #[tokio::test]
    async fn unchanged_potions_keep_their_rows() {
        let store = Store::in_memory().await.unwrap();
        store.seed_default_catalog().await.unwrap();
        let c = store.create_character(dsa_core::Character::new("Alrik")).await.unwrap();
        let mut conn = store.pool().acquire().await.unwrap();
        let potion = Potion::new(c.id, None, PotionQuality::D);
        let potion_id = alchemy::insert_potion(&mut conn, &potion).await.unwrap();
        drop(conn);

        let snapshot = export_character(&store, c.id).await.unwrap();
        import_character(&store, &snapshot, None).await.unwrap();

        let mut conn = store.pool().acquire().await.unwrap();
        let potions = alchemy::list_potions(&mut conn, c.id).await.unwrap();
        assert_eq!(potions.len(), 1);
        assert_eq!(potions[0].id, potion_id);
    }

    #[tokio::test]
    async fn failed_import_leaves_prior_state() {
        let store = Store::in_memory().await.unwrap();
        let c = store.create_character(dsa_core::Character::new("Alrik")).await.unwrap();
        let before = store.items(c.id).await.unwrap();

        let mut s = export_character(&store, c.id).await.unwrap();
        s.character.name = "Umbenannt".into();
        let err = import_character(&store, &s, Some(c.id + 100)).await;
        assert!(matches!(err, Err(SyncError::NotFound { .. })));

        assert_eq!(store.character(c.id).await.unwrap().name, "Alrik");
        assert_eq!(store.items(c.id).await.unwrap(), before);
    }
}
