//! Seeding the spell and recipe catalogs.
//!
//! Catalog entries are identified across devices by name, so seeding is
//! keyed by name and leaves existing entries alone. Two devices seeded in a
//! different order end up with different local ids for the same spell,
//! which is why snapshots never carry catalog ids.

use dsa_core::{Attribute, Laboratory, Recipe, Spell};
use sqlx::SqliteConnection;

use super::alchemy::{find_recipe_by_name, insert_recipe};
use super::magic::{find_spell_by_name, insert_spell};
use crate::error::SyncResult;

/// Insert every spell and recipe whose name is not present yet. Returns the
/// number of new entries.
pub async fn seed_catalog(
    conn: &mut SqliteConnection,
    spells: &[Spell],
    recipes: &[Recipe],
) -> SyncResult<usize> {
    let mut added = 0;
    for spell in spells {
        if find_spell_by_name(conn, &spell.name).await?.is_none() {
            insert_spell(conn, spell).await?;
            added += 1;
        }
    }
    for recipe in recipes {
        if find_recipe_by_name(conn, &recipe.name).await?.is_none() {
            insert_recipe(conn, recipe).await?;
            added += 1;
        }
    }
    if added > 0 {
        tracing::info!(added, "seeded catalog");
    }
    Ok(added)
}

/// The spells every installation ships with.
pub fn default_spells() -> Vec<Spell> {
    use Attribute::{CH, FF, IN, KL, KO};
    vec![
        Spell::new("Analys Arkanstruktur", [KL, KL, IN]),
        Spell::new("Applicatus", [KL, FF, FF]),
        Spell::new("Armatrutz", [KL, IN, FF]),
        Spell::new("Balsam Salabunde", [KL, IN, CH]),
        Spell::new("Blitz dich find", [KL, IN, KO]),
        Spell::new("Flim Flam Funkel", [KL, KL, CH]),
        Spell::new("Fulminictus", [KL, IN, KO]),
        Spell::new("Ignifaxius", [KL, FF, KO]),
        Spell::new("Odem Arcanum", [KL, IN, IN]),
    ]
}

/// The recipes every installation ships with.
pub fn default_recipes() -> Vec<Recipe> {
    let recipe = |name: &str, brew, analysis, laboratory, shelf_life: &str| Recipe {
        laboratory,
        shelf_life: shelf_life.to_string(),
        ..Recipe::new(name, brew, analysis)
    };
    vec![
        recipe("Heiltrank", 4, 3, Laboratory::Archaic, "1 Jahr"),
        recipe("Wundsalbe", 2, 2, Laboratory::Archaic, "2 Jahre"),
        recipe("Zaubertrank", 8, 6, Laboratory::WitchKitchen, "2 Jahre"),
        recipe("Schlaftrunk", 3, 4, Laboratory::Archaic, "1 Jahr"),
        recipe("Antidot", 6, 5, Laboratory::WitchKitchen, "1 Jahr"),
        recipe("Unsichtbarkeitselixier", 12, 10, Laboratory::Laboratory, "3 Monde"),
        recipe("Feuerfest-Elixier", 10, 8, Laboratory::Laboratory, "6 Monde"),
    ]
}
