//! Recipe catalog, potion and recipe knowledge rows.

use dsa_core::{
    Guid, KnowledgeLevel, Laboratory, LocalId, Potion, PotionQuality, Recipe, RecipeKnowledge,
};
use sqlx::SqliteConnection;

use crate::error::{SyncError, SyncResult};

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    name: String,
    brewing_difficulty: i32,
    analysis_difficulty: i32,
    laboratory: String,
    shelf_life: String,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            name: row.name,
            brewing_difficulty: row.brewing_difficulty,
            analysis_difficulty: row.analysis_difficulty,
            laboratory: Laboratory::from_name(&row.laboratory),
            shelf_life: row.shelf_life,
        }
    }
}

const RECIPE_COLUMNS: &str =
    "id, name, brewing_difficulty, analysis_difficulty, laboratory, shelf_life";

/// Insert a catalog recipe, returning its new local id.
pub async fn insert_recipe(conn: &mut SqliteConnection, recipe: &Recipe) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO recipes (name, brewing_difficulty, analysis_difficulty, laboratory, shelf_life)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&recipe.name)
    .bind(recipe.brewing_difficulty)
    .bind(recipe.analysis_difficulty)
    .bind(recipe.laboratory.as_str())
    .bind(&recipe.shelf_life)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Look up a catalog recipe by local id.
pub async fn find_recipe(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Recipe::from))
}

/// Look up a catalog recipe by name.
pub async fn find_recipe_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> SyncResult<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE name = ?"
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Recipe::from))
}

/// The whole recipe catalog, ordered by name.
pub async fn list_recipes(conn: &mut SqliteConnection) -> SyncResult<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY name"
    ))
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Recipe::from).collect())
}

#[derive(sqlx::FromRow)]
struct PotionRow {
    id: i64,
    guid: String,
    character_id: i64,
    recipe_id: Option<i64>,
    actual_quality: String,
    appearance: String,
    expiry_date: String,
    analysis_attempts: i32,
    best_analysis_points: i32,
    shelf_life_known: bool,
    known_quality: Option<String>,
    recipe_revealed: bool,
}

impl TryFrom<PotionRow> for Potion {
    type Error = SyncError;

    fn try_from(row: PotionRow) -> SyncResult<Self> {
        Ok(Potion {
            id: row.id,
            guid: row.guid.parse::<Guid>()?,
            character_id: row.character_id,
            recipe_id: row.recipe_id,
            actual_quality: PotionQuality::from_name(&row.actual_quality),
            appearance: row.appearance,
            expiry_date: row.expiry_date,
            analysis_attempts: row.analysis_attempts,
            best_analysis_points: row.best_analysis_points,
            shelf_life_known: row.shelf_life_known,
            known_quality: row.known_quality.as_deref().map(PotionQuality::from_name),
            recipe_revealed: row.recipe_revealed,
        })
    }
}

/// Insert a potion, returning its new local id.
pub async fn insert_potion(conn: &mut SqliteConnection, potion: &Potion) -> SyncResult<LocalId> {
    let result = sqlx::query(
        "INSERT INTO potions (guid, character_id, recipe_id, actual_quality, appearance,
             expiry_date, analysis_attempts, best_analysis_points, shelf_life_known,
             known_quality, recipe_revealed)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(potion.guid.to_string())
    .bind(potion.character_id)
    .bind(potion.recipe_id)
    .bind(potion.actual_quality.as_str())
    .bind(&potion.appearance)
    .bind(&potion.expiry_date)
    .bind(potion.analysis_attempts)
    .bind(potion.best_analysis_points)
    .bind(potion.shelf_life_known)
    .bind(potion.known_quality.map(PotionQuality::as_str))
    .bind(potion.recipe_revealed)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every content column of a potion. The GUID stays.
pub async fn update_potion(conn: &mut SqliteConnection, potion: &Potion) -> SyncResult<()> {
    sqlx::query(
        "UPDATE potions SET recipe_id = ?, actual_quality = ?, appearance = ?, expiry_date = ?,
             analysis_attempts = ?, best_analysis_points = ?, shelf_life_known = ?,
             known_quality = ?, recipe_revealed = ?
         WHERE id = ?",
    )
    .bind(potion.recipe_id)
    .bind(potion.actual_quality.as_str())
    .bind(&potion.appearance)
    .bind(&potion.expiry_date)
    .bind(potion.analysis_attempts)
    .bind(potion.best_analysis_points)
    .bind(potion.shelf_life_known)
    .bind(potion.known_quality.map(PotionQuality::as_str))
    .bind(potion.recipe_revealed)
    .bind(potion.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// A character's potions.
pub async fn list_potions(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<Vec<Potion>> {
    let rows = sqlx::query_as::<_, PotionRow>(
        "SELECT id, guid, character_id, recipe_id, actual_quality, appearance, expiry_date,
             analysis_attempts, best_analysis_points, shelf_life_known, known_quality,
             recipe_revealed
         FROM potions WHERE character_id = ? ORDER BY id",
    )
    .bind(character_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(Potion::try_from).collect()
}

/// Delete one potion.
pub async fn delete_potion(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<()> {
    sqlx::query("DELETE FROM potions WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct KnowledgeRow {
    id: i64,
    character_id: i64,
    recipe_id: i64,
    level: String,
}

impl From<KnowledgeRow> for RecipeKnowledge {
    fn from(row: KnowledgeRow) -> Self {
        RecipeKnowledge {
            id: row.id,
            character_id: row.character_id,
            recipe_id: row.recipe_id,
            level: KnowledgeLevel::from_name(&row.level),
        }
    }
}

/// Insert or update the knowledge of one recipe.
pub async fn upsert_recipe_knowledge(
    conn: &mut SqliteConnection,
    character_id: LocalId,
    recipe_id: LocalId,
    level: KnowledgeLevel,
) -> SyncResult<()> {
    sqlx::query(
        "INSERT INTO recipe_knowledge (character_id, recipe_id, level) VALUES (?, ?, ?)
         ON CONFLICT(character_id, recipe_id) DO UPDATE SET level = excluded.level",
    )
    .bind(character_id)
    .bind(recipe_id)
    .bind(level.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// A character's recipe knowledge.
pub async fn list_recipe_knowledge(
    conn: &mut SqliteConnection,
    character_id: LocalId,
) -> SyncResult<Vec<RecipeKnowledge>> {
    let rows = sqlx::query_as::<_, KnowledgeRow>(
        "SELECT id, character_id, recipe_id, level FROM recipe_knowledge
         WHERE character_id = ? ORDER BY id",
    )
    .bind(character_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(RecipeKnowledge::from).collect())
}

/// Delete one knowledge row.
pub async fn delete_recipe_knowledge(conn: &mut SqliteConnection, id: LocalId) -> SyncResult<()> {
    sqlx::query("DELETE FROM recipe_knowledge WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
