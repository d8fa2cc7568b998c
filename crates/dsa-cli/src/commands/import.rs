use std::path::Path;

use colored::Colorize;
use dsa_sync::{Store, import_character_json};

pub async fn run(store: &Store, file: &Path, target: Option<&str>) -> Result<(), String> {
    let json = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let target_id = match target {
        Some(key) => Some(super::find_character(store, key).await?.id),
        None => None,
    };

    let outcome = import_character_json(store, &json, target_id)
        .await
        .map_err(|e| format!("import failed: {e}"))?;
    let character = store
        .character(outcome.character_id)
        .await
        .map_err(|e| e.to_string())?;

    let verb = if outcome.created { "Created" } else { "Updated" };
    println!("  {verb} '{}' ({})", character.name, character.guid.short());
    for warning in &outcome.warnings {
        eprintln!("  {} {warning}", "warning:".yellow());
    }

    Ok(())
}
