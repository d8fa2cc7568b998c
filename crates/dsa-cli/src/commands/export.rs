use std::path::Path;

use dsa_sync::{Store, export_character_json};

pub async fn run(store: &Store, key: &str, output: Option<&Path>) -> Result<(), String> {
    let character = super::find_character(store, key).await?;
    let json = export_character_json(store, character.id)
        .await
        .map_err(|e| format!("export failed: {e}"))?;

    if let Some(path) = output {
        std::fs::write(path, &json)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported '{}' to {}", character.name, path.display());
    } else {
        println!("{json}");
    }

    Ok(())
}
