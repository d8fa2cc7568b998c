pub mod create;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod probe;
pub mod rest;
pub mod show;
pub mod transfer;

use std::path::Path;

use dsa_core::Character;
use dsa_sync::{Store, SyncConfig};

/// Database file used when neither `--db` nor `DSA_DATABASE_URL` is given.
const DEFAULT_DB_FILE: &str = "dsa.db";

/// Open the store named by `--db`, the environment, or the default file.
pub async fn open_store(db: Option<&Path>) -> Result<Store, String> {
    let config = SyncConfig::from_env();
    let config = match db {
        Some(path) => config.with_database_path(path),
        None if std::env::var_os("DSA_DATABASE_URL").is_some() => config,
        None => config.with_database_path(DEFAULT_DB_FILE),
    };
    Store::open(config)
        .await
        .map_err(|e| format!("cannot open database: {e}"))
}

/// Find a character by exact GUID, GUID prefix, or case-insensitive name.
async fn find_character(store: &Store, key: &str) -> Result<Character, String> {
    let characters = store.characters().await.map_err(|e| e.to_string())?;
    let key = key.trim();
    let lower = key.to_lowercase();

    let mut matches: Vec<_> = characters
        .iter()
        .filter(|c| c.guid.to_string() == lower)
        .collect();
    if matches.is_empty() {
        matches = characters
            .iter()
            .filter(|c| c.name.to_lowercase() == lower)
            .collect();
    }
    if matches.is_empty() && lower.len() >= 4 {
        matches = characters
            .iter()
            .filter(|c| c.guid.to_string().starts_with(&lower))
            .collect();
    }

    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(format!("character not found: \"{key}\"")),
        _ => Err(format!(
            "\"{key}\" is ambiguous: {}",
            matches
                .iter()
                .map(|c| format!("{} ({})", c.name, c.guid.short()))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}
