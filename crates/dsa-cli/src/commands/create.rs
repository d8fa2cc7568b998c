use dsa_core::Character;
use dsa_sync::Store;

pub async fn run(store: &Store, name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("character name must not be empty".into());
    }
    let character = store
        .create_character(Character::new(name))
        .await
        .map_err(|e| format!("cannot create character: {e}"))?;

    println!("Created character '{}' ({})", character.name, character.guid);
    Ok(())
}
