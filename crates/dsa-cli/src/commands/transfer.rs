use dsa_sync::{Store, transfer_location_to_character};

pub async fn run(store: &Store, from: &str, location: &str, to: &str) -> Result<(), String> {
    let source = super::find_character(store, from).await?;
    let target = super::find_character(store, to).await?;
    let locations = store.locations(source.id).await.map_err(|e| e.to_string())?;
    let found = locations
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(location.trim()))
        .ok_or_else(|| format!("{} has no location \"{location}\"", source.name))?;

    let moved = transfer_location_to_character(store, found.id, target.id)
        .await
        .map_err(|e| format!("transfer failed: {e}"))?;

    println!(
        "  Moved '{}' from {} to {} as '{}'",
        found.name, source.name, target.name, moved.name
    );
    Ok(())
}
