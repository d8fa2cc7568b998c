use dsa_sync::Store;

pub async fn run(store: &Store) -> Result<(), String> {
    let seeded = store
        .seed_default_catalog()
        .await
        .map_err(|e| format!("cannot seed catalogs: {e}"))?;

    println!("Initialized {}", store.config().database_url);
    if seeded > 0 {
        println!("  {seeded} catalog entries added");
    } else {
        println!("  catalogs already up to date");
    }
    println!();
    println!("Get started:");
    println!("  dsa create <name>   # Create a character");
    println!("  dsa list            # List characters");
    println!("  dsa export <name>   # Write a snapshot for another device");

    Ok(())
}
