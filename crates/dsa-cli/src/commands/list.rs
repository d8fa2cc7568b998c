use chrono::{DateTime, Local};
use comfy_table::{ContentArrangement, Table};
use dsa_sync::Store;

pub async fn run(store: &Store) -> Result<(), String> {
    let characters = store.characters().await.map_err(|e| e.to_string())?;

    if characters.is_empty() {
        println!("  No characters found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "GUID", "LE", "AE", "KE", "Last modified"]);

    for c in &characters {
        let pool = |current: i32, max: i32| {
            if max > 0 {
                format!("{current}/{max}")
            } else {
                "—".to_string()
            }
        };
        let modified = DateTime::from_timestamp_millis(c.last_modified_date)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "—".to_string());
        table.add_row(vec![
            c.name.clone(),
            c.guid.short(),
            pool(c.energies.le_current, c.energies.le_max),
            pool(c.energies.ae_current, c.energies.ae_max),
            pool(c.energies.ke_current, c.energies.ke_max),
            modified,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} characters", characters.len());

    Ok(())
}
