use colored::Colorize;
use dsa_core::{Attribute, Weight};
use dsa_sync::Store;

pub async fn run(store: &Store, key: &str) -> Result<(), String> {
    let c = super::find_character(store, key).await?;
    let locations = store.locations(c.id).await.map_err(|e| e.to_string())?;
    let items = store.items(c.id).await.map_err(|e| e.to_string())?;

    println!("  {} [{}]", c.name.bold(), c.guid.to_string().dimmed());
    println!();

    let attributes: Vec<_> = Attribute::ALL
        .iter()
        .map(|a| format!("{a} {}", c.attributes.get(*a)))
        .collect();
    println!("  {}", attributes.join("  "));

    let e = &c.energies;
    println!("  LE {}/{}", e.le_current, e.le_max);
    if e.is_spellcaster() {
        println!("  AE {}/{}", e.ae_current, e.ae_max);
    }
    if e.is_blessed() {
        println!("  KE {}/{}", e.ke_current, e.ke_max);
    }
    println!();

    let mut carried = Weight::default();
    for location in &locations {
        let contents: Vec<_> = items
            .iter()
            .filter(|i| i.location_id == Some(location.id))
            .collect();
        let weight = contents
            .iter()
            .fold(Weight::default(), |sum, i| sum + i.total_weight());
        if location.is_carried {
            carried = carried + weight;
        }

        let flag = if location.is_carried { "" } else { " (abgelegt)" };
        println!("  {}{flag}  {}", location.name.bold(), weight.to_string().dimmed());
        for item in contents.iter().filter(|i| !i.is_self_item) {
            let mut line = format!("    {}", item.name);
            if item.is_countable {
                line.push_str(&format!(" ×{}", item.quantity));
            }
            if let Some(purse) = item.purse() {
                line.push_str(&format!(" [{purse}]"));
            }
            println!("{line}");
        }
    }

    let loose: Vec<_> = items.iter().filter(|i| i.location_id.is_none()).collect();
    if !loose.is_empty() {
        println!("  {}", "Ohne Ort".bold());
        for item in loose {
            println!("    {}", item.name);
        }
    }

    println!();
    println!("  Getragen: {carried}");

    Ok(())
}
