use dsa_mechanics::regeneration::{PoolRegeneration, apply_regeneration};
use dsa_mechanics::{RandomDice, RegenerationRequest, regenerate};
use dsa_sync::Store;

pub async fn run(store: &Store, key: &str, modifier: i32, seed: Option<u64>) -> Result<(), String> {
    let character = super::find_character(store, key).await?;
    let mut dice = seed.map_or_else(RandomDice::new, RandomDice::seeded);
    let result = regenerate(
        &RegenerationRequest {
            character: &character,
            modifier,
        },
        &mut dice,
    );
    let energies = apply_regeneration(&character.energies, &result);

    let line = |pool: &str, regen: &PoolRegeneration, current: i32, max: i32| {
        println!("  {pool} +{}  ({current}/{max})", regen.total);
    };
    line("LE", &result.le, energies.le_current, energies.le_max);
    if let Some(ae) = &result.ae {
        line("AE", ae, energies.ae_current, energies.ae_max);
    }
    if let Some(ke) = &result.ke {
        line("KE", ke, energies.ke_current, energies.ke_max);
    }

    store
        .save_character(&character.with_energies(energies))
        .await
        .map_err(|e| format!("cannot save character: {e}"))
}
