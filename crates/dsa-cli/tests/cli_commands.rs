//! Integration tests for the `dsa` CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A snapshot with one extra location, so transfer has something to move.
const ALRIK_SNAPSHOT: &str = r#"{
    "version": 2,
    "character": {
        "guid": "6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11",
        "name": "Alrik",
        "energies": { "leCurrent": 20, "leMax": 30 }
    },
    "locations": [
        { "name": "Am Körper", "isDefault": true, "isCarried": true, "sortOrder": 0 },
        { "name": "Rucksack", "isDefault": true, "isCarried": true, "sortOrder": 1 },
        { "name": "Satteltasche", "isCarried": false, "sortOrder": 2 }
    ],
    "items": [
        { "name": "Kletterseil", "locationName": "Rucksack" },
        { "name": "Zunderkästchen", "locationName": "Satteltasche" },
        { "name": "Satteltasche", "locationName": "Am Körper", "isSelfItem": true,
          "selfItemForLocationName": "Satteltasche" }
    ],
    "exportTimestamp": 1700000000000
}"#;

fn dsa() -> Command {
    let mut cmd = Command::cargo_bin("dsa").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("DSA_DATABASE_URL");
    cmd
}

/// A temp directory holding `dsa.db`, initialized with the catalogs.
fn test_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("dsa.db");
    dsa().arg("--db").arg(&db).arg("init").assert().success();
    (dir, db)
}

fn create(db: &Path, name: &str) {
    dsa()
        .arg("--db")
        .arg(db)
        .args(["create", name])
        .assert()
        .success();
}

fn import_alrik(dir: &TempDir, db: &Path) {
    let file = dir.path().join("alrik.json");
    fs::write(&file, ALRIK_SNAPSHOT).unwrap();
    dsa()
        .arg("--db")
        .arg(db)
        .arg("import")
        .arg(&file)
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// init / create / list
// ---------------------------------------------------------------------------

#[test]
fn init_seeds_catalogs_once() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("dsa.db");

    dsa()
        .arg("--db")
        .arg(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog entries added"));
    assert!(db.exists());

    dsa()
        .arg("--db")
        .arg(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalogs already up to date"));
}

#[test]
fn create_then_list() {
    let (_dir, db) = test_db();
    dsa()
        .arg("--db")
        .arg(&db)
        .args(["create", "Alrik"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created character 'Alrik'"));
    create(&db, "Bosper");

    dsa()
        .arg("--db")
        .arg(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alrik"))
        .stdout(predicate::str::contains("Bosper"))
        .stdout(predicate::str::contains("2 characters"));
}

#[test]
fn create_rejects_blank_name() {
    let (_dir, db) = test_db();
    dsa()
        .arg("--db")
        .arg(&db)
        .args(["create", "  "])
        .assert()
        .failure();
}

#[test]
fn list_empty_database() {
    let (_dir, db) = test_db();
    dsa()
        .arg("--db")
        .arg(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No characters found"));
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_lists_locations_and_items() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["show", "alrik"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LE 20/30"))
        .stdout(predicate::str::contains("Rucksack"))
        .stdout(predicate::str::contains("Kletterseil"))
        .stdout(predicate::str::contains("Satteltasche (abgelegt)"));
}

#[test]
fn show_unknown_character_fails() {
    let (_dir, db) = test_db();
    dsa()
        .arg("--db")
        .arg(&db)
        .args(["show", "Niemand"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("character not found"));
}

#[test]
fn show_accepts_guid_prefix() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);
    dsa()
        .arg("--db")
        .arg(&db)
        .args(["show", "6f1c1f7e"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alrik"));
}

// ---------------------------------------------------------------------------
// export / import
// ---------------------------------------------------------------------------

#[test]
fn export_writes_json_to_stdout() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);

    let output = dsa()
        .arg("--db")
        .arg(&db)
        .args(["export", "Alrik"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["character"]["name"], "Alrik");
    assert_eq!(json["version"], 2);
    assert!(
        json["items"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["locationName"] == "Satteltasche")
    );
}

#[test]
fn export_import_round_trip_between_databases() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);
    let file = dir.path().join("export.json");

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["export", "Alrik", "-o"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 'Alrik'"));

    let other = dir.path().join("other.db");
    dsa()
        .arg("--db")
        .arg(&other)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'Alrik' (6f1c1f7e)"));

    dsa()
        .arg("--db")
        .arg(&other)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'Alrik' (6f1c1f7e)"));

    dsa()
        .arg("--db")
        .arg(&other)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 characters"));
}

#[test]
fn import_into_explicit_target() {
    let (dir, db) = test_db();
    create(&db, "Bosper");
    let file = dir.path().join("alrik.json");
    fs::write(&file, ALRIK_SNAPSHOT).unwrap();

    dsa()
        .arg("--db")
        .arg(&db)
        .arg("import")
        .arg(&file)
        .args(["--target", "Bosper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'Alrik'"));
}

#[test]
fn import_malformed_file_fails() {
    let (dir, db) = test_db();
    let file = dir.path().join("broken.json");
    fs::write(&file, "{ kaputt").unwrap();

    dsa()
        .arg("--db")
        .arg(&db)
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("import failed"));
}

#[test]
fn import_warns_about_unknown_spells() {
    let (dir, db) = test_db();
    let file = dir.path().join("slot.json");
    fs::write(
        &file,
        r#"{
            "version": 2,
            "character": { "guid": "6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11", "name": "Alrik" },
            "spellSlots": [ { "slotNumber": 1, "spellName": "Gibt es nicht", "isFilled": true } ],
            "exportTimestamp": 5
        }"#,
    )
    .unwrap();

    dsa()
        .arg("--db")
        .arg(&db)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains("Gibt es nicht"));
}

// ---------------------------------------------------------------------------
// transfer
// ---------------------------------------------------------------------------

#[test]
fn transfer_moves_location_to_other_character() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);
    create(&db, "Bosper");

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["transfer", "Alrik", "Satteltasche", "Bosper"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Moved 'Satteltasche' from Alrik to Bosper as 'Satteltasche'",
        ));

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["show", "Bosper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zunderkästchen"));
    dsa()
        .arg("--db")
        .arg(&db)
        .args(["show", "Alrik"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zunderkästchen").not());
}

#[test]
fn transfer_refuses_default_locations() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);
    create(&db, "Bosper");

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["transfer", "Alrik", "Rucksack", "Bosper"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transfer failed"));
}

#[test]
fn transfer_unknown_location_fails() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);
    create(&db, "Bosper");

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["transfer", "Alrik", "Truhe", "Bosper"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Alrik has no location \"Truhe\""));
}

// ---------------------------------------------------------------------------
// rest
// ---------------------------------------------------------------------------

#[test]
fn rest_regenerates_life_points() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["rest", "Alrik", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LE +"))
        .stdout(predicate::str::contains("AE").not());
}

#[test]
fn rest_accepts_negative_modifier() {
    let (dir, db) = test_db();
    import_alrik(&dir, &db);

    dsa()
        .arg("--db")
        .arg(&db)
        .args(["rest", "Alrik", "-m", "-3", "-s", "1"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// probe
// ---------------------------------------------------------------------------

#[test]
fn probe_with_fixed_rolls() {
    dsa()
        .args([
            "probe",
            "--skill",
            "10",
            "--attributes",
            "10,10,10",
            "--rolls",
            "5,5,5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[5, 5, 5] gelungen, 10 TaP*"));
}

#[test]
fn spell_probe_reports_zfp() {
    dsa()
        .args([
            "probe",
            "--skill",
            "6",
            "--attributes",
            "12,12,12",
            "--rolls",
            "3,4,5",
            "--spell",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("gelungen, 6 ZfP*"));
}

#[test]
fn probe_reports_double_twenty() {
    dsa()
        .args([
            "probe",
            "--skill",
            "15",
            "--attributes",
            "14,14,14",
            "--rolls",
            "20,20,3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patzer (Doppel-20)"));
}

#[test]
fn probe_needs_three_attributes() {
    dsa()
        .args(["probe", "--skill", "5", "--attributes", "12,13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected three attribute values"));
}

#[test]
fn probe_rejects_impossible_rolls() {
    dsa()
        .args([
            "probe",
            "--skill",
            "5",
            "--attributes",
            "12,13,11",
            "--rolls",
            "0,21,3",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a W20 result"));
}

#[test]
fn seeded_probe_is_reproducible() {
    let run = || {
        dsa()
            .args([
                "probe",
                "--skill",
                "7",
                "--attributes",
                "12,13,11",
                "--seed",
                "42",
            ])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}
