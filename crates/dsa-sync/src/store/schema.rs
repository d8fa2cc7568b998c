//! Table definitions. Every statement is idempotent so `migrate` can run on
//! every open.

pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS play_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        game_date TEXT NOT NULL,
        is_game_master BOOLEAN NOT NULL DEFAULT FALSE,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        guid TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        group_id INTEGER REFERENCES play_groups(id) ON DELETE SET NULL,
        attributes TEXT NOT NULL,
        skills TEXT NOT NULL,
        energies TEXT NOT NULL,
        last_modified_date INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spells (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        attribute1 TEXT NOT NULL,
        attribute2 TEXT NOT NULL,
        attribute3 TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        brewing_difficulty INTEGER NOT NULL,
        analysis_difficulty INTEGER NOT NULL,
        laboratory TEXT NOT NULL,
        shelf_life TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        is_default BOOLEAN NOT NULL DEFAULT FALSE,
        is_carried BOOLEAN NOT NULL DEFAULT TRUE,
        sort_order INTEGER NOT NULL DEFAULT 0,
        UNIQUE(character_id, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        location_id INTEGER REFERENCES locations(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        weight_ounces INTEGER NOT NULL DEFAULT 0,
        is_purse BOOLEAN NOT NULL DEFAULT FALSE,
        kreuzer INTEGER NOT NULL DEFAULT 0,
        is_countable BOOLEAN NOT NULL DEFAULT FALSE,
        quantity INTEGER NOT NULL DEFAULT 1,
        is_self_item BOOLEAN NOT NULL DEFAULT FALSE,
        self_item_for_location_id INTEGER REFERENCES locations(id) ON DELETE CASCADE,
        sort_order INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_slots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        slot_number INTEGER NOT NULL,
        slot_type TEXT NOT NULL,
        volume_points INTEGER NOT NULL DEFAULT 0,
        spell_id INTEGER REFERENCES spells(id),
        is_filled BOOLEAN NOT NULL DEFAULT FALSE,
        zfp_star INTEGER NOT NULL DEFAULT 0,
        item_description TEXT NOT NULL DEFAULT '',
        last_roll_result TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS potions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        guid TEXT NOT NULL,
        character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        recipe_id INTEGER REFERENCES recipes(id),
        actual_quality TEXT NOT NULL,
        appearance TEXT NOT NULL DEFAULT '',
        expiry_date TEXT NOT NULL DEFAULT '',
        analysis_attempts INTEGER NOT NULL DEFAULT 0,
        best_analysis_points INTEGER NOT NULL DEFAULT 0,
        shelf_life_known BOOLEAN NOT NULL DEFAULT FALSE,
        known_quality TEXT,
        recipe_revealed BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE(character_id, guid)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipe_knowledge (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        recipe_id INTEGER NOT NULL REFERENCES recipes(id),
        level TEXT NOT NULL,
        UNIQUE(character_id, recipe_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS magic_signs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
        item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        effect TEXT NOT NULL DEFAULT '',
        activation_modifier INTEGER NOT NULL DEFAULT 0,
        duration TEXT NOT NULL,
        is_activated BOOLEAN NOT NULL DEFAULT FALSE,
        is_botched BOOLEAN NOT NULL DEFAULT FALSE,
        expiry_date TEXT
    )
    "#,
];
