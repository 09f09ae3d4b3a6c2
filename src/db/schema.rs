// src/db/schema.rs

//! Database schema definitions and migrations for Ladle
//!
//! This module defines the SQLite schema for all core tables and provides
//! a migration system to evolve the schema over time.

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the schema version tracking table
fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Apply all pending migrations to bring the database up to date
pub fn migrate(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    debug!("Current schema version: {}", current_version);

    if current_version >= SCHEMA_VERSION {
        debug!("Schema is up to date");
        return Ok(());
    }

    // Apply migrations in order
    for version in (current_version + 1)..=SCHEMA_VERSION {
        info!("Applying migration to version {}", version);
        apply_migration(conn, version)?;
        set_schema_version(conn, version)?;
    }

    info!(
        "Schema migration complete. Now at version {}",
        SCHEMA_VERSION
    );
    Ok(())
}

/// Apply a specific migration version
fn apply_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        _ => panic!("Unknown migration version: {}", version),
    }
}

/// Initial schema - Version 1
///
/// Creates all core tables for Ladle:
/// - users: Accounts with soft lifecycle (active/inactive)
/// - recipes: Owned by a user, soft-deleted via flag
/// - ingredients: Shared catalog, deduplicated by name
/// - recipe_ingredients: Many-to-many link with per-recipe quantity
/// - comments: Append-only, soft-deleted via flag
fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        -- Users: never hard-deleted, moderation toggles `active`
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            active INTEGER NOT NULL DEFAULT 1,
            avatar_url TEXT
        );

        CREATE INDEX idx_users_email ON users(email);
        CREATE INDEX idx_users_username ON users(username);

        -- Recipes: one owning user, soft-deleted via delete_yn
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            instruction TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            user_id INTEGER NOT NULL,
            delete_yn INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE INDEX idx_recipes_user_id ON recipes(user_id);
        CREATE INDEX idx_recipes_created_at ON recipes(created_at);

        -- Ingredients: shared across recipes, created lazily on first use.
        -- The partial unique index makes lookup-or-create race-safe: a
        -- concurrent duplicate insert fails and the caller re-queries.
        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            unit TEXT,
            delete_yn INTEGER NOT NULL DEFAULT 0
        );

        CREATE UNIQUE INDEX idx_ingredients_name_active
            ON ingredients(name) WHERE delete_yn = 0;

        -- Recipe/ingredient links with a per-pair quantity (stored as text)
        CREATE TABLE recipe_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL,
            ingredient_id INTEGER NOT NULL,
            quantity TEXT,
            delete_yn INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            FOREIGN KEY (ingredient_id) REFERENCES ingredients(id)
        );

        CREATE INDEX idx_recipe_ingredients_recipe_id ON recipe_ingredients(recipe_id);
        CREATE INDEX idx_recipe_ingredients_ingredient_id ON recipe_ingredients(ingredient_id);

        -- Comments: append-only, soft-deleted via delete_yn
        CREATE TABLE comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            comment_text TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            delete_yn INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id),
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE INDEX idx_comments_recipe_id ON comments(recipe_id);
        CREATE INDEX idx_comments_created_at ON comments(created_at);
        ",
    )?;

    info!("Schema version 1 created successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        (temp_file, conn)
    }

    #[test]
    fn test_schema_version_tracking() {
        let (_temp, conn) = create_test_db();

        // Initial version should be 0
        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, 0);

        // Set version to 1
        set_schema_version(&conn, 1).unwrap();
        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_migrate_creates_all_tables() {
        let (_temp, conn) = create_test_db();

        migrate(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"recipes".to_string()));
        assert!(tables.contains(&"ingredients".to_string()));
        assert!(tables.contains(&"recipe_ingredients".to_string()));
        assert!(tables.contains(&"comments".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let (_temp, conn) = create_test_db();

        migrate(&conn).unwrap();
        let version1 = get_schema_version(&conn).unwrap();

        migrate(&conn).unwrap();
        let version2 = get_schema_version(&conn).unwrap();

        assert_eq!(version1, version2);
        assert_eq!(version1, SCHEMA_VERSION);
    }

    #[test]
    fn test_unique_username_and_email() {
        let (_temp, conn) = create_test_db();
        migrate(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (name, email, username, password) VALUES (?1, ?2, ?3, ?4)",
            ["Alice", "alice@example.com", "alice", "hash"],
        )
        .unwrap();

        // Duplicate email
        let result = conn.execute(
            "INSERT INTO users (name, email, username, password) VALUES (?1, ?2, ?3, ?4)",
            ["Alice 2", "alice@example.com", "alice2", "hash"],
        );
        assert!(result.is_err());

        // Duplicate username
        let result = conn.execute(
            "INSERT INTO users (name, email, username, password) VALUES (?1, ?2, ?3, ?4)",
            ["Alice 3", "alice3@example.com", "alice", "hash"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ingredient_name_unique_among_active() {
        let (_temp, conn) = create_test_db();
        migrate(&conn).unwrap();

        conn.execute(
            "INSERT INTO ingredients (name, unit) VALUES (?1, ?2)",
            ["Salt", "tsp"],
        )
        .unwrap();

        // Second active row with the same name violates the partial index
        let result = conn.execute(
            "INSERT INTO ingredients (name, unit) VALUES (?1, ?2)",
            ["Salt", "g"],
        );
        assert!(result.is_err());

        // Soft-delete the first row, then the name becomes available again
        conn.execute("UPDATE ingredients SET delete_yn = 1 WHERE name = 'Salt'", [])
            .unwrap();
        conn.execute(
            "INSERT INTO ingredients (name, unit) VALUES (?1, ?2)",
            ["Salt", "g"],
        )
        .unwrap();
    }

    #[test]
    fn test_foreign_key_constraints() {
        let (_temp, conn) = create_test_db();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        migrate(&conn).unwrap();

        // Recipe without an owning user should fail
        let result = conn.execute(
            "INSERT INTO recipes (title, user_id) VALUES (?1, ?2)",
            rusqlite::params!["Phantom Soup", 999],
        );
        assert!(result.is_err());
    }
}
