// src/db/models/ingredient.rs

//! Ingredient catalog
//!
//! Ingredients are shared across recipes and deduplicated by name:
//! recipe writes resolve each submitted name against the catalog and only
//! create a row the first time a name appears. A partial unique index on
//! active names backs this up, so two concurrent creates of the same new
//! name cannot produce duplicate rows.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// An ingredient catalog row
#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Unit")]
    pub unit: Option<String>,
}

impl Ingredient {
    /// List all non-deleted ingredients
    pub fn list_active(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, unit FROM ingredients WHERE delete_yn = 0 ORDER BY id",
        )?;

        let ingredients = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Find a non-deleted ingredient by exact name
    pub fn find_active_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, unit FROM ingredients WHERE name = ?1 AND delete_yn = 0",
        )?;

        let ingredient = stmt.query_row([name], Self::from_row).optional()?;

        Ok(ingredient)
    }

    /// Look up a non-deleted ingredient by name, creating it if absent.
    ///
    /// The unit of an existing ingredient is left untouched even when the
    /// caller supplies a different one. A constraint conflict on insert
    /// means another writer created the row first; re-query and reuse it.
    pub fn resolve_or_create(conn: &Connection, name: &str, unit: Option<&str>) -> Result<i64> {
        if let Some(existing) = Self::find_active_by_name(conn, name)? {
            return Ok(existing.id);
        }

        let inserted = conn.execute(
            "INSERT INTO ingredients (name, unit, delete_yn) VALUES (?1, ?2, 0)",
            params![name, unit],
        );

        match inserted {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let existing = Self::find_active_by_name(conn, name)?.ok_or_else(|| {
                    crate::Error::Other(format!("Ingredient '{}' vanished during create", name))
                })?;
                Ok(existing.id)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Soft-delete an ingredient
    pub fn soft_delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute(
            "UPDATE ingredients SET delete_yn = 1 WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            unit: row.get(2)?,
        })
    }
}
