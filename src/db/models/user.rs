// src/db/models/user.rs

//! User accounts
//!
//! Users are never hard-deleted: moderation flips the `active` flag.
//! Username and email are unique; registration pre-checks both before
//! inserting so the caller gets a conflict error instead of a constraint
//! failure.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// A user account row
#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub username: String,
    /// bcrypt hash, never serialized out of the API
    pub password: String,
    pub role: String,
    pub active: bool,
    pub avatar_url: Option<String>,
}

/// Public projection returned by `/users` (password withheld)
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Active")]
    pub active: bool,
    #[serde(rename = "Role")]
    pub role: String,
}

impl User {
    /// Create a new user with defaults for role/active
    pub fn new(name: String, email: String, username: String, password: String) -> Self {
        Self {
            id: None,
            name,
            email,
            username,
            password,
            role: "user".to_string(),
            active: true,
            avatar_url: None,
        }
    }

    /// Insert this user into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO users (name, email, username, password, role, active, avatar_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &self.name,
                &self.email,
                &self.username,
                &self.password,
                &self.role,
                self.active,
                &self.avatar_url,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Look up by login identifier (matches email OR username)
    pub fn find_by_login(conn: &Connection, login: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, username, password, role, active, avatar_url
             FROM users WHERE email = ?1 OR username = ?1",
        )?;

        let user = stmt.query_row([login], Self::from_row).optional()?;

        Ok(user)
    }

    /// Look up by username
    pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, username, password, role, active, avatar_url
             FROM users WHERE username = ?1",
        )?;

        let user = stmt.query_row([username], Self::from_row).optional()?;

        Ok(user)
    }

    /// True if a user already holds this username or email
    pub fn exists_with_username_or_email(
        conn: &Connection,
        username: &str,
        email: &str,
    ) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
            params![username, email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List all users, including inactive ones (moderation view)
    pub fn list_all(conn: &Connection) -> Result<Vec<UserSummary>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, username, email, active, role FROM users ORDER BY id",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    username: row.get(2)?,
                    email: row.get(3)?,
                    active: row.get(4)?,
                    role: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update name and email for the row matching `username`, returning the
    /// updated row.
    pub fn update_profile(
        conn: &Connection,
        username: &str,
        name: &str,
        email: &str,
    ) -> Result<Option<Self>> {
        conn.execute(
            "UPDATE users SET name = ?1, email = ?2 WHERE username = ?3",
            params![name, email, username],
        )?;

        Self::find_by_username(conn, username)
    }

    /// Flip the active flag (moderation: deactivate / reactivate)
    pub fn set_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
        conn.execute(
            "UPDATE users SET active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        Ok(())
    }

    /// Overwrite the password hash for the user matching `login`
    /// (email or username).
    pub fn update_password_by_login(
        conn: &Connection,
        login: &str,
        password_hash: &str,
    ) -> Result<()> {
        conn.execute(
            "UPDATE users SET password = ?1 WHERE email = ?2 OR username = ?2",
            params![password_hash, login],
        )?;
        Ok(())
    }

    /// Convert a database row to a User
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            username: row.get(3)?,
            password: row.get(4)?,
            role: row.get(5)?,
            active: row.get(6)?,
            avatar_url: row.get(7)?,
        })
    }
}
