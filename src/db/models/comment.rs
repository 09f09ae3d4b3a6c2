// src/db/models/comment.rs

//! Recipe comments
//!
//! Comments are append-only: they are inserted with a server-assigned
//! timestamp and only ever removed by flipping the soft-delete flag.

use crate::error::Result;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

pub struct Comment;

/// A comment joined to its author, as returned by the list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CommentRecord {
    #[serde(rename = "CommentID")]
    pub id: i64,
    #[serde(rename = "Comment_text")]
    pub comment_text: String,
    #[serde(rename = "Created_at")]
    pub created_at: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Avatar_url")]
    pub avatar_url: Option<String>,
}

/// Per-recipe comment count. Always present: a recipe with no comments
/// reports a count of zero rather than a missing row.
#[derive(Debug, Clone, Serialize)]
pub struct CommentCount {
    #[serde(rename = "Recipe_id")]
    pub recipe_id: i64,
    #[serde(rename = "Comment_Count")]
    pub comment_count: i64,
}

impl Comment {
    /// Insert a comment with a server-assigned timestamp
    pub fn insert(conn: &Connection, recipe_id: i64, user_id: i64, text: &str) -> Result<i64> {
        conn.execute(
            "INSERT INTO comments (recipe_id, user_id, comment_text, created_at, delete_yn)
             VALUES (?1, ?2, ?3, datetime('now'), 0)",
            params![recipe_id, user_id, text],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Non-deleted comments for a recipe, newest first, joined to the
    /// author's name and avatar.
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> Result<Vec<CommentRecord>> {
        let mut stmt = conn.prepare(
            "SELECT c.id, c.comment_text, c.created_at, u.name AS author, u.avatar_url
             FROM comments c
             JOIN users u ON c.user_id = u.id
             WHERE c.delete_yn = 0 AND c.recipe_id = ?1
             ORDER BY c.created_at DESC, c.id DESC",
        )?;

        let comments = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Count of non-deleted comments for a recipe
    pub fn count_for_recipe(conn: &Connection, recipe_id: i64) -> Result<CommentCount> {
        let comment_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE delete_yn = 0 AND recipe_id = ?1",
            [recipe_id],
            |row| row.get(0),
        )?;

        Ok(CommentCount {
            recipe_id,
            comment_count,
        })
    }

    /// Soft-delete a comment
    pub fn soft_delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("UPDATE comments SET delete_yn = 1 WHERE id = ?1", [id])?;
        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<CommentRecord> {
        Ok(CommentRecord {
            id: row.get(0)?,
            comment_text: row.get(1)?,
            created_at: row.get(2)?,
            author: row.get(3)?,
            avatar_url: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewRecipe, Recipe, User};
    use crate::db::schema;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    fn seed_recipe(conn: &mut Connection) -> (i64, i64) {
        let mut user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "alice".to_string(),
            "hash".to_string(),
        );
        let user_id = user.insert(conn).unwrap();

        let recipe_id = Recipe::create_with_ingredients(
            conn,
            &NewRecipe {
                title: "Soup".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id,
            },
            &[],
        )
        .unwrap();

        (user_id, recipe_id)
    }

    #[test]
    fn test_count_is_zero_for_uncommented_recipe() {
        let (_temp, mut conn) = create_test_db();
        let (_user_id, recipe_id) = seed_recipe(&mut conn);

        let count = Comment::count_for_recipe(&conn, recipe_id).unwrap();
        assert_eq!(count.recipe_id, recipe_id);
        assert_eq!(count.comment_count, 0);
    }

    #[test]
    fn test_insert_list_and_count() {
        let (_temp, mut conn) = create_test_db();
        let (user_id, recipe_id) = seed_recipe(&mut conn);

        Comment::insert(&conn, recipe_id, user_id, "Looks great").unwrap();
        Comment::insert(&conn, recipe_id, user_id, "Made it twice").unwrap();

        let comments = Comment::list_for_recipe(&conn, recipe_id).unwrap();
        assert_eq!(comments.len(), 2);
        // Newest first
        assert_eq!(comments[0].comment_text, "Made it twice");
        assert_eq!(comments[0].author, "Alice");

        let count = Comment::count_for_recipe(&conn, recipe_id).unwrap();
        assert_eq!(count.comment_count, 2);
    }

    #[test]
    fn test_soft_delete_excludes_from_list_and_count() {
        let (_temp, mut conn) = create_test_db();
        let (user_id, recipe_id) = seed_recipe(&mut conn);

        let comment_id = Comment::insert(&conn, recipe_id, user_id, "Delete me").unwrap();
        Comment::soft_delete(&conn, comment_id).unwrap();

        assert!(Comment::list_for_recipe(&conn, recipe_id).unwrap().is_empty());
        assert_eq!(
            Comment::count_for_recipe(&conn, recipe_id).unwrap().comment_count,
            0
        );

        // Row persists in storage
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, 1);
    }
}
