// src/db/models/recipe.rs

//! Recipes and their ingredient associations
//!
//! Reads join recipes against users and (left-joined) the ingredient link
//! table, then fold the flat row stream into nested recipe objects. Writes
//! run inside a single transaction: the recipe row and the full replacement
//! of its ingredient links commit or roll back together.

use crate::db::models::Ingredient;
use crate::error::Result;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One ingredient entry inside a recipe, both on the wire (submission and
/// response) and between the handler and the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Quantity", default, deserialize_with = "quantity_as_text")]
    pub quantity: Option<String>,
    #[serde(rename = "Unit", default)]
    pub unit: Option<String>,
}

/// Quantities arrive as JSON strings or numbers; either way they are stored
/// as text.
fn quantity_as_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Fields for a recipe insert
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub image_url: Option<String>,
    pub user_id: i64,
}

/// Fields for a recipe update. `image_url = None` means "no new photo":
/// the column is left out of the SET clause and the prior value survives.
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub image_url: Option<String>,
    pub user_id: i64,
}

/// A recipe as returned by the list/search endpoints, with its ingredient
/// list embedded.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRecord {
    #[serde(rename = "RecipeID")]
    pub id: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Image_url")]
    pub image_url: Option<String>,
    #[serde(rename = "Instruction")]
    pub instruction: Option<String>,
    #[serde(rename = "Created_at")]
    pub created_at: String,
    #[serde(rename = "Update_at")]
    pub updated_at: String,
    #[serde(rename = "DeleteYn")]
    pub delete_yn: i64,
    #[serde(rename = "User_id")]
    pub user_id: i64,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Ingredients")]
    pub ingredients: Vec<RecipeIngredient>,
}

/// One flat row of the recipe/user/ingredient join. Ingredient columns are
/// NULL for recipes with no links.
struct JoinRow {
    record: RecipeRecord,
    ingredient_name: Option<String>,
    ingredient_unit: Option<String>,
    quantity: Option<String>,
}

const JOIN_SELECT: &str = "
    SELECT
        r.id,
        r.title,
        r.description,
        r.image_url,
        r.instruction,
        r.created_at,
        r.updated_at,
        r.delete_yn,
        r.user_id,
        u.name AS author,
        i.name AS ingredient_name,
        i.unit,
        ri.quantity
    FROM recipes r
    JOIN users u ON r.user_id = u.id
    LEFT JOIN recipe_ingredients ri ON r.id = ri.recipe_id AND ri.delete_yn = 0
    LEFT JOIN ingredients i ON ri.ingredient_id = i.id AND i.delete_yn = 0
    WHERE r.delete_yn = 0";

const JOIN_ORDER: &str = " ORDER BY r.created_at DESC, r.id DESC";

pub struct Recipe;

impl Recipe {
    /// Insert a recipe together with its ingredient list.
    ///
    /// Each submitted ingredient is resolved against the catalog (reusing an
    /// existing row by name, creating it otherwise) and linked with its
    /// quantity. All of it commits atomically; a failure rolls back the
    /// recipe row and any links already written.
    pub fn create_with_ingredients(
        conn: &mut Connection,
        new: &NewRecipe,
        ingredients: &[RecipeIngredient],
    ) -> Result<i64> {
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO recipes
                 (title, description, instruction, image_url, created_at, updated_at, user_id, delete_yn)
             VALUES (?1, ?2, ?3, ?4, datetime('now'), datetime('now'), ?5, 0)",
            params![
                &new.title,
                &new.description,
                &new.instruction,
                &new.image_url,
                new.user_id,
            ],
        )?;
        let recipe_id = tx.last_insert_rowid();

        Self::insert_links(&tx, recipe_id, ingredients)?;

        tx.commit()?;
        Ok(recipe_id)
    }

    /// Update a recipe's scalar fields and replace its ingredient list.
    ///
    /// The existing links are deleted and the submitted list is re-inserted
    /// in full (replace-not-diff): any ingredient omitted from the new list
    /// loses its association. The image column is only touched when a new
    /// photo was uploaded.
    pub fn update_with_ingredients(
        conn: &mut Connection,
        recipe_id: i64,
        update: &RecipeUpdate,
        ingredients: &[RecipeIngredient],
    ) -> Result<()> {
        let tx = conn.transaction()?;

        if let Some(image_url) = &update.image_url {
            tx.execute(
                "UPDATE recipes
                 SET title = ?1, description = ?2, instruction = ?3, image_url = ?4,
                     updated_at = datetime('now'), user_id = ?5
                 WHERE id = ?6",
                params![
                    &update.title,
                    &update.description,
                    &update.instruction,
                    image_url,
                    update.user_id,
                    recipe_id,
                ],
            )?;
        } else {
            tx.execute(
                "UPDATE recipes
                 SET title = ?1, description = ?2, instruction = ?3,
                     updated_at = datetime('now'), user_id = ?4
                 WHERE id = ?5",
                params![
                    &update.title,
                    &update.description,
                    &update.instruction,
                    update.user_id,
                    recipe_id,
                ],
            )?;
        }

        tx.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
            [recipe_id],
        )?;
        Self::insert_links(&tx, recipe_id, ingredients)?;

        tx.commit()?;
        Ok(())
    }

    fn insert_links(
        conn: &Connection,
        recipe_id: i64,
        ingredients: &[RecipeIngredient],
    ) -> Result<()> {
        for entry in ingredients {
            let ingredient_id =
                Ingredient::resolve_or_create(conn, &entry.name, entry.unit.as_deref())?;
            conn.execute(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, delete_yn)
                 VALUES (?1, ?2, ?3, 0)",
                params![recipe_id, ingredient_id, &entry.quantity],
            )?;
        }
        Ok(())
    }

    /// Soft-delete a recipe
    pub fn soft_delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("UPDATE recipes SET delete_yn = 1 WHERE id = ?1", [id])?;
        Ok(())
    }

    /// All non-deleted recipes, newest first, ingredients embedded
    pub fn list_all(conn: &Connection) -> Result<Vec<RecipeRecord>> {
        let sql = format!("{}{}", JOIN_SELECT, JOIN_ORDER);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_join_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(fold_rows(rows))
    }

    /// Non-deleted recipes by a single author, newest first
    pub fn list_by_author(conn: &Connection, user_id: i64) -> Result<Vec<RecipeRecord>> {
        let sql = format!("{} AND r.user_id = ?1{}", JOIN_SELECT, JOIN_ORDER);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([user_id], row_to_join_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(fold_rows(rows))
    }

    /// Keyword search: case-insensitive substring match against the recipe
    /// title or any linked ingredient name.
    pub fn search(conn: &Connection, keyword: &str) -> Result<Vec<RecipeRecord>> {
        let sql = format!(
            "{} AND (LOWER(r.title) LIKE '%' || LOWER(?1) || '%'
                  OR LOWER(i.name) LIKE '%' || LOWER(?1) || '%'){}",
            JOIN_SELECT, JOIN_ORDER
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([keyword], row_to_join_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(fold_rows(rows))
    }
}

fn row_to_join_row(row: &Row) -> rusqlite::Result<JoinRow> {
    Ok(JoinRow {
        record: RecipeRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            image_url: row.get(3)?,
            instruction: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            delete_yn: row.get(7)?,
            user_id: row.get(8)?,
            author: row.get(9)?,
            ingredients: Vec::new(),
        },
        ingredient_name: row.get(10)?,
        ingredient_unit: row.get(11)?,
        quantity: row.get(12)?,
    })
}

/// Collapse the flat join rows (one per ingredient link, or one with NULL
/// ingredient columns for a recipe without any) into nested recipe objects.
/// Grouping is keyed by recipe id only; result order is the order of each
/// recipe's first appearance in the row stream, which the SQL ORDER BY has
/// already fixed.
fn fold_rows(rows: Vec<JoinRow>) -> Vec<RecipeRecord> {
    let mut records: Vec<RecipeRecord> = Vec::new();
    let mut index_by_id: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let idx = match index_by_id.get(&row.record.id) {
            Some(&idx) => idx,
            None => {
                index_by_id.insert(row.record.id, records.len());
                records.push(row.record);
                records.len() - 1
            }
        };

        if let Some(name) = row.ingredient_name {
            records[idx].ingredients.push(RecipeIngredient {
                name,
                quantity: row.quantity,
                unit: row.ingredient_unit,
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::User;
    use crate::db::schema;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    fn create_author(conn: &Connection, username: &str) -> i64 {
        let mut user = User::new(
            format!("{} name", username),
            format!("{}@example.com", username),
            username.to_string(),
            "hash".to_string(),
        );
        user.insert(conn).unwrap()
    }

    fn ing(name: &str, quantity: &str, unit: &str) -> RecipeIngredient {
        RecipeIngredient {
            name: name.to_string(),
            quantity: Some(quantity.to_string()),
            unit: Some(unit.to_string()),
        }
    }

    #[test]
    fn test_create_and_list_with_nested_ingredients() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        let id = Recipe::create_with_ingredients(
            &mut conn,
            &NewRecipe {
                title: "Tomato Soup".to_string(),
                description: Some("Simple".to_string()),
                instruction: Some("Boil".to_string()),
                image_url: None,
                user_id: author,
            },
            &[ing("Tomato", "3", "pcs"), ing("Salt", "1", "tsp")],
        )
        .unwrap();
        assert!(id > 0);

        let recipes = Recipe::list_all(&conn).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].author, "alice name");
        assert_eq!(recipes[0].ingredients.len(), 2);
    }

    #[test]
    fn test_sequential_creates_reuse_ingredient_rows() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        for title in ["First", "Second"] {
            Recipe::create_with_ingredients(
                &mut conn,
                &NewRecipe {
                    title: title.to_string(),
                    description: None,
                    instruction: None,
                    image_url: None,
                    user_id: author,
                },
                &[ing("Salt", "1", "tsp")],
            )
            .unwrap();
        }

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ingredients WHERE name = 'Salt'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_update_replaces_ingredient_links() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        let id = Recipe::create_with_ingredients(
            &mut conn,
            &NewRecipe {
                title: "Salad".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id: author,
            },
            &[ing("A", "1", "x"), ing("B", "2", "x")],
        )
        .unwrap();

        Recipe::update_with_ingredients(
            &mut conn,
            id,
            &RecipeUpdate {
                title: "Salad".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id: author,
            },
            &[ing("B", "2", "x"), ing("C", "3", "x")],
        )
        .unwrap();

        let recipes = Recipe::list_all(&conn).unwrap();
        let names: Vec<&str> = recipes[0]
            .ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C"]);

        // A's link is gone entirely, not just filtered
        let link_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = ?1",
                [id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(link_count, 2);
    }

    #[test]
    fn test_update_without_photo_preserves_image_url() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        let id = Recipe::create_with_ingredients(
            &mut conn,
            &NewRecipe {
                title: "Pie".to_string(),
                description: None,
                instruction: None,
                image_url: Some("uploads/pie.jpg".to_string()),
                user_id: author,
            },
            &[],
        )
        .unwrap();

        Recipe::update_with_ingredients(
            &mut conn,
            id,
            &RecipeUpdate {
                title: "Apple Pie".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id: author,
            },
            &[],
        )
        .unwrap();

        let recipes = Recipe::list_all(&conn).unwrap();
        assert_eq!(recipes[0].title, "Apple Pie");
        assert_eq!(recipes[0].image_url.as_deref(), Some("uploads/pie.jpg"));
    }

    #[test]
    fn test_soft_delete_hides_from_list_and_search() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        let id = Recipe::create_with_ingredients(
            &mut conn,
            &NewRecipe {
                title: "Gone Soon".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id: author,
            },
            &[],
        )
        .unwrap();

        Recipe::soft_delete(&conn, id).unwrap();

        assert!(Recipe::list_all(&conn).unwrap().is_empty());
        assert!(Recipe::search(&conn, "gone").unwrap().is_empty());

        // Row persists in storage
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_search_matches_title_and_ingredient_name() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        Recipe::create_with_ingredients(
            &mut conn,
            &NewRecipe {
                title: "Pancakes".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id: author,
            },
            &[ing("Flour", "200", "g")],
        )
        .unwrap();

        // Case-insensitive substring against the title
        assert_eq!(Recipe::search(&conn, "PANC").unwrap().len(), 1);
        // ... and against an ingredient name
        assert_eq!(Recipe::search(&conn, "flour").unwrap().len(), 1);
        assert!(Recipe::search(&conn, "nothing").unwrap().is_empty());
    }

    #[test]
    fn test_fold_keyed_by_recipe_id_only() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        // Two recipes sharing an ingredient name must not pollute each other
        for title in ["One", "Two"] {
            Recipe::create_with_ingredients(
                &mut conn,
                &NewRecipe {
                    title: title.to_string(),
                    description: None,
                    instruction: None,
                    image_url: None,
                    user_id: author,
                },
                &[ing("Salt", "1", "tsp")],
            )
            .unwrap();
        }

        let recipes = Recipe::list_all(&conn).unwrap();
        assert_eq!(recipes.len(), 2);
        for recipe in &recipes {
            assert_eq!(recipe.ingredients.len(), 1);
            assert_eq!(recipe.ingredients[0].name, "Salt");
        }
    }

    #[test]
    fn test_recipe_without_ingredients_still_listed() {
        let (_temp, mut conn) = create_test_db();
        let author = create_author(&conn, "alice");

        Recipe::create_with_ingredients(
            &mut conn,
            &NewRecipe {
                title: "Plain Toast".to_string(),
                description: None,
                instruction: None,
                image_url: None,
                user_id: author,
            },
            &[],
        )
        .unwrap();

        let recipes = Recipe::list_all(&conn).unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].ingredients.is_empty());
    }

    #[test]
    fn test_quantity_deserializes_from_number_or_string() {
        let from_number: RecipeIngredient =
            serde_json::from_str(r#"{"Name":"Salt","Quantity":2,"Unit":"tsp"}"#).unwrap();
        assert_eq!(from_number.quantity.as_deref(), Some("2"));

        let from_string: RecipeIngredient =
            serde_json::from_str(r#"{"Name":"Salt","Quantity":"2","Unit":"tsp"}"#).unwrap();
        assert_eq!(from_string.quantity.as_deref(), Some("2"));
    }
}
