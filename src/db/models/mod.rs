// src/db/models/mod.rs

//! Data models for Ladle database entities
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating, reading, updating, and soft-deleting
//! records. All reads exclude soft-deleted rows.

mod comment;
mod ingredient;
mod recipe;
mod user;

pub use comment::{Comment, CommentCount, CommentRecord};
pub use ingredient::Ingredient;
pub use recipe::{NewRecipe, Recipe, RecipeIngredient, RecipeRecord, RecipeUpdate};
pub use user::{User, UserSummary};
