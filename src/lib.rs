// src/lib.rs

//! Ladle - Recipe Sharing Backend
//!
//! REST backend for a recipe-sharing application: user registration and
//! login, recipe CRUD with embedded ingredient lists, comments, and simple
//! moderation (soft-delete, user activation).
//!
//! # Architecture
//!
//! - Database-first: all state in SQLite, one shared connection handle
//! - Soft deletes: rows are flagged, never physically removed
//! - Nested reads: flat join rows folded into recipe objects with an
//!   embedded ingredient list
//! - Verified-token middleware gates every state-mutating route

pub mod db;
mod error;
pub mod server;

pub use error::{Error, Result};
