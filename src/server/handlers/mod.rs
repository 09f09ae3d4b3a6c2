// src/server/handlers/mod.rs
//! Request handlers for the Ladle server

pub mod auth;
pub mod comments;
pub mod ingredients;
pub mod recipes;
pub mod users;
