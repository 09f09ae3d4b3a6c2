// src/server/mod.rs
//! Ladle HTTP server
//!
//! This module provides the REST API for the recipe-sharing application:
//! - Registration, login, and password reset
//! - Recipe CRUD with embedded ingredient lists and keyword search
//! - Comments (list, count, add)
//! - Moderation: user activation, soft-deletes for recipes/ingredients
//! - Static serving of uploaded recipe photos under /uploads
//!
//! All state lives in a single shared SQLite handle; mutating routes are
//! gated behind verified-token middleware.

pub mod auth;
pub mod config;
mod handlers;
mod routes;
mod uploads;

pub use routes::create_router;

use crate::db::Database;
use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Path to the Ladle database
    pub db_path: PathBuf,
    /// Directory recipe photos are written to and served from
    pub upload_dir: PathBuf,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime in seconds
    pub token_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".parse().unwrap(),
            db_path: PathBuf::from("ladle.db"),
            upload_dir: PathBuf::from("uploads"),
            jwt_secret: String::new(),
            token_ttl_secs: 3600,
        }
    }
}

/// Shared server state
pub struct ServerState {
    pub config: ServerConfig,
    pub db: Database,
    pub tokens: auth::TokenKeys,
}

impl ServerState {
    pub fn new(config: ServerConfig, db: Database) -> Self {
        let tokens = auth::TokenKeys::new(&config.jwt_secret, config.token_ttl_secs);
        Self { config, db, tokens }
    }
}

/// Start the Ladle server
pub async fn run_server(config: ServerConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        anyhow::bail!("No token signing secret configured (set LADLE_JWT_SECRET or [auth] jwt_secret)");
    }

    tracing::info!("Starting Ladle server on {}", config.bind_addr);
    tracing::info!("Database: {:?}", config.db_path);
    tracing::info!("Upload directory: {:?}", config.upload_dir);

    std::fs::create_dir_all(&config.upload_dir)?;
    let db = Database::open(&config.db_path)?;

    let state = Arc::new(ServerState::new(config.clone(), db));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Ladle is ready to serve");

    axum::serve(listener, app).await?;
    Ok(())
}
