// src/server/config.rs
//! Configuration file parsing for the Ladle server
//!
//! Supports TOML configuration files with the following sections:
//! - [server] - Bind address
//! - [database] - SQLite database path
//! - [auth] - Token signing secret and lifetime
//! - [uploads] - Upload directory for recipe photos
//!
//! Every value can also come from the environment for container-style
//! deployments: LADLE_BIND, LADLE_PORT, LADLE_DB_PATH, LADLE_JWT_SECRET,
//! LADLE_UPLOAD_DIR.

use crate::server::ServerConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct LadleConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSection,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseSection,

    /// Auth settings
    #[serde(default)]
    pub auth: AuthSection,

    /// Upload settings
    #[serde(default)]
    pub uploads: UploadsSection,
}

/// Server configuration section
#[derive(Debug, Deserialize)]
pub struct ServerSection {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

/// Database configuration section
#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ladle.db")
}

/// Auth configuration section
#[derive(Debug, Deserialize)]
pub struct AuthSection {
    /// HS256 token signing secret. Must be set (here or via
    /// LADLE_JWT_SECRET) before the server will start.
    #[serde(default)]
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

fn default_token_ttl() -> u64 {
    3600 // 1 hour
}

/// Uploads configuration section
#[derive(Debug, Deserialize)]
pub struct UploadsSection {
    /// Directory recipe photos are written to and served from (at /uploads)
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
}

impl Default for UploadsSection {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl LadleConfig {
    /// Load configuration from a TOML file, or defaults when `path` is None.
    /// Environment overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                toml::from_str(&text)
                    .with_context(|| format!("Failed to parse config file {:?}", path))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables take precedence over file values
    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("LADLE_BIND") {
            self.server.bind = bind;
        }
        if let Ok(port) = std::env::var("LADLE_PORT") {
            if let Some((host, _)) = self.server.bind.rsplit_once(':') {
                self.server.bind = format!("{}:{}", host, port);
            }
        }
        if let Ok(path) = std::env::var("LADLE_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(secret) = std::env::var("LADLE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(dir) = std::env::var("LADLE_UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(dir);
        }
    }

    /// Convert the parsed file into the runtime server configuration
    pub fn into_server_config(self) -> Result<ServerConfig> {
        let bind_addr: SocketAddr = self
            .server
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address {:?}", self.server.bind))?;

        Ok(ServerConfig {
            bind_addr,
            db_path: self.database.path,
            upload_dir: self.uploads.dir,
            jwt_secret: self.auth.jwt_secret,
            token_ttl_secs: self.auth.token_ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LadleConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert_eq!(config.database.path, PathBuf::from("ladle.db"));
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.uploads.dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_parse_sections() {
        let text = r#"
            [server]
            bind = "127.0.0.1:8080"

            [database]
            path = "/var/lib/ladle/ladle.db"

            [auth]
            jwt_secret = "test-secret"
            token_ttl_secs = 7200

            [uploads]
            dir = "/var/lib/ladle/uploads"
        "#;

        let config: LadleConfig = toml::from_str(text).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.auth.jwt_secret, "test-secret");
        assert_eq!(config.auth.token_ttl_secs, 7200);

        let server_config = config.into_server_config().unwrap();
        assert_eq!(server_config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let config: LadleConfig = toml::from_str("[server]\nbind = \"not-an-addr\"").unwrap();
        assert!(config.into_server_config().is_err());
    }
}
