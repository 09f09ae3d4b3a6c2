// src/server/auth.rs
//! Credential primitives and the verified-token middleware
//!
//! Passwords are hashed with bcrypt (cost 10). Sessions are HS256 JWTs
//! carrying {ID, Username, Email, Role} with a bounded lifetime. The
//! `require_auth` middleware verifies the bearer token on every mutating
//! route and injects the trusted caller identity; body-supplied user IDs
//! are never trusted.

use crate::db::models::User;
use crate::error::{Error, Result};
use crate::server::ServerState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// bcrypt work factor
const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Verify a plaintext password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Role")]
    pub role: String,
    pub exp: u64,
}

/// Signing and verification keys for session tokens
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a session token for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let claims = Claims {
            id: user.id.ok_or_else(|| Error::Other("User has no ID".to_string()))?,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp: jsonwebtoken::get_current_timestamp() + self.ttl_secs,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a token and return its claims. Expiry is checked.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Trusted caller identity, injected by `require_auth`
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Middleware gating state-mutating routes behind a verified session token.
///
/// Expects `Authorization: Bearer <token>`; a missing, malformed, or expired
/// token yields 401 with the same undifferentiated error body as a failed
/// login.
pub async fn require_auth(
    State(state): State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(Error::Unauthorized)?;

    let claims = state.tokens.verify(token).map_err(|_| Error::Unauthorized)?;
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}
