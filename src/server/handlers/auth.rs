// src/server/handlers/auth.rs
//! Account handlers: register, login, password reset, profile update

use crate::db::models::User;
use crate::error::{Error, Result};
use crate::server::auth::{self, AuthUser};
use crate::server::ServerState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Public user projection. The password hash never leaves the database
/// layer in a response.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Role")]
    pub role: String,
}

impl PublicUser {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
    #[serde(rename = "Password", default)]
    pub password: Option<String>,
}

/// POST /register
pub async fn register(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response> {
    let (name, email, username, password) = match (
        non_empty(request.name),
        non_empty(request.email),
        non_empty(request.username),
        non_empty(request.password),
    ) {
        (Some(n), Some(e), Some(u), Some(p)) => (n, e, u, p),
        _ => return Err(Error::Validation("All fields are required".to_string())),
    };

    let password_hash = auth::hash_password(&password)?;

    state
        .db
        .call(move |conn| {
            if User::exists_with_username_or_email(conn, &username, &email)? {
                return Err(Error::Conflict(
                    "Username or email already taken".to_string(),
                ));
            }

            let mut user = User::new(name, email, username, password_hash);
            user.insert(conn)?;
            Ok(())
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Registration successful" })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(rename = "Password", default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// POST /login
///
/// The identifier matches email or username. An unknown identifier and a
/// wrong password produce the same 401, never revealing which was wrong.
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (login, password) = match (non_empty(request.login), non_empty(request.password)) {
        (Some(l), Some(p)) => (l, p),
        _ => return Err(Error::Validation("Login and password are required".to_string())),
    };

    let user = state
        .db
        .call(move |conn| User::find_by_login(conn, &login))
        .await?
        .ok_or(Error::Unauthorized)?;

    if !auth::verify_password(&password, &user.password)? {
        return Err(Error::Unauthorized);
    }

    let token = state.tokens.issue(&user)?;
    info!("User '{}' logged in", user.username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: PublicUser::from_user(&user),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(rename = "newPassword", default)]
    pub new_password: Option<String>,
}

/// POST /forgot-password
///
/// Prototype flow: the password is
/// overwritten given only the identifier, with no proof of ownership.
pub async fn forgot_password(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    let (login, new_password) =
        match (non_empty(request.login), non_empty(request.new_password)) {
            (Some(l), Some(p)) => (l, p),
            _ => return Err(Error::Validation("Login and new password are required".to_string())),
        };

    let password_hash = auth::hash_password(&new_password)?;

    state
        .db
        .call(move |conn| {
            if User::find_by_login(conn, &login)?.is_none() {
                return Err(Error::NotFound("User not found".to_string()));
            }
            User::update_password_by_login(conn, &login, &password_hash)
        })
        .await?;

    Ok(Json(serde_json::json!({ "message": "Password reset successful" })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: PublicUser,
}

/// PUT /update-profile
///
/// The target row is the authenticated caller's own; a body-supplied
/// username is ignored.
pub async fn update_profile(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>> {
    let (name, email) = match (non_empty(request.name), non_empty(request.email)) {
        (Some(n), Some(e)) => (n, e),
        _ => return Err(Error::Validation("Name and email are required".to_string())),
    };

    let username = caller.username.clone();
    let user = state
        .db
        .call(move |conn| User::update_profile(conn, &username, &name, &email))
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated".to_string(),
        user: PublicUser::from_user(&user),
    }))
}

/// None for absent or empty-string fields, so both fail validation
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
