// src/server/handlers/users.rs
//! User directory and moderation handlers

use crate::db::models::{User, UserSummary};
use crate::error::Result;
use crate::server::auth::AuthUser;
use crate::server::ServerState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::info;

/// GET /users
///
/// Moderation view: every account, including deactivated ones.
pub async fn list(State(state): State<Arc<ServerState>>) -> Result<Json<Vec<UserSummary>>> {
    let users = state.db.call(|conn| User::list_all(conn)).await?;
    Ok(Json(users))
}

/// PUT /users/delete/:id
///
/// Soft-deactivate: flips the active flag, the row is kept.
pub async fn deactivate(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    state
        .db
        .call(move |conn| User::set_active(conn, user_id, false))
        .await?;

    info!("User {} deactivated by '{}'", user_id, caller.username);
    Ok(Json(serde_json::json!({ "message": "User deactivated" })))
}

/// PUT /users/active/:id
pub async fn activate(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    state
        .db
        .call(move |conn| User::set_active(conn, user_id, true))
        .await?;

    info!("User {} reactivated by '{}'", user_id, caller.username);
    Ok(Json(serde_json::json!({ "message": "User reactivated" })))
}
