// src/server/handlers/comments.rs
//! Comment handlers: per-recipe count, list, and append

use crate::db::models::{Comment, CommentCount, CommentRecord};
use crate::error::{Error, Result};
use crate::server::auth::AuthUser;
use crate::server::ServerState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

/// GET /recipes/:id/comments
///
/// Always a body: a recipe with no comments reports a count of zero.
pub async fn count(
    State(state): State<Arc<ServerState>>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<CommentCount>> {
    let count = state
        .db
        .call(move |conn| Comment::count_for_recipe(conn, recipe_id))
        .await?;
    Ok(Json(count))
}

/// GET /recipes/:id/comments/list
pub async fn list(
    State(state): State<Arc<ServerState>>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<Vec<CommentRecord>>> {
    let comments = state
        .db
        .call(move |conn| Comment::list_for_recipe(conn, recipe_id))
        .await?;
    Ok(Json(comments))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(rename = "commentText", default)]
    pub comment_text: Option<String>,
}

/// POST /recipes/:id/comments/add
///
/// The comment is attributed to the authenticated caller; a body-supplied
/// userId is ignored.
pub async fn add(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
    Json(request): Json<AddCommentRequest>,
) -> Result<Response> {
    let text = request
        .comment_text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Validation("Comment text is required".to_string()))?;

    let user_id = caller.id;
    state
        .db
        .call(move |conn| Comment::insert(conn, recipe_id, user_id, &text))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Comment added" })),
    )
        .into_response())
}
