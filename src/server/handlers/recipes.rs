// src/server/handlers/recipes.rs
//! Recipe handlers: listing, search, create/update/delete
//!
//! Create and update take multipart forms (scalar fields, an Ingredients
//! JSON array, an optional photo). The photo lands on disk first; if the
//! database transaction then fails, the stored file is discarded so the
//! two stay consistent.

use crate::db::models::{NewRecipe, Recipe, RecipeRecord, RecipeUpdate};
use crate::error::{Error, Result};
use crate::server::auth::AuthUser;
use crate::server::{uploads, ServerState};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// GET /recipes
pub async fn list_all(State(state): State<Arc<ServerState>>) -> Result<Json<Vec<RecipeRecord>>> {
    let recipes = state.db.call(|conn| Recipe::list_all(conn)).await?;
    Ok(Json(recipes))
}

/// GET /recipes/user/:id
pub async fn list_by_author(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<RecipeRecord>>> {
    let recipes = state
        .db
        .call(move |conn| Recipe::list_by_author(conn, user_id))
        .await?;
    Ok(Json(recipes))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /recipes/search?q=
pub async fn search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RecipeRecord>>> {
    let keyword = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| Error::Validation("Search keyword is required".to_string()))?;

    let recipes = state
        .db
        .call(move |conn| Recipe::search(conn, &keyword))
        .await?;
    Ok(Json(recipes))
}

/// POST /recipes/add
///
/// The owner is the authenticated caller; a body-supplied User_id is
/// ignored.
pub async fn create(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Response> {
    let submission = uploads::read_recipe_form(&state.config.upload_dir, multipart).await?;

    let new = NewRecipe {
        title: submission.title,
        description: submission.description,
        instruction: submission.instruction,
        image_url: submission.photo.as_ref().map(|p| p.relative_url.clone()),
        user_id: caller.id,
    };
    let ingredients = submission.ingredients;

    let result = state
        .db
        .call(move |conn| Recipe::create_with_ingredients(conn, &new, &ingredients))
        .await;

    match result {
        Ok(recipe_id) => {
            info!("Recipe {} created by '{}'", recipe_id, caller.username);
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "message": "Recipe created",
                    "RecipeID": recipe_id,
                })),
            )
                .into_response())
        }
        Err(e) => {
            // The transaction rolled back; don't leave the photo orphaned
            if let Some(photo) = submission.photo {
                photo.discard().await;
            }
            Err(e)
        }
    }
}

/// PUT /recipes/update/:id
///
/// Full replace of the ingredient list; the image column is only touched
/// when a new photo was uploaded.
pub async fn update(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
    multipart: Multipart,
) -> Result<Response> {
    let submission = uploads::read_recipe_form(&state.config.upload_dir, multipart).await?;

    let update = RecipeUpdate {
        title: submission.title,
        description: submission.description,
        instruction: submission.instruction,
        image_url: submission.photo.as_ref().map(|p| p.relative_url.clone()),
        user_id: caller.id,
    };
    let ingredients = submission.ingredients;

    let result = state
        .db
        .call(move |conn| Recipe::update_with_ingredients(conn, recipe_id, &update, &ingredients))
        .await;

    match result {
        Ok(()) => {
            info!("Recipe {} updated by '{}'", recipe_id, caller.username);
            Ok(Json(serde_json::json!({
                "message": "Recipe updated",
                "RecipeID": recipe_id,
            }))
            .into_response())
        }
        Err(e) => {
            if let Some(photo) = submission.photo {
                photo.discard().await;
            }
            Err(e)
        }
    }
}

/// PUT /recipes/delete/:id
pub async fn delete(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    state
        .db
        .call(move |conn| Recipe::soft_delete(conn, recipe_id))
        .await?;

    info!("Recipe {} deleted by '{}'", recipe_id, caller.username);
    Ok(Json(serde_json::json!({ "message": "Recipe deleted" })))
}
