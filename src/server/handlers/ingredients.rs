// src/server/handlers/ingredients.rs
//! Ingredient catalog handlers

use crate::db::models::Ingredient;
use crate::error::Result;
use crate::server::ServerState;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

/// GET /ingredients
pub async fn list(State(state): State<Arc<ServerState>>) -> Result<Json<Vec<Ingredient>>> {
    let ingredients = state.db.call(|conn| Ingredient::list_active(conn)).await?;
    Ok(Json(ingredients))
}

/// PUT /ingredients/delete/:id
pub async fn delete(
    State(state): State<Arc<ServerState>>,
    Path(ingredient_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    state
        .db
        .call(move |conn| Ingredient::soft_delete(conn, ingredient_id))
        .await?;

    Ok(Json(serde_json::json!({ "message": "Ingredient deleted" })))
}
