// src/server/uploads.rs
//! Multipart intake for recipe submissions
//!
//! Recipe create/update arrive as multipart forms: scalar fields, an
//! `Ingredients` field holding a JSON array, and an optional `photo` file.
//! The photo is written to the upload directory before the database work;
//! if that work fails the caller discards the stored file so no orphan is
//! left behind.

use crate::db::models::RecipeIngredient;
use crate::error::{Error, Result};
use axum::extract::Multipart;
use std::path::{Path, PathBuf};

/// A photo that has been written to the upload directory
#[derive(Debug)]
pub struct StoredUpload {
    /// Relative URL recorded in the database (served under /uploads)
    pub relative_url: String,
    /// Absolute path on disk, for cleanup on rollback
    pub path: PathBuf,
}

impl StoredUpload {
    /// Remove the stored file. Best effort: a failed cleanup is logged,
    /// not surfaced.
    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!("Failed to remove orphaned upload {:?}: {}", self.path, e);
        }
    }
}

/// Parsed recipe submission
#[derive(Debug)]
pub struct RecipeSubmission {
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
    pub photo: Option<StoredUpload>,
}

/// Read a recipe multipart form, storing the photo (if any) under
/// `upload_dir` with a unique name.
pub async fn read_recipe_form(
    upload_dir: &Path,
    mut multipart: Multipart,
) -> Result<RecipeSubmission> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut instruction: Option<String> = None;
    let mut ingredients: Option<Vec<RecipeIngredient>> = None;
    let mut photo: Option<StoredUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "Title" => title = Some(read_text(field).await?),
            "Description" => description = Some(read_text(field).await?),
            "Instruction" => instruction = Some(read_text(field).await?),
            "Ingredients" => {
                let raw = read_text(field).await?;
                let parsed: Vec<RecipeIngredient> = serde_json::from_str(&raw)
                    .map_err(|e| Error::Validation(format!("Invalid Ingredients JSON: {}", e)))?;
                ingredients = Some(parsed);
            }
            "photo" => {
                let filename = unique_filename(field.file_name());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("Failed to read photo: {}", e)))?;
                let path = upload_dir.join(&filename);
                tokio::fs::write(&path, &bytes).await?;
                photo = Some(StoredUpload {
                    relative_url: format!("uploads/{}", filename),
                    path,
                });
            }
            // The caller's identity comes from the verified token, so a
            // body-supplied User_id is dropped here.
            _ => {}
        }
    }

    let title = match title {
        Some(t) if !t.is_empty() => t,
        _ => {
            if let Some(photo) = photo {
                photo.discard().await;
            }
            return Err(Error::Validation("Title is required".to_string()));
        }
    };

    Ok(RecipeSubmission {
        title,
        description,
        instruction,
        ingredients: ingredients.unwrap_or_default(),
        photo,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::Validation(format!("Malformed multipart field: {}", e)))
}

/// `photo-<millis>-<random>.<ext>`, keeping the submitted extension
fn unique_filename(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "photo-{}-{}{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8],
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_filename_keeps_extension() {
        let name = unique_filename(Some("dinner.jpg"));
        assert!(name.starts_with("photo-"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_unique_filename_without_extension() {
        let name = unique_filename(None);
        assert!(name.starts_with("photo-"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_unique_filenames_differ() {
        let a = unique_filename(Some("a.png"));
        let b = unique_filename(Some("a.png"));
        assert_ne!(a, b);
    }
}
