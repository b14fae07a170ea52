use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, role::Role},
    error::ApiError,
    state::AppState,
};

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-photo", post(upload_photo))
        .route("/delete-photo/:filename", delete(delete_photo))
        // Above the 5 MiB cap so oversize uploads get the 400 from our own
        // check rather than a generic 413.
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[instrument(skip(state, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    identity.require(Role::Admin)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let Some(ext) = ext_from_mime(&content_type) else {
            return Err(ApiError::validation(
                "Only JPEG, PNG and WebP images are allowed",
            ));
        };

        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read file: {e}")))?;
        if body.len() > MAX_PHOTO_BYTES {
            return Err(ApiError::validation("File size must be less than 5MB"));
        }
        if body.is_empty() {
            return Err(ApiError::validation("Uploaded file is empty"));
        }

        // Filename comes from a fresh UUID, never from user input.
        let filename = format!("{}.{ext}", Uuid::new_v4());
        state.photos.put(&filename, body).await?;

        info!(%filename, uploaded_by = %identity.username, "photo uploaded");
        return Ok(Json(serde_json::json!({
            "photo_url": format!("/uploads/{filename}")
        })));
    }

    Err(ApiError::validation("file field is required"))
}

#[instrument(skip(state))]
pub async fn delete_photo(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(filename): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    identity.require(Role::Admin)?;

    // Only bare generated filenames are valid references.
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(ApiError::validation("invalid photo reference"));
    }

    if !state.photos.delete(&filename).await? {
        return Err(ApiError::NotFound("Photo"));
    }

    info!(%filename, deleted_by = %identity.username, "photo deleted");
    Ok(Json(serde_json::json!({
        "message": "Photo deleted successfully"
    })))
}
