//! Image Routes
//!
//! - DELETE /api/events/images - Remove an uploaded event image (admin)
//!
//! The file is only removed once no stored event references it.

use axum::{extract::State, http::HeaderMap, Json};
use std::io::ErrorKind;
use std::sync::Arc;

use crate::api::dto::{DeleteImageRequest, SuccessResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Only uploaded event images may be deleted through the API
pub const UPLOAD_PREFIX: &str = "/images/uploads/events/";

/// DELETE /api/events/images
///
/// Body: `{ "imageUrl": "/images/uploads/events/<file>" }`
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteImageRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    state.check_rate(&headers)?;
    state.require_admin(&headers)?;

    let url = req
        .image_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Image URL is required".to_string()))?;

    if !url.starts_with(UPLOAD_PREFIX)
        || url.len() == UPLOAD_PREFIX.len()
        || url.contains("..")
        || url.contains('\\')
    {
        return Err(ApiError::BadRequest("Invalid image URL format".to_string()));
    }

    let lookup = url.clone();
    let refs = state
        .with_store(move |store| store.asset_references(&lookup))
        .await?;
    if !refs.is_empty() {
        let users: Vec<String> = refs
            .iter()
            .map(|r| format!("{} ({})", r.slug, r.week))
            .collect();
        tracing::warn!(
            url = %url,
            events = refs.len(),
            "Refusing to delete image still referenced by events"
        );
        return Err(ApiError::Conflict(format!(
            "Cannot delete image: still referenced by {}",
            users.join(", ")
        )));
    }

    let path = state.config.media_root.join(url.trim_start_matches('/'));
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Image file not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(url = %url, "Deleted event image");
    Ok(Json(SuccessResponse::ok()))
}
