//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::storage::{Event, WeekKey};

// ============================================
// EVENT DTOs
// ============================================

/// `?week=YYYY-MM-DD`
#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    #[serde(default)]
    pub week: Option<String>,
}

/// POST /api/events body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub week_start: Option<String>,
    /// Event fields, validated after the week is resolved
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

/// PUT /api/events body; `event` carries `id` plus the fields to change
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

/// DELETE /api/events body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventRequest {
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// GET /api/events/slug/:slug response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugLookupResponse {
    pub event: Event,
    pub week_start: WeekKey,
}

// ============================================
// IMAGE DTOs
// ============================================

/// DELETE /api/events/images body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

// ============================================
// COMMON DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// Active backend
    pub backend: String,
    /// "ok" or "error"
    pub storage: String,
    /// Indexed weeks (0 when storage is down)
    pub weeks: usize,
    /// Indexed events (0 when storage is down)
    pub events: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
