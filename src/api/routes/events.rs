//! Event Routes
//!
//! - GET /api/events?week=YYYY-MM-DD - One week (current week by default)
//! - GET /api/events/index - Week index
//! - GET /api/events/slug/:slug - Find an event by slug
//! - POST /api/events - Create an event (admin)
//! - PUT /api/events - Update an event (admin)
//! - DELETE /api/events - Delete an event (admin)

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    CreateEventRequest, DeleteEventRequest, SlugLookupResponse, SuccessResponse,
    UpdateEventRequest, WeekQuery,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::api::validation::{validate_draft, validate_patch, ValidationErrors};
use crate::storage::{Event, EventDraft, EventPatch, EventsIndex, WeekKey, WeeklyEvents};

fn parse_week(raw: Option<&str>) -> ApiResult<WeekKey> {
    let raw = raw
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Week start date is required".to_string()))?;
    raw.parse::<WeekKey>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn event_payload<T: serde::de::DeserializeOwned>(raw: serde_json::Value) -> ApiResult<T> {
    serde_json::from_value(raw)
        .map_err(|e| ApiError::Validation(ValidationErrors::field("event", e.to_string())))
}

/// GET /api/events
pub async fn get_week(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Json<WeeklyEvents>> {
    state.check_rate(&headers)?;

    let week = match query.week.as_deref() {
        Some(raw) => parse_week(Some(raw))?,
        None => state.store.current_week(),
    };

    let weekly = state.with_store(move |store| store.read_week(week)).await?;
    Ok(Json(weekly))
}

/// GET /api/events/index
pub async fn get_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<EventsIndex>> {
    state.check_rate(&headers)?;
    let index = state.with_store(|store| store.read_index()).await?;
    Ok(Json(index))
}

/// GET /api/events/slug/:slug
pub async fn get_by_slug(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> ApiResult<Json<SlugLookupResponse>> {
    state.check_rate(&headers)?;

    let lookup = slug.clone();
    let (event, week_start) = state
        .with_store(move |store| store.find_by_slug(&lookup))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No event with slug '{}'", slug)))?;

    Ok(Json(SlugLookupResponse { event, week_start }))
}

/// POST /api/events
///
/// Body: `{ "weekStart": "YYYY-MM-DD", "event": { ...fields } }`
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    state.check_rate(&headers)?;
    state.require_admin(&headers)?;

    let week = parse_week(req.week_start.as_deref())?;
    let raw = req
        .event
        .ok_or_else(|| ApiError::BadRequest("Event data is required".to_string()))?;
    let draft: EventDraft = event_payload(raw)?;
    validate_draft(&draft, &state.config.cities).map_err(ApiError::Validation)?;

    let event = state
        .with_store(move |store| store.create_event(week, draft))
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events
///
/// Body: `{ "weekStart": "YYYY-MM-DD", "event": { "id": "...", ...changes } }`.
/// A `slug` in the changes is ignored.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    state.check_rate(&headers)?;
    state.require_admin(&headers)?;

    let week = parse_week(req.week_start.as_deref())?;
    let raw = req
        .event
        .ok_or_else(|| ApiError::BadRequest("Event data is required".to_string()))?;
    let id = raw
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Event ID is required".to_string()))?;

    let patch: EventPatch = event_payload(raw)?;
    validate_patch(&patch, &state.config.cities).map_err(ApiError::Validation)?;

    let target = id.clone();
    let updated = state
        .with_store(move |store| store.update_event(week, &target, patch))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event {} not found in week {}", id, week)))?;

    Ok(Json(updated))
}

/// DELETE /api/events
///
/// Body: `{ "weekStart": "YYYY-MM-DD", "id": "..." }`
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<DeleteEventRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    state.check_rate(&headers)?;
    state.require_admin(&headers)?;

    let week = parse_week(req.week_start.as_deref())?;
    let id = req
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Event ID is required".to_string()))?;

    let target = id.clone();
    let deleted = state
        .with_store(move |store| store.delete_event(week, &target))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound(format!(
            "Event {} not found in week {}",
            id, week
        )));
    }

    Ok(Json(SuccessResponse::ok()))
}
