use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::database::models::{EntryDraft, TimetableEntry, TimetableEntryView};
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::handlers::DayFilter;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::server::AppState;
use crate::timetable::Conflict;

#[derive(Debug, Deserialize)]
struct CheckRequest {
    #[serde(flatten)]
    entry: EntryDraft,
    #[serde(default)]
    exclude_id: Option<i64>,
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::validation_error(format!("Invalid timetable entry: {}", e), None))
}

/// POST /api/timetable
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<TimetableEntry> {
    let draft: EntryDraft = decode(body)?;
    let entry = state.timetable.create(&user, draft).await?;
    Ok(ApiResponse::created(entry))
}

/// POST /api/timetable/check - conflicts a candidate would cause, nothing is written
pub async fn check(State(state): State<AppState>, ApiJson(body): ApiJson<Value>) -> ApiResult<Value> {
    let request: CheckRequest = decode(body)?;
    let conflicts: Vec<Conflict> = state.timetable.check(&request.entry, request.exclude_id).await?;
    Ok(ApiResponse::success(json!({
        "conflict": !conflicts.is_empty(),
        "conflicts": conflicts,
    })))
}

/// GET /api/timetable/:id
pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<TimetableEntry> {
    Ok(ApiResponse::success(state.timetable.get(id).await?))
}

/// PUT /api/timetable/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<TimetableEntry> {
    let draft: EntryDraft = decode(body)?;
    Ok(ApiResponse::success(state.timetable.update(&user, id, draft).await?))
}

/// DELETE /api/timetable/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Deleted> {
    state.timetable.delete(&user, id).await?;
    Ok(ApiResponse::deleted(id))
}

/// GET /api/timetable/section/:id
pub async fn by_section(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DayFilter>,
) -> ApiResult<Vec<TimetableEntryView>> {
    Ok(ApiResponse::success(state.timetable.list_by_section(id, filter.parse()?).await?))
}

/// GET /api/timetable/professor/:id
pub async fn by_professor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DayFilter>,
) -> ApiResult<Vec<TimetableEntryView>> {
    Ok(ApiResponse::success(state.timetable.list_by_professor(id, filter.parse()?).await?))
}

/// GET /api/timetable/room/:id
pub async fn by_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DayFilter>,
) -> ApiResult<Vec<TimetableEntryView>> {
    Ok(ApiResponse::success(state.timetable.list_by_room(id, filter.parse()?).await?))
}
