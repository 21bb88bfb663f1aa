use axum::extract::State;

use crate::database::models::BusySlot;
use crate::handlers::extract::{ApiPath, ApiQuery};
use crate::handlers::DayFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

/// GET /api/professors/:id/availability - busy slots
pub async fn professor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DayFilter>,
) -> ApiResult<Vec<BusySlot>> {
    Ok(ApiResponse::success(state.timetable.professor_availability(id, filter.parse()?).await?))
}

/// GET /api/rooms/:id/availability - busy slots
pub async fn room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(filter): ApiQuery<DayFilter>,
) -> ApiResult<Vec<BusySlot>> {
    Ok(ApiResponse::success(state.timetable.room_availability(id, filter.parse()?).await?))
}
