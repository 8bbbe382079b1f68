use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::schedule::{
        CreateScheduleEntryRequest, ScheduleEntryResponse, UpdateScheduleEntryRequest,
    },
    error::AppError,
    routes::extract::extract_validated_json,
    services::schedule_service,
    state::SharedState,
};

/// Weekly schedule endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/schedule", get(list_schedule).post(create_entry))
        .route("/schedule/{week_id}", get(week_schedule).put(update_entry))
}

/// Every slot of every week.
#[utoipa::path(
    get,
    path = "/schedule",
    tag = "schedule",
    security(("bearer" = [])),
    responses((status = 200, description = "Schedule", body = [ScheduleEntryResponse]))
)]
pub async fn list_schedule(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ScheduleEntryResponse>>, AppError> {
    Ok(Json(schedule_service::list_schedule(&state).await?))
}

/// Assign a player a tee time for a week.
#[utoipa::path(
    post,
    path = "/schedule",
    tag = "schedule",
    security(("bearer" = [])),
    request_body = CreateScheduleEntryRequest,
    responses(
        (status = 201, description = "Slot saved", body = ScheduleEntryResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn create_entry(
    State(state): State<SharedState>,
    body: Result<Json<CreateScheduleEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScheduleEntryResponse>), AppError> {
    let payload = extract_validated_json(body)?;
    let entry = schedule_service::create_entry(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/schedule/{week_id}",
    tag = "schedule",
    security(("bearer" = [])),
    params(("week_id" = String, Path, description = "Week identifier")),
    responses((status = 200, description = "Slots of the week", body = [ScheduleEntryResponse]))
)]
pub async fn week_schedule(
    State(state): State<SharedState>,
    Path(week_id): Path<String>,
) -> Result<Json<Vec<ScheduleEntryResponse>>, AppError> {
    Ok(Json(schedule_service::week_schedule(&state, &week_id).await?))
}

/// Change the time and course of one player's slot.
#[utoipa::path(
    put,
    path = "/schedule/{week_id}",
    tag = "schedule",
    security(("bearer" = [])),
    params(("week_id" = String, Path, description = "Week identifier")),
    request_body = UpdateScheduleEntryRequest,
    responses(
        (status = 200, description = "Slot updated", body = ScheduleEntryResponse),
        (status = 404, description = "No slot for this player and week")
    )
)]
pub async fn update_entry(
    State(state): State<SharedState>,
    Path(week_id): Path<String>,
    body: Result<Json<UpdateScheduleEntryRequest>, JsonRejection>,
) -> Result<Json<ScheduleEntryResponse>, AppError> {
    let payload = extract_validated_json(body)?;
    Ok(Json(
        schedule_service::update_entry(&state, &week_id, payload).await?,
    ))
}
