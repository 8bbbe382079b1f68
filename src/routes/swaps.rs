use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    dto::swap::{CreateSwapRequest, DecideSwapRequest, SwapRequestResponse},
    error::AppError,
    routes::extract::{extract_json, extract_validated_json},
    services::{swap_coordinator::Decision, swap_service},
    state::SharedState,
};

/// Swap request lifecycle endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/swaps", get(list_pending).post(create_swap))
        .route("/swaps/{id}", get(get_swap).put(decide_swap))
        .route("/swaps/{id}/approve", put(approve_swap))
        .route("/swaps/{id}/reject", put(reject_swap))
}

/// Ask another player to take over a week.
#[utoipa::path(
    post,
    path = "/swaps",
    tag = "swaps",
    security(("bearer" = [])),
    request_body = CreateSwapRequest,
    responses(
        (status = 201, description = "Swap request created", body = SwapRequestResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "A request for this week and pair already exists")
    )
)]
pub async fn create_swap(
    State(state): State<SharedState>,
    body: Result<Json<CreateSwapRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SwapRequestResponse>), AppError> {
    let payload = extract_validated_json(body)?;
    let created = swap_service::create_swap(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List requests still waiting for a decision.
#[utoipa::path(
    get,
    path = "/swaps",
    tag = "swaps",
    security(("bearer" = [])),
    responses((status = 200, description = "Pending swap requests", body = [SwapRequestResponse]))
)]
pub async fn list_pending(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SwapRequestResponse>>, AppError> {
    Ok(Json(swap_service::list_pending(&state).await?))
}

/// Fetch a swap request in any status.
#[utoipa::path(
    get,
    path = "/swaps/{id}",
    tag = "swaps",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Swap request identifier")),
    responses(
        (status = 200, description = "Swap request", body = SwapRequestResponse),
        (status = 404, description = "Unknown swap request")
    )
)]
pub async fn get_swap(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequestResponse>, AppError> {
    Ok(Json(swap_service::get_swap(&state, &id).await?))
}

/// Approve a pending request and hand the slot over.
#[utoipa::path(
    put,
    path = "/swaps/{id}/approve",
    tag = "swaps",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Swap request identifier")),
    responses(
        (status = 200, description = "Swap approved", body = SwapRequestResponse),
        (status = 404, description = "Unknown swap request"),
        (status = 409, description = "Request already decided or slots do not allow the swap"),
        (status = 500, description = "Approved but the schedule could not be updated")
    )
)]
pub async fn approve_swap(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequestResponse>, AppError> {
    Ok(Json(
        swap_service::decide_swap(&state, &id, Decision::Approve).await?,
    ))
}

/// Reject a pending request.
#[utoipa::path(
    put,
    path = "/swaps/{id}/reject",
    tag = "swaps",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Swap request identifier")),
    responses(
        (status = 200, description = "Swap rejected", body = SwapRequestResponse),
        (status = 404, description = "Unknown swap request"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn reject_swap(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SwapRequestResponse>, AppError> {
    Ok(Json(
        swap_service::decide_swap(&state, &id, Decision::Reject).await?,
    ))
}

/// Decide a request from a status body, as sent by the web client.
#[utoipa::path(
    put,
    path = "/swaps/{id}",
    tag = "swaps",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Swap request identifier")),
    request_body = DecideSwapRequest,
    responses(
        (status = 200, description = "Swap decided", body = SwapRequestResponse),
        (status = 400, description = "Status is neither APPROVED nor REJECTED"),
        (status = 404, description = "Unknown swap request"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn decide_swap(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<DecideSwapRequest>, JsonRejection>,
) -> Result<Json<SwapRequestResponse>, AppError> {
    let payload = extract_json(body)?;
    Ok(Json(
        swap_service::decide_swap(&state, &id, payload.status.into()).await?,
    ))
}
