use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::player::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
    error::AppError,
    routes::extract::extract_validated_json,
    services::player_service,
    state::SharedState,
};

/// Player roster endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route(
            "/players/{id}",
            get(get_player).put(update_player).delete(delete_player),
        )
}

/// List every league member.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    security(("bearer" = [])),
    responses((status = 200, description = "Players", body = [PlayerResponse]))
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    Ok(Json(player_service::list_players(&state).await?))
}

/// Register a league member.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    security(("bearer" = [])),
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = PlayerResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Player id already taken")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    body: Result<Json<CreatePlayerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    let payload = extract_validated_json(body)?;
    let created = player_service::create_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "players",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(player_service::get_player(&state, &id).await?))
}

/// Replace a player's name, contact details and share.
#[utoipa::path(
    put,
    path = "/players/{id}",
    tag = "players",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Player identifier")),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = PlayerResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePlayerRequest>, JsonRejection>,
) -> Result<Json<PlayerResponse>, AppError> {
    let payload = extract_validated_json(body)?;
    Ok(Json(player_service::update_player(&state, &id, payload).await?))
}

/// Remove a player nobody's schedule or pending swap refers to.
#[utoipa::path(
    delete,
    path = "/players/{id}",
    tag = "players",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Player identifier")),
    responses(
        (status = 204, description = "Player deleted"),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "Player still referenced")
    )
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    player_service::delete_player(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
