//! Glue between the `/swaps` routes and the [`SwapCoordinator`](super::swap_coordinator::SwapCoordinator).

use crate::{
    dto::swap::{CreateSwapRequest, SwapRequestResponse},
    error::ServiceError,
    services::swap_coordinator::Decision,
    state::SharedState,
};

pub async fn create_swap(
    state: &SharedState,
    payload: CreateSwapRequest,
) -> Result<SwapRequestResponse, ServiceError> {
    let coordinator = state.coordinator().await?;
    let swap = coordinator
        .create_swap_request(
            &payload.week_id,
            &payload.requesting_player_id,
            &payload.target_player_id,
        )
        .await?;
    Ok(swap.into())
}

pub async fn list_pending(state: &SharedState) -> Result<Vec<SwapRequestResponse>, ServiceError> {
    let coordinator = state.coordinator().await?;
    let pending = coordinator.pending_requests().await?;
    Ok(pending.into_iter().map(Into::into).collect())
}

pub async fn get_swap(state: &SharedState, id: &str) -> Result<SwapRequestResponse, ServiceError> {
    let coordinator = state.coordinator().await?;
    Ok(coordinator.find_request(id).await?.into())
}

pub async fn decide_swap(
    state: &SharedState,
    id: &str,
    decision: Decision,
) -> Result<SwapRequestResponse, ServiceError> {
    let coordinator = state.coordinator().await?;
    Ok(coordinator.decide(id, decision).await?.into())
}
