//! Wire types of the `/swaps` routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{SwapRequestEntity, SwapStatus},
    dto::{format_system_time, validation::validate_key_component},
    services::swap_coordinator::Decision,
};

/// Payload submitted by a player asking another player to take their week.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequest {
    #[validate(custom(function = "validate_key_component"))]
    pub week_id: String,
    #[validate(custom(function = "validate_key_component"))]
    pub requesting_player_id: String,
    #[validate(custom(function = "validate_key_component"))]
    pub target_player_id: String,
}

/// Status accepted by `PUT /swaps/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestedStatus {
    /// `ACCEPTED` is what the legacy web client sends.
    #[serde(alias = "ACCEPTED")]
    Approved,
    Rejected,
}

impl From<RequestedStatus> for Decision {
    fn from(value: RequestedStatus) -> Self {
        match value {
            RequestedStatus::Approved => Decision::Approve,
            RequestedStatus::Rejected => Decision::Reject,
        }
    }
}

/// Body of `PUT /swaps/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideSwapRequest {
    pub status: RequestedStatus,
}

/// Swap request as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestResponse {
    pub id: String,
    pub week_id: String,
    pub requesting_player_id: String,
    pub target_player_id: String,
    pub status: SwapStatus,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the decision, absent while pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<SwapRequestEntity> for SwapRequestResponse {
    fn from(value: SwapRequestEntity) -> Self {
        Self {
            id: value.id,
            week_id: value.week_id,
            requesting_player_id: value.requesting_player_id,
            target_player_id: value.target_player_id,
            status: value.status,
            created_at: format_system_time(value.created_at),
            updated_at: value.updated_at.map(format_system_time),
        }
    }
}
