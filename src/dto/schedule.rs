//! Wire types of the `/schedule` routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::ScheduleEntryEntity, dto::validation::validate_key_component};

/// Payload creating (or replacing) the slot of one player in one week.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleEntryRequest {
    #[validate(custom(function = "validate_key_component"))]
    pub week_id: String,
    #[validate(custom(function = "validate_key_component"))]
    pub player_id: String,
    /// Free-text tee time, e.g. "5:30 PM".
    #[validate(length(min = 1))]
    pub time: String,
    #[validate(length(min = 1))]
    pub course: String,
}

impl CreateScheduleEntryRequest {
    pub fn into_entity(self) -> ScheduleEntryEntity {
        ScheduleEntryEntity {
            week_id: self.week_id.trim().to_owned(),
            player_id: self.player_id.trim().to_owned(),
            time: self.time,
            course: self.course,
        }
    }
}

/// Body of `PUT /schedule/{week_id}`: new time and course for one player's slot.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleEntryRequest {
    #[validate(custom(function = "validate_key_component"))]
    pub player_id: String,
    #[validate(length(min = 1))]
    pub time: String,
    #[validate(length(min = 1))]
    pub course: String,
}

/// Schedule slot as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryResponse {
    pub week_id: String,
    pub player_id: String,
    pub time: String,
    pub course: String,
}

impl From<ScheduleEntryEntity> for ScheduleEntryResponse {
    fn from(value: ScheduleEntryEntity) -> Self {
        Self {
            week_id: value.week_id,
            player_id: value.player_id,
            time: value.time,
            course: value.course,
        }
    }
}
