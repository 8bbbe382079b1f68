//! Wire types of the `/players` routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{DEFAULT_SHARE, PlayerEntity},
    dto::validation::validate_key_component,
};

/// Payload used to register a league member.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    /// Stable identifier, usually the email address.
    #[validate(custom(function = "validate_key_component"))]
    pub id: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Share of the season played, 0 to 100. Defaults to 50.
    #[serde(default)]
    #[validate(range(max = 100))]
    pub percentage: Option<u8>,
}

impl CreatePlayerRequest {
    pub fn into_entity(self) -> PlayerEntity {
        PlayerEntity {
            id: self.id.trim().to_owned(),
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone_number: normalize_phone(self.phone_number),
            share: self.percentage.unwrap_or(DEFAULT_SHARE),
        }
    }
}

/// Replacement attributes for an existing player; the id comes from the path.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub percentage: Option<u8>,
}

impl UpdatePlayerRequest {
    pub fn into_entity(self, id: String) -> PlayerEntity {
        PlayerEntity {
            id,
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone_number: normalize_phone(self.phone_number),
            share: self.percentage.unwrap_or(DEFAULT_SHARE),
        }
    }
}

fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Player as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub percentage: u8,
}

impl From<PlayerEntity> for PlayerResponse {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            phone_number: value.phone_number,
            percentage: value.share,
        }
    }
}
