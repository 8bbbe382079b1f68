use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{PlayerEntity, ScheduleEntryEntity, SwapRequestEntity, SwapStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    email: String,
    #[serde(default)]
    phone_number: Option<String>,
    share: i32,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            phone_number: value.phone_number,
            share: i32::from(value.share),
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            phone_number: value.phone_number,
            share: value.share.clamp(0, 100) as u8,
        }
    }
}

/// Schedule rows keep the server-generated `_id`; the `(week_id, player_id)` pair is
/// guarded by a unique index instead so a slot can be handed to another player in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScheduleDocument {
    week_id: String,
    player_id: String,
    time: String,
    course: String,
}

impl From<ScheduleEntryEntity> for MongoScheduleDocument {
    fn from(value: ScheduleEntryEntity) -> Self {
        Self {
            week_id: value.week_id,
            player_id: value.player_id,
            time: value.time,
            course: value.course,
        }
    }
}

impl From<MongoScheduleDocument> for ScheduleEntryEntity {
    fn from(value: MongoScheduleDocument) -> Self {
        Self {
            week_id: value.week_id,
            player_id: value.player_id,
            time: value.time,
            course: value.course,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSwapDocument {
    #[serde(rename = "_id")]
    id: String,
    week_id: String,
    requesting_player_id: String,
    target_player_id: String,
    status: SwapStatus,
    created_at: DateTime,
    #[serde(default)]
    updated_at: Option<DateTime>,
}

impl From<SwapRequestEntity> for MongoSwapDocument {
    fn from(value: SwapRequestEntity) -> Self {
        Self {
            id: value.id,
            week_id: value.week_id,
            requesting_player_id: value.requesting_player_id,
            target_player_id: value.target_player_id,
            status: value.status,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: value.updated_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoSwapDocument> for SwapRequestEntity {
    fn from(value: MongoSwapDocument) -> Self {
        Self {
            id: value.id,
            week_id: value.week_id,
            requesting_player_id: value.requesting_player_id,
            target_player_id: value.target_player_id,
            status: value.status,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.map(|at| at.to_system_time()),
        }
    }
}

pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}

pub fn slot_filter(week_id: &str, player_id: &str) -> Document {
    doc! {"week_id": week_id, "player_id": player_id}
}
