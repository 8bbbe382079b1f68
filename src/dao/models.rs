use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Participation share assigned to players created without an explicit value.
pub const DEFAULT_SHARE: u8 = 50;

/// Roster entry for a league member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable identifier for the player (usually the email address).
    pub id: String,
    /// Display name shown on the schedule.
    pub name: String,
    /// Address used for email notifications.
    pub email: String,
    /// Optional phone number used for SMS notifications.
    pub phone_number: Option<String>,
    /// Percentage of the season the player takes part in.
    pub share: u8,
}

/// Tee-time assignment of one player for one week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleEntryEntity {
    /// Week identifier (usually the ISO date of the playing day).
    pub week_id: String,
    /// Player holding the slot.
    pub player_id: String,
    /// Free-text tee time (e.g. "5:30 PM").
    pub time: String,
    /// Free-text course name.
    pub course: String,
}

/// Lifecycle status of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    /// Waiting for a decision.
    Pending,
    /// Approved; the schedule slot has been handed over.
    Approved,
    /// Rejected; no schedule effect.
    Rejected,
}

impl SwapStatus {
    /// Wire representation used in storage filters and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Pending => "PENDING",
            SwapStatus::Approved => "APPROVED",
            SwapStatus::Rejected => "REJECTED",
        }
    }

    /// Approved and rejected requests never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request from one player to hand their weekly slot to another player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapRequestEntity {
    /// Deterministic identifier, see [`swap_request_id`].
    pub id: String,
    /// Week the swap applies to.
    pub week_id: String,
    /// Player giving away their slot.
    pub requesting_player_id: String,
    /// Player asked to take the slot.
    pub target_player_id: String,
    /// Current lifecycle status.
    pub status: SwapStatus,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Timestamp of the status transition, if any.
    pub updated_at: Option<SystemTime>,
}

impl SwapRequestEntity {
    /// Build a fresh pending request for the given triple.
    pub fn pending(
        week_id: String,
        requesting_player_id: String,
        target_player_id: String,
        created_at: SystemTime,
    ) -> Self {
        Self {
            id: swap_request_id(&week_id, &requesting_player_id, &target_player_id),
            week_id,
            requesting_player_id,
            target_player_id,
            status: SwapStatus::Pending,
            created_at,
            updated_at: None,
        }
    }

    /// Copy of this request moved to `status` at `at`.
    pub fn with_status(&self, status: SwapStatus, at: SystemTime) -> Self {
        Self {
            status,
            updated_at: Some(at),
            ..self.clone()
        }
    }
}

/// Identifier shared by every request for the same week and player pair.
///
/// Player ids are escaped so they never contain `-`: the last two `-` always
/// separate the players, and distinct triples never share an id.
pub fn swap_request_id(week_id: &str, requesting_player_id: &str, target_player_id: &str) -> String {
    format!(
        "{week_id}-{}-{}",
        escape_player_id(requesting_player_id),
        escape_player_id(target_player_id)
    )
}

fn escape_player_id(player_id: &str) -> String {
    let mut escaped = String::with_capacity(player_id.len());
    for c in player_id.chars() {
        match c {
            '~' => escaped.push_str("~7e"),
            '-' => escaped.push_str("~2d"),
            other => escaped.push(other),
        }
    }
    escaped
}
