//! Weekly schedule management behind the `/schedule` routes.
//!
//! Every write tells the affected player about their new time and course.

use tracing::{info, warn};

use crate::{
    dao::{league_store::LeagueStores, models::ScheduleEntryEntity},
    dto::schedule::{CreateScheduleEntryRequest, ScheduleEntryResponse, UpdateScheduleEntryRequest},
    error::ServiceError,
    services::notification::LeagueEvent,
    state::SharedState,
};

pub async fn list_schedule(state: &SharedState) -> Result<Vec<ScheduleEntryResponse>, ServiceError> {
    let stores = state.require_stores().await?;
    let entries = stores.schedule.list_entries().await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

pub async fn week_schedule(
    state: &SharedState,
    week_id: &str,
) -> Result<Vec<ScheduleEntryResponse>, ServiceError> {
    let stores = state.require_stores().await?;
    let entries = stores.schedule.entries_for_week(week_id.to_owned()).await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

/// Store a slot for a known player, replacing any slot they had that week.
pub async fn create_entry(
    state: &SharedState,
    payload: CreateScheduleEntryRequest,
) -> Result<ScheduleEntryResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let entry = payload.into_entity();

    if stores
        .players
        .find_player(entry.player_id.clone())
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound(format!("player `{}`", entry.player_id)));
    }

    stores.schedule.save_entry(entry.clone()).await?;
    info!(week_id = %entry.week_id, player_id = %entry.player_id, "schedule entry saved");
    announce(state, &stores, &entry).await;
    Ok(entry.into())
}

/// Change time and course of an existing slot.
pub async fn update_entry(
    state: &SharedState,
    week_id: &str,
    payload: UpdateScheduleEntryRequest,
) -> Result<ScheduleEntryResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let player_id = payload.player_id.trim().to_owned();

    let Some(current) = stores
        .schedule
        .find_entry(week_id.to_owned(), player_id.clone())
        .await?
    else {
        return Err(ServiceError::NotFound(format!(
            "schedule entry for `{player_id}` in week `{week_id}`"
        )));
    };

    let entry = ScheduleEntryEntity {
        time: payload.time,
        course: payload.course,
        ..current
    };
    stores.schedule.save_entry(entry.clone()).await?;
    info!(week_id = %entry.week_id, player_id = %entry.player_id, "schedule entry updated");
    announce(state, &stores, &entry).await;
    Ok(entry.into())
}

async fn announce(state: &SharedState, stores: &LeagueStores, entry: &ScheduleEntryEntity) {
    let event = LeagueEvent::ScheduleUpdated {
        recipient: entry.player_id.clone(),
        week_id: entry.week_id.clone(),
        time: entry.time.clone(),
        course: entry.course.clone(),
    };
    if let Err(err) = state.notifier(stores).notify(event).await {
        warn!(player_id = %entry.player_id, error = %err, "schedule notification failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            league_store::{PlayerDirectory, memory::MemoryLeagueStore},
            models::PlayerEntity,
        },
        services::notification::LogChannel,
        state::AppState,
    };

    async fn state_with_player(id: &str) -> SharedState {
        let store = MemoryLeagueStore::new();
        store
            .save_player(PlayerEntity {
                id: id.into(),
                name: "Al".into(),
                email: "al@example.com".into(),
                phone_number: None,
                share: 50,
            })
            .await
            .unwrap();
        AppState::with_stores(
            AppConfig::default(),
            Arc::new(LogChannel),
            LeagueStores::from_backend(store),
        )
        .await
    }

    #[tokio::test]
    async fn create_requires_known_player() {
        let state = state_with_player("a").await;
        let payload = CreateScheduleEntryRequest {
            week_id: "2024-05-12".into(),
            player_id: "ghost".into(),
            time: "5:30 PM".into(),
            course: "TBD".into(),
        };

        let err = create_entry(&state, payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_changes_time_and_course_only() {
        let state = state_with_player("a").await;
        create_entry(
            &state,
            CreateScheduleEntryRequest {
                week_id: "2024-05-12".into(),
                player_id: "a".into(),
                time: "5:30 PM".into(),
                course: "TBD".into(),
            },
        )
        .await
        .unwrap();

        let updated = update_entry(
            &state,
            "2024-05-12",
            UpdateScheduleEntryRequest {
                player_id: "a".into(),
                time: "6:10 PM".into(),
                course: "North".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.player_id, "a");
        assert_eq!(updated.time, "6:10 PM");

        let week = week_schedule(&state, "2024-05-12").await.unwrap();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].course, "North");

        let err = update_entry(
            &state,
            "2024-05-19",
            UpdateScheduleEntryRequest {
                player_id: "a".into(),
                time: "6:10 PM".into(),
                course: "North".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
