//! Roster management behind the `/players` routes.

use tracing::info;

use crate::{
    dao::models::SwapStatus,
    dto::player::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
    error::ServiceError,
    state::SharedState,
};

pub async fn list_players(state: &SharedState) -> Result<Vec<PlayerResponse>, ServiceError> {
    let stores = state.require_stores().await?;
    let players = stores.players.list_players().await?;
    Ok(players.into_iter().map(Into::into).collect())
}

pub async fn get_player(state: &SharedState, id: &str) -> Result<PlayerResponse, ServiceError> {
    let stores = state.require_stores().await?;
    stores
        .players
        .find_player(id.to_owned())
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{id}`")))
}

/// Register a player. Ids are unique, so an existing id is a conflict.
pub async fn create_player(
    state: &SharedState,
    payload: CreatePlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    let stores = state.require_stores().await?;
    let player = payload.into_entity();

    if stores.players.find_player(player.id.clone()).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "player `{}` already exists",
            player.id
        )));
    }

    stores.players.save_player(player.clone()).await?;
    info!(player_id = %player.id, "player created");
    Ok(player.into())
}

/// Replace the attributes of an existing player; the id never changes.
pub async fn update_player(
    state: &SharedState,
    id: &str,
    payload: UpdatePlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    let stores = state.require_stores().await?;
    if stores.players.find_player(id.to_owned()).await?.is_none() {
        return Err(ServiceError::NotFound(format!("player `{id}`")));
    }

    let player = payload.into_entity(id.to_owned());
    stores.players.save_player(player.clone()).await?;
    info!(player_id = %id, "player updated");
    Ok(player.into())
}

/// Remove a player that no schedule slot or pending swap refers to.
pub async fn delete_player(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let stores = state.require_stores().await?;

    let scheduled_weeks = stores
        .schedule
        .list_entries()
        .await?
        .into_iter()
        .filter(|entry| entry.player_id == id)
        .count();
    if scheduled_weeks > 0 {
        return Err(ServiceError::Conflict(format!(
            "player `{id}` still holds {scheduled_weeks} schedule slot(s)"
        )));
    }

    let pending = stores
        .swaps
        .swaps_with_status(SwapStatus::Pending)
        .await?
        .into_iter()
        .any(|swap| swap.requesting_player_id == id || swap.target_player_id == id);
    if pending {
        return Err(ServiceError::Conflict(format!(
            "player `{id}` is part of a pending swap request"
        )));
    }

    if !stores.players.delete_player(id.to_owned()).await? {
        return Err(ServiceError::NotFound(format!("player `{id}`")));
    }
    info!(player_id = %id, "player deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            league_store::{LeagueStores, ScheduleStore, memory::MemoryLeagueStore},
            models::ScheduleEntryEntity,
        },
        services::notification::LogChannel,
        state::AppState,
    };

    async fn state_with(store: MemoryLeagueStore) -> SharedState {
        AppState::with_stores(
            AppConfig::default(),
            Arc::new(LogChannel),
            LeagueStores::from_backend(store),
        )
        .await
    }

    fn create(id: &str) -> CreatePlayerRequest {
        CreatePlayerRequest {
            id: id.into(),
            name: format!("Player {id}"),
            email: format!("{id}@example.com"),
            phone_number: None,
            percentage: None,
        }
    }

    #[tokio::test]
    async fn create_then_conflict_on_same_id() {
        let state = state_with(MemoryLeagueStore::new()).await;

        let created = create_player(&state, create("a")).await.unwrap();
        assert_eq!(created.percentage, 50);

        let err = create_player(&state, create("a")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(list_players(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_requires_existing_player() {
        let state = state_with(MemoryLeagueStore::new()).await;
        let update = UpdatePlayerRequest {
            name: "Al".into(),
            email: "al@example.com".into(),
            phone_number: Some("+15550100".into()),
            percentage: Some(75),
        };

        let err = update_player(&state, "a", update).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_refuses_scheduled_players() {
        let store = MemoryLeagueStore::new();
        let state = state_with(store.clone()).await;
        create_player(&state, create("a")).await.unwrap();
        create_player(&state, create("b")).await.unwrap();
        store
            .save_entry(ScheduleEntryEntity {
                week_id: "2024-05-12".into(),
                player_id: "a".into(),
                time: "5:30 PM".into(),
                course: "TBD".into(),
            })
            .await
            .unwrap();

        let err = delete_player(&state, "a").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        delete_player(&state, "b").await.unwrap();
        let err = get_player(&state, "b").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = delete_player(&state, "b").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
