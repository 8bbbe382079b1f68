//! Process-local backend used by tests and by `STORAGE_BACKEND=memory`.

use std::{collections::BTreeMap, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use super::{PlayerDirectory, Reassigned, ScheduleStore, StorageHealth, SwapLedger};
use crate::dao::{
    models::{PlayerEntity, ScheduleEntryEntity, SwapRequestEntity, SwapStatus},
    storage::StorageResult,
};

type ScheduleKey = (String, String);

#[derive(Clone, Default)]
pub struct MemoryLeagueStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    players: DashMap<String, PlayerEntity>,
    schedule: RwLock<BTreeMap<ScheduleKey, ScheduleEntryEntity>>,
    swaps: DashMap<String, SwapRequestEntity>,
}

impl MemoryLeagueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn schedule_key(week_id: &str, player_id: &str) -> ScheduleKey {
    (week_id.to_owned(), player_id.to_owned())
}

impl PlayerDirectory for MemoryLeagueStore {
    fn find_player(&self, id: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.players.get(&id).map(|p| p.value().clone())) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.players.insert(player.id.clone(), player);
            Ok(())
        })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut players: Vec<PlayerEntity> = store
                .inner
                .players
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            players.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(players)
        })
    }

    fn delete_player(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.players.remove(&id).is_some()) })
    }
}

impl ScheduleStore for MemoryLeagueStore {
    fn find_entry(
        &self,
        week_id: String,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<ScheduleEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.schedule.read().await;
            Ok(guard.get(&(week_id, player_id)).cloned())
        })
    }

    fn save_entry(&self, entry: ScheduleEntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.schedule.write().await;
            guard.insert(schedule_key(&entry.week_id, &entry.player_id), entry);
            Ok(())
        })
    }

    fn entries_for_week(
        &self,
        week_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.schedule.read().await;
            Ok(guard
                .values()
                .filter(|entry| entry.week_id == week_id)
                .cloned()
                .collect())
        })
    }

    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.schedule.read().await;
            Ok(guard.values().cloned().collect())
        })
    }

    fn reassign_entry(
        &self,
        week_id: String,
        from: String,
        to: String,
        overwrite: bool,
    ) -> BoxFuture<'static, StorageResult<Reassigned>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.schedule.write().await;
            let source_key = schedule_key(&week_id, &from);
            let destination_key = schedule_key(&week_id, &to);
            if !guard.contains_key(&source_key) {
                return Ok(Reassigned::SourceMissing);
            }
            if !overwrite && guard.contains_key(&destination_key) {
                return Ok(Reassigned::DestinationTaken);
            }

            let Some(mut entry) = guard.remove(&source_key) else {
                return Ok(Reassigned::SourceMissing);
            };
            entry.player_id = to;
            let replaced = guard.insert(destination_key, entry.clone());
            Ok(Reassigned::Moved { entry, replaced })
        })
    }

    fn exchange_entries(
        &self,
        week_id: String,
        first: String,
        second: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.inner.schedule.write().await;
            let first_key = schedule_key(&week_id, &first);
            let second_key = schedule_key(&week_id, &second);
            let (Some(a), Some(b)) = (guard.get(&first_key).cloned(), guard.get(&second_key).cloned())
            else {
                return Ok(false);
            };

            guard.insert(
                first_key,
                ScheduleEntryEntity {
                    time: b.time,
                    course: b.course,
                    ..a.clone()
                },
            );
            guard.insert(
                second_key,
                ScheduleEntryEntity {
                    time: a.time,
                    course: a.course,
                    ..b
                },
            );
            Ok(true)
        })
    }
}

impl SwapLedger for MemoryLeagueStore {
    fn find_swap(&self, id: String) -> BoxFuture<'static, StorageResult<Option<SwapRequestEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.swaps.get(&id).map(|s| s.value().clone())) })
    }

    fn save_swap(&self, swap: SwapRequestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.swaps.insert(swap.id.clone(), swap);
            Ok(())
        })
    }

    fn save_swap_if(
        &self,
        swap: SwapRequestEntity,
        expected: Option<SwapStatus>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let written = match (store.inner.swaps.entry(swap.id.clone()), expected) {
                (Entry::Vacant(slot), None) => {
                    slot.insert(swap);
                    true
                }
                (Entry::Occupied(mut slot), Some(status)) if slot.get().status == status => {
                    slot.insert(swap);
                    true
                }
                _ => false,
            };
            Ok(written)
        })
    }

    fn swaps_with_status(
        &self,
        status: SwapStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<SwapRequestEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut swaps: Vec<SwapRequestEntity> = store
                .inner
                .swaps
                .iter()
                .filter(|entry| entry.status == status)
                .map(|entry| entry.value().clone())
                .collect();
            swaps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            Ok(swaps)
        })
    }
}

impl StorageHealth for MemoryLeagueStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn entry(week: &str, player: &str, time: &str, course: &str) -> ScheduleEntryEntity {
        ScheduleEntryEntity {
            week_id: week.into(),
            player_id: player.into(),
            time: time.into(),
            course: course.into(),
        }
    }

    #[tokio::test]
    async fn save_entry_replaces_same_key() {
        let store = MemoryLeagueStore::new();
        store.save_entry(entry("w1", "a", "8:00", "North")).await.unwrap();
        store.save_entry(entry("w1", "a", "9:00", "South")).await.unwrap();

        let week = store.entries_for_week("w1".into()).await.unwrap();
        assert_eq!(week, vec![entry("w1", "a", "9:00", "South")]);
    }

    #[tokio::test]
    async fn reassign_moves_slot_to_new_player() {
        let store = MemoryLeagueStore::new();
        store.save_entry(entry("w1", "a", "8:00", "North")).await.unwrap();

        let moved = store
            .reassign_entry("w1".into(), "a".into(), "b".into(), false)
            .await
            .unwrap();
        assert_eq!(
            moved,
            Reassigned::Moved {
                entry: entry("w1", "b", "8:00", "North"),
                replaced: None,
            }
        );
        assert!(store.find_entry("w1".into(), "a".into()).await.unwrap().is_none());

        let missing = store
            .reassign_entry("w1".into(), "zed".into(), "b".into(), false)
            .await
            .unwrap();
        assert_eq!(missing, Reassigned::SourceMissing);
    }

    #[tokio::test]
    async fn reassign_keeps_occupied_destination_unless_overwriting() {
        let store = MemoryLeagueStore::new();
        store.save_entry(entry("w1", "a", "8:00", "North")).await.unwrap();
        store.save_entry(entry("w1", "b", "9:00", "South")).await.unwrap();

        let refused = store
            .reassign_entry("w1".into(), "a".into(), "b".into(), false)
            .await
            .unwrap();
        assert_eq!(refused, Reassigned::DestinationTaken);
        assert_eq!(
            store.entries_for_week("w1".into()).await.unwrap(),
            vec![entry("w1", "a", "8:00", "North"), entry("w1", "b", "9:00", "South")]
        );

        let moved = store
            .reassign_entry("w1".into(), "a".into(), "b".into(), true)
            .await
            .unwrap();
        assert_eq!(
            moved,
            Reassigned::Moved {
                entry: entry("w1", "b", "8:00", "North"),
                replaced: Some(entry("w1", "b", "9:00", "South")),
            }
        );
        assert_eq!(
            store.entries_for_week("w1".into()).await.unwrap(),
            vec![entry("w1", "b", "8:00", "North")]
        );
    }

    #[tokio::test]
    async fn exchange_trades_time_and_course() {
        let store = MemoryLeagueStore::new();
        store.save_entry(entry("w1", "a", "8:00", "North")).await.unwrap();
        store.save_entry(entry("w1", "b", "9:00", "South")).await.unwrap();

        assert!(
            store
                .exchange_entries("w1".into(), "a".into(), "b".into())
                .await
                .unwrap()
        );
        let a = store.find_entry("w1".into(), "a".into()).await.unwrap();
        let b = store.find_entry("w1".into(), "b".into()).await.unwrap();
        assert_eq!(a, Some(entry("w1", "a", "9:00", "South")));
        assert_eq!(b, Some(entry("w1", "b", "8:00", "North")));

        assert!(
            !store
                .exchange_entries("w1".into(), "a".into(), "nobody".into())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn conditional_swap_write_checks_expected_status() {
        let store = MemoryLeagueStore::new();
        let pending =
            SwapRequestEntity::pending("w1".into(), "a".into(), "b".into(), SystemTime::now());

        assert!(store.save_swap_if(pending.clone(), None).await.unwrap());
        assert!(!store.save_swap_if(pending.clone(), None).await.unwrap());

        let approved = pending.with_status(SwapStatus::Approved, SystemTime::now());
        assert!(
            !store
                .save_swap_if(approved.clone(), Some(SwapStatus::Rejected))
                .await
                .unwrap()
        );
        assert!(
            store
                .save_swap_if(approved.clone(), Some(SwapStatus::Pending))
                .await
                .unwrap()
        );
        assert!(
            !store
                .save_swap_if(approved, Some(SwapStatus::Pending))
                .await
                .unwrap()
        );

        let pending_only = store.swaps_with_status(SwapStatus::Pending).await.unwrap();
        assert!(pending_only.is_empty());

        let stored = store.find_swap("w1-a-b".into()).await.unwrap().expect("swap stored");
        assert_eq!(stored.status, SwapStatus::Approved);
        store
            .save_swap(stored.with_status(SwapStatus::Rejected, SystemTime::now()))
            .await
            .unwrap();
        let overwritten = store.find_swap("w1-a-b".into()).await.unwrap().expect("swap stored");
        assert_eq!(overwritten.status, SwapStatus::Rejected);
    }
}
