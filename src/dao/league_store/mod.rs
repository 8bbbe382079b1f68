pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::dao::models::{PlayerEntity, ScheduleEntryEntity, SwapRequestEntity, SwapStatus};
use crate::dao::storage::StorageResult;

/// Roster of league members keyed by player id.
pub trait PlayerDirectory: Send + Sync {
    fn find_player(&self, id: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    fn delete_player(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Outcome of [`ScheduleStore::reassign_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reassigned {
    /// The slot moved.
    Moved {
        /// The entry under its new key.
        entry: ScheduleEntryEntity,
        /// Destination entry that was overwritten, if any.
        replaced: Option<ScheduleEntryEntity>,
    },
    /// `from` held no slot that week.
    SourceMissing,
    /// `to` already held a slot and overwriting was not allowed.
    DestinationTaken,
}

/// Weekly tee-time assignments keyed by `(week_id, player_id)`.
///
/// The store is a mapping: saving an entry replaces whatever sits at the same key.
pub trait ScheduleStore: Send + Sync {
    fn find_entry(
        &self,
        week_id: String,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<ScheduleEntryEntity>>>;
    fn save_entry(&self, entry: ScheduleEntryEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn entries_for_week(
        &self,
        week_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>>;
    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>>;
    /// Move the entry at `(week_id, from)` to `(week_id, to)`, keeping time and course.
    ///
    /// An entry already at `(week_id, to)` is only replaced when `overwrite` is set;
    /// otherwise nothing is written.
    fn reassign_entry(
        &self,
        week_id: String,
        from: String,
        to: String,
        overwrite: bool,
    ) -> BoxFuture<'static, StorageResult<Reassigned>>;
    /// Trade time and course between the slots of `first` and `second`.
    ///
    /// Returns `false` without writing anything when either slot is missing.
    fn exchange_entries(
        &self,
        week_id: String,
        first: String,
        second: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Swap requests keyed by their deterministic id.
pub trait SwapLedger: Send + Sync {
    fn find_swap(&self, id: String) -> BoxFuture<'static, StorageResult<Option<SwapRequestEntity>>>;
    fn save_swap(&self, swap: SwapRequestEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Conditional write used for every status change.
    ///
    /// With `expected == None` the record is written only if no record with the same id
    /// exists; with `Some(status)` only if the stored record currently has that status.
    /// Returns whether the write happened.
    fn save_swap_if(
        &self,
        swap: SwapRequestEntity,
        expected: Option<SwapStatus>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn swaps_with_status(
        &self,
        status: SwapStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<SwapRequestEntity>>>;
}

/// Connectivity checks used by the storage supervisor.
pub trait StorageHealth: Send + Sync {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Bundle of store handles served by a single backend.
#[derive(Clone)]
pub struct LeagueStores {
    /// Player roster.
    pub players: Arc<dyn PlayerDirectory>,
    /// Weekly schedule.
    pub schedule: Arc<dyn ScheduleStore>,
    /// Swap request ledger.
    pub swaps: Arc<dyn SwapLedger>,
    /// Health check of the backend.
    pub health: Arc<dyn StorageHealth>,
}

impl LeagueStores {
    /// Expose every store trait of `backend` through shared handles.
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: PlayerDirectory + ScheduleStore + SwapLedger + StorageHealth + Clone + 'static,
    {
        Self {
            players: Arc::new(backend.clone()),
            schedule: Arc::new(backend.clone()),
            swaps: Arc::new(backend.clone()),
            health: Arc::new(backend),
        }
    }
}
