//! Lifecycle of swap requests: creation, approval, rejection and the schedule
//! rewrite that follows an approval.
//!
//! A request moves from `PENDING` to exactly one terminal status. Decisions on
//! the same id are serialised by [`SwapGates`] and every status write is a
//! conditional write on the previous status, so a request is decided at most
//! once even when several processes share the ledger.

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, warn};

use crate::{
    config::{SwapMode, SwapPolicy},
    dao::{
        league_store::{LeagueStores, PlayerDirectory, Reassigned, ScheduleStore, SwapLedger},
        models::{SwapRequestEntity, SwapStatus},
    },
    error::ServiceError,
    services::notification::{LeagueEvent, NotificationGateway, SwapRef},
};

/// Per swap id locks held while a decision is applied.
#[derive(Clone, Default)]
pub struct SwapGates {
    gates: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Holds the gate of one swap id until dropped.
pub struct GateGuard {
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
    gates: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl SwapGates {
    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: &str) -> GateGuard {
        let gate = self
            .gates
            .entry(id.to_owned())
            .or_default()
            .value()
            .clone();
        let guard = gate.lock_owned().await;
        GateGuard {
            id: id.to_owned(),
            guard: Some(guard),
            gates: self.gates.clone(),
        }
    }

    /// Number of ids with a live gate.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map still references an idle gate.
        self.gates
            .remove_if(&self.id, |_, gate| Arc::strong_count(gate) == 1);
    }
}

/// Outcome requested for a pending swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Schedule rewrite planned before an approval is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotMove {
    Reassign {
        from: String,
        to: String,
        overwrite: bool,
    },
    Exchange { first: String, second: String },
}

#[derive(Clone)]
pub struct SwapCoordinator {
    players: Arc<dyn PlayerDirectory>,
    schedule: Arc<dyn ScheduleStore>,
    swaps: Arc<dyn SwapLedger>,
    notifier: Arc<dyn NotificationGateway>,
    gates: SwapGates,
    policy: SwapPolicy,
}

impl SwapCoordinator {
    pub fn new(
        stores: &LeagueStores,
        notifier: Arc<dyn NotificationGateway>,
        gates: SwapGates,
        policy: SwapPolicy,
    ) -> Self {
        Self {
            players: stores.players.clone(),
            schedule: stores.schedule.clone(),
            swaps: stores.swaps.clone(),
            notifier,
            gates,
            policy,
        }
    }

    /// Record a new pending request and tell the target about it.
    pub async fn create_swap_request(
        &self,
        week_id: &str,
        requesting_player_id: &str,
        target_player_id: &str,
    ) -> Result<SwapRequestEntity, ServiceError> {
        let week_id = required("weekId", week_id)?;
        let requester_id = required("requestingPlayerId", requesting_player_id)?;
        let target_id = required("targetPlayerId", target_player_id)?;
        if requester_id == target_id {
            return Err(ServiceError::InvalidInput(
                "a player cannot swap with themselves".into(),
            ));
        }

        let requester = self
            .players
            .find_player(requester_id.clone())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("player `{requester_id}`")))?;
        let target = self
            .players
            .find_player(target_id.clone())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("player `{target_id}`")))?;

        let record = SwapRequestEntity::pending(week_id, requester_id, target_id, SystemTime::now());
        if !self.swaps.save_swap_if(record.clone(), None).await? {
            self.replace_rejected(&record).await?;
        }

        info!(
            swap_id = %record.id,
            week_id = %record.week_id,
            requester = %record.requesting_player_id,
            target = %record.target_player_id,
            "swap request created"
        );

        let swap = SwapRef {
            swap_id: record.id.clone(),
            week_id: record.week_id.clone(),
            requesting_player_id: requester.id,
            requesting_player_name: requester.name,
            target_player_id: target.id,
            target_player_name: target.name,
        };
        self.dispatch(LeagueEvent::SwapRequested {
            recipient: record.target_player_id.clone(),
            swap,
        })
        .await;

        Ok(record)
    }

    /// Overwrite a rejected record with a fresh pending one when policy allows.
    async fn replace_rejected(&self, record: &SwapRequestEntity) -> Result<(), ServiceError> {
        let existing = self.swaps.find_swap(record.id.clone()).await?;
        match existing.map(|swap| swap.status) {
            Some(SwapStatus::Rejected) if self.policy.allow_recreate_after_reject => {
                if self
                    .swaps
                    .save_swap_if(record.clone(), Some(SwapStatus::Rejected))
                    .await?
                {
                    info!(swap_id = %record.id, "rejected swap request submitted again");
                    Ok(())
                } else {
                    Err(ServiceError::Conflict(format!(
                        "swap request `{}` was changed concurrently",
                        record.id
                    )))
                }
            }
            Some(status) => Err(ServiceError::Conflict(format!(
                "swap request `{}` already exists with status {status}",
                record.id
            ))),
            None => Err(ServiceError::Conflict(format!(
                "swap request `{}` was changed concurrently",
                record.id
            ))),
        }
    }

    /// Approve a pending request and hand the slot over.
    pub async fn approve(&self, swap_id: &str) -> Result<SwapRequestEntity, ServiceError> {
        self.decide(swap_id, Decision::Approve).await
    }

    /// Reject a pending request. The schedule is left untouched.
    pub async fn reject(&self, swap_id: &str) -> Result<SwapRequestEntity, ServiceError> {
        self.decide(swap_id, Decision::Reject).await
    }

    /// Move a pending request to its terminal status.
    pub async fn decide(
        &self,
        swap_id: &str,
        decision: Decision,
    ) -> Result<SwapRequestEntity, ServiceError> {
        let _gate = self.gates.acquire(swap_id).await;

        let current = self
            .swaps
            .find_swap(swap_id.to_owned())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("swap request `{swap_id}`")))?;
        if current.status.is_terminal() {
            return Err(ServiceError::InvalidState(format!(
                "swap request `{swap_id}` is already {}",
                current.status
            )));
        }

        match decision {
            Decision::Approve => self.approve_pending(current).await,
            Decision::Reject => self.reject_pending(current).await,
        }
    }

    async fn approve_pending(
        &self,
        current: SwapRequestEntity,
    ) -> Result<SwapRequestEntity, ServiceError> {
        let slot_move = self.plan_slot_move(&current).await?;
        let approved = current.with_status(SwapStatus::Approved, SystemTime::now());
        self.commit(&approved).await?;

        if let Err(reason) = self.apply_slot_move(&approved.week_id, slot_move).await {
            error!(
                swap_id = %approved.id,
                week_id = %approved.week_id,
                requester = %approved.requesting_player_id,
                target = %approved.target_player_id,
                %reason,
                "swap approved but schedule not updated; manual reconcile required"
            );
            return Err(ServiceError::ReconcileRequired {
                swap_id: approved.id,
                reason,
            });
        }

        info!(
            swap_id = %approved.id,
            week_id = %approved.week_id,
            "swap request approved"
        );

        let swap = self.swap_ref(&approved).await;
        for recipient in [
            &approved.requesting_player_id,
            &approved.target_player_id,
        ] {
            self.dispatch(LeagueEvent::SwapApproved {
                recipient: recipient.clone(),
                swap: swap.clone(),
            })
            .await;
        }

        Ok(approved)
    }

    async fn reject_pending(
        &self,
        current: SwapRequestEntity,
    ) -> Result<SwapRequestEntity, ServiceError> {
        let rejected = current.with_status(SwapStatus::Rejected, SystemTime::now());
        self.commit(&rejected).await?;
        info!(swap_id = %rejected.id, week_id = %rejected.week_id, "swap request rejected");

        if self.policy.notify_on_reject {
            let swap = self.swap_ref(&rejected).await;
            self.dispatch(LeagueEvent::SwapRejected {
                recipient: rejected.requesting_player_id.clone(),
                swap,
            })
            .await;
        }

        Ok(rejected)
    }

    /// Conditional status write on `PENDING`.
    async fn commit(&self, decided: &SwapRequestEntity) -> Result<(), ServiceError> {
        if self
            .swaps
            .save_swap_if(decided.clone(), Some(SwapStatus::Pending))
            .await?
        {
            Ok(())
        } else {
            Err(ServiceError::InvalidState(format!(
                "swap request `{}` was decided concurrently",
                decided.id
            )))
        }
    }

    /// Work out which slot moves, before anything is written.
    async fn plan_slot_move(&self, swap: &SwapRequestEntity) -> Result<SlotMove, ServiceError> {
        let week = &swap.week_id;
        let requester = &swap.requesting_player_id;
        let target = &swap.target_player_id;

        let requester_slot = self
            .schedule
            .find_entry(week.clone(), requester.clone())
            .await?;
        let target_slot = self
            .schedule
            .find_entry(week.clone(), target.clone())
            .await?;

        match (requester_slot.is_some(), target_slot.is_some(), self.policy.mode) {
            (true, false, _) => Ok(SlotMove::Reassign {
                from: requester.clone(),
                to: target.clone(),
                overwrite: false,
            }),
            (false, true, _) => Ok(SlotMove::Reassign {
                from: target.clone(),
                to: requester.clone(),
                overwrite: false,
            }),
            (true, true, SwapMode::Exchange) => Ok(SlotMove::Exchange {
                first: requester.clone(),
                second: target.clone(),
            }),
            (true, true, SwapMode::Repoint) => Ok(SlotMove::Reassign {
                from: requester.clone(),
                to: target.clone(),
                overwrite: true,
            }),
            (true, true, SwapMode::Refuse) => Err(ServiceError::Conflict(format!(
                "players `{requester}` and `{target}` both hold a slot in week `{week}`"
            ))),
            (false, false, _) => Err(ServiceError::InvalidState(format!(
                "neither `{requester}` nor `{target}` holds a slot in week `{week}`"
            ))),
        }
    }

    async fn apply_slot_move(&self, week_id: &str, slot_move: SlotMove) -> Result<(), String> {
        match slot_move {
            SlotMove::Reassign {
                from,
                to,
                overwrite,
            } => {
                match self
                    .schedule
                    .reassign_entry(week_id.to_owned(), from.clone(), to.clone(), overwrite)
                    .await
                {
                    Ok(Reassigned::Moved {
                        replaced: Some(lost),
                        ..
                    }) => {
                        warn!(
                            week_id,
                            from = %from,
                            to = %to,
                            overwritten_time = %lost.time,
                            overwritten_course = %lost.course,
                            "repoint overwrote an existing slot"
                        );
                        Ok(())
                    }
                    Ok(Reassigned::Moved { replaced: None, .. }) => Ok(()),
                    Ok(Reassigned::SourceMissing) => {
                        Err(format!("slot of `{from}` disappeared before reassignment"))
                    }
                    Ok(Reassigned::DestinationTaken) => {
                        Err(format!("`{to}` was given a slot before reassignment"))
                    }
                    Err(err) => Err(err.to_string()),
                }
            }
            SlotMove::Exchange { first, second } => {
                match self
                    .schedule
                    .exchange_entries(week_id.to_owned(), first, second)
                    .await
                {
                    Ok(true) => Ok(()),
                    Ok(false) => Err("a slot disappeared before the exchange".into()),
                    Err(err) => Err(err.to_string()),
                }
            }
        }
    }

    /// Every pending request, oldest first.
    pub async fn pending_requests(&self) -> Result<Vec<SwapRequestEntity>, ServiceError> {
        Ok(self.swaps.swaps_with_status(SwapStatus::Pending).await?)
    }

    /// Look a request up by id.
    pub async fn find_request(&self, swap_id: &str) -> Result<SwapRequestEntity, ServiceError> {
        self.swaps
            .find_swap(swap_id.to_owned())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("swap request `{swap_id}`")))
    }

    async fn swap_ref(&self, swap: &SwapRequestEntity) -> SwapRef {
        SwapRef {
            swap_id: swap.id.clone(),
            week_id: swap.week_id.clone(),
            requesting_player_id: swap.requesting_player_id.clone(),
            requesting_player_name: self.player_name(&swap.requesting_player_id).await,
            target_player_id: swap.target_player_id.clone(),
            target_player_name: self.player_name(&swap.target_player_id).await,
        }
    }

    async fn player_name(&self, id: &str) -> String {
        match self.players.find_player(id.to_owned()).await {
            Ok(Some(player)) => player.name,
            Ok(None) => id.to_owned(),
            Err(err) => {
                warn!(player_id = %id, error = %err, "player lookup failed; using id as name");
                id.to_owned()
            }
        }
    }

    /// Best effort: failures are logged and never undo committed state.
    async fn dispatch(&self, event: LeagueEvent) {
        let kind = event.kind();
        let recipient = event.recipient().to_owned();
        if let Err(err) = self.notifier.notify(event).await {
            warn!(%kind, %recipient, error = %err, "notification failed");
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::{
            league_store::memory::MemoryLeagueStore,
            models::{PlayerEntity, ScheduleEntryEntity},
            storage::{StorageError, StorageResult},
        },
        services::notification::{EventKind, NotifyError},
    };

    const WEEK: &str = "2024-05-12";

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        events: Arc<StdMutex<Vec<LeagueEvent>>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn events(&self) -> Vec<LeagueEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl NotificationGateway for RecordingNotifier {
        fn notify(&self, event: LeagueEvent) -> BoxFuture<'static, Result<(), NotifyError>> {
            let notifier = self.clone();
            Box::pin(async move {
                let recipient = event.recipient().to_owned();
                notifier.events.lock().unwrap().push(event);
                if notifier.fail {
                    return Err(NotifyError::UnknownRecipient(recipient));
                }
                Ok(())
            })
        }
    }

    /// Schedule whose writes always fail, reads go to the wrapped store.
    #[derive(Clone)]
    struct BrokenWrites(MemoryLeagueStore);

    fn offline() -> StorageError {
        StorageError::unavailable(
            "schedule offline".into(),
            std::io::Error::other("connection reset"),
        )
    }

    impl ScheduleStore for BrokenWrites {
        fn find_entry(
            &self,
            week_id: String,
            player_id: String,
        ) -> BoxFuture<'static, StorageResult<Option<ScheduleEntryEntity>>> {
            self.0.find_entry(week_id, player_id)
        }

        fn save_entry(&self, _entry: ScheduleEntryEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(offline()) })
        }

        fn entries_for_week(
            &self,
            week_id: String,
        ) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>> {
            self.0.entries_for_week(week_id)
        }

        fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>> {
            self.0.list_entries()
        }

        fn reassign_entry(
            &self,
            _week_id: String,
            _from: String,
            _to: String,
            _overwrite: bool,
        ) -> BoxFuture<'static, StorageResult<Reassigned>> {
            Box::pin(async { Err(offline()) })
        }

        fn exchange_entries(
            &self,
            _week_id: String,
            _first: String,
            _second: String,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Err(offline()) })
        }
    }

    struct Fixture {
        store: MemoryLeagueStore,
        notifier: RecordingNotifier,
        coordinator: SwapCoordinator,
    }

    fn player(id: &str) -> PlayerEntity {
        PlayerEntity {
            id: id.into(),
            name: format!("Player {id}"),
            email: format!("{id}@example.com"),
            phone_number: None,
            share: 50,
        }
    }

    fn slot(player_id: &str, time: &str, course: &str) -> ScheduleEntryEntity {
        ScheduleEntryEntity {
            week_id: WEEK.into(),
            player_id: player_id.into(),
            time: time.into(),
            course: course.into(),
        }
    }

    async fn seeded_store() -> MemoryLeagueStore {
        let store = MemoryLeagueStore::new();
        for id in ["A", "B", "C"] {
            store.save_player(player(id)).await.unwrap();
        }
        store.save_entry(slot("A", "5:30 PM", "TBD")).await.unwrap();
        store
    }

    async fn fixture_with(policy: SwapPolicy, notifier: RecordingNotifier) -> Fixture {
        let store = seeded_store().await;
        let stores = LeagueStores::from_backend(store.clone());
        let coordinator =
            SwapCoordinator::new(&stores, Arc::new(notifier.clone()), SwapGates::default(), policy);
        Fixture {
            store,
            notifier,
            coordinator,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(SwapPolicy::default(), RecordingNotifier::default()).await
    }

    fn kinds(events: &[LeagueEvent]) -> Vec<EventKind> {
        events.iter().map(LeagueEvent::kind).collect()
    }

    #[tokio::test]
    async fn approve_hands_slot_to_requester_end_to_end() {
        let fx = fixture().await;

        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();
        assert_eq!(created.id, "2024-05-12-B-A");
        assert_eq!(created.status, SwapStatus::Pending);
        assert!(created.updated_at.is_none());

        let fetched = fx.coordinator.find_request(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let approved = fx.coordinator.approve(&created.id).await.unwrap();
        assert_eq!(approved.status, SwapStatus::Approved);
        assert!(approved.updated_at.is_some());

        let week = fx.store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(week, vec![slot("B", "5:30 PM", "TBD")]);

        let events = fx.notifier.events();
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::SwapRequested,
                EventKind::SwapApproved,
                EventKind::SwapApproved
            ]
        );
        assert_eq!(events[0].recipient(), "A");
        let mut approved_to: Vec<&str> = events[1..].iter().map(LeagueEvent::recipient).collect();
        approved_to.sort();
        assert_eq!(approved_to, vec!["A", "B"]);
        assert!(fx.coordinator.pending_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn approve_repoints_requester_slot_to_target() {
        let fx = fixture().await;

        let created = fx
            .coordinator
            .create_swap_request(WEEK, "A", "C")
            .await
            .unwrap();
        fx.coordinator.approve(&created.id).await.unwrap();

        assert!(fx.store.find_entry(WEEK.into(), "A".into()).await.unwrap().is_none());
        assert_eq!(
            fx.store.find_entry(WEEK.into(), "C".into()).await.unwrap(),
            Some(slot("C", "5:30 PM", "TBD"))
        );
    }

    #[tokio::test]
    async fn reject_leaves_schedule_untouched() {
        let fx = fixture().await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        let rejected = fx.coordinator.reject(&created.id).await.unwrap();
        assert_eq!(rejected.status, SwapStatus::Rejected);

        let week = fx.store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(week, vec![slot("A", "5:30 PM", "TBD")]);
        assert_eq!(kinds(&fx.notifier.events()), vec![EventKind::SwapRequested]);
    }

    #[tokio::test]
    async fn reject_notifies_requester_when_enabled() {
        let policy = SwapPolicy {
            notify_on_reject: true,
            ..SwapPolicy::default()
        };
        let fx = fixture_with(policy, RecordingNotifier::default()).await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();
        fx.coordinator.reject(&created.id).await.unwrap();

        let events = fx.notifier.events();
        assert_eq!(
            kinds(&events),
            vec![EventKind::SwapRequested, EventKind::SwapRejected]
        );
        assert_eq!(events[1].recipient(), "B");
    }

    #[tokio::test]
    async fn second_decision_is_refused_without_side_effects() {
        let fx = fixture().await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();
        fx.coordinator.approve(&created.id).await.unwrap();
        let events_before = fx.notifier.events().len();

        for decision in [Decision::Approve, Decision::Reject] {
            let err = fx
                .coordinator
                .decide(&created.id, decision)
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidState(_)), "{err:?}");
        }

        assert_eq!(fx.notifier.events().len(), events_before);
        let week = fx.store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(week, vec![slot("B", "5:30 PM", "TBD")]);
    }

    #[tokio::test]
    async fn racing_approvals_take_effect_once() {
        let fx = fixture().await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        let first = fx.coordinator.clone();
        let second = fx.coordinator.clone();
        let (a, b) = tokio::join!(first.approve(&created.id), second.approve(&created.id));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let approvals = fx
            .notifier
            .events()
            .iter()
            .filter(|event| event.kind() == EventKind::SwapApproved)
            .count();
        assert_eq!(approvals, 2);
        assert!(fx.coordinator.gates.is_empty());
    }

    #[tokio::test]
    async fn create_validates_input() {
        let fx = fixture().await;

        let same = fx
            .coordinator
            .create_swap_request(WEEK, "A", "A")
            .await
            .unwrap_err();
        assert!(matches!(same, ServiceError::InvalidInput(_)));

        let padded = fx
            .coordinator
            .create_swap_request(WEEK, " A ", "A")
            .await
            .unwrap_err();
        assert!(matches!(padded, ServiceError::InvalidInput(_)));

        let blank = fx
            .coordinator
            .create_swap_request("  ", "A", "B")
            .await
            .unwrap_err();
        assert!(matches!(blank, ServiceError::InvalidInput(_)));

        let unknown = fx
            .coordinator
            .create_swap_request(WEEK, "B", "Z")
            .await
            .unwrap_err();
        assert!(matches!(unknown, ServiceError::NotFound(_)));
        assert!(fx.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_until_rejected() {
        let fx = fixture().await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        let duplicate = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap_err();
        assert!(matches!(duplicate, ServiceError::Conflict(_)));

        fx.coordinator.reject(&created.id).await.unwrap();
        let again = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();
        assert_eq!(again.status, SwapStatus::Pending);
        assert!(again.updated_at.is_none());
    }

    #[tokio::test]
    async fn recreate_after_reject_can_be_disabled() {
        let policy = SwapPolicy {
            allow_recreate_after_reject: false,
            ..SwapPolicy::default()
        };
        let fx = fixture_with(policy, RecordingNotifier::default()).await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();
        fx.coordinator.reject(&created.id).await.unwrap();

        let err = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn approve_requires_a_slot_in_the_week() {
        let fx = fixture().await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "C")
            .await
            .unwrap();

        let err = fx.coordinator.approve(&created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(
            fx.coordinator.find_request(&created.id).await.unwrap().status,
            SwapStatus::Pending
        );
    }

    #[tokio::test]
    async fn hyphenated_player_ids_get_distinct_requests() {
        let fx = fixture().await;
        for id in ["a-b", "c", "a", "b-c"] {
            fx.store.save_player(player(id)).await.unwrap();
        }

        let first = fx
            .coordinator
            .create_swap_request("w", "a-b", "c")
            .await
            .unwrap();
        let second = fx
            .coordinator
            .create_swap_request("w", "a", "b-c")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(fx.coordinator.pending_requests().await.unwrap().len(), 2);
        assert_eq!(
            fx.coordinator.find_request(&second.id).await.unwrap().requesting_player_id,
            "a"
        );
    }

    #[tokio::test]
    async fn repoint_replaces_target_slot_when_both_hold_slots() {
        let fx = fixture().await;
        fx.store.save_entry(slot("B", "6:10 PM", "North")).await.unwrap();
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        let approved = fx.coordinator.approve(&created.id).await.unwrap();
        assert_eq!(approved.status, SwapStatus::Approved);

        let week = fx.store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(week, vec![slot("A", "6:10 PM", "North")]);
    }

    #[tokio::test]
    async fn refuse_mode_keeps_request_pending_when_both_hold_slots() {
        let policy = SwapPolicy {
            mode: SwapMode::Refuse,
            ..SwapPolicy::default()
        };
        let fx = fixture_with(policy, RecordingNotifier::default()).await;
        fx.store.save_entry(slot("B", "6:10 PM", "North")).await.unwrap();
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        let err = fx.coordinator.approve(&created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(
            fx.coordinator.find_request(&created.id).await.unwrap().status,
            SwapStatus::Pending
        );
        let week = fx.store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(
            week,
            vec![slot("A", "5:30 PM", "TBD"), slot("B", "6:10 PM", "North")]
        );
    }

    #[tokio::test]
    async fn exchange_mode_trades_times() {
        let policy = SwapPolicy {
            mode: SwapMode::Exchange,
            ..SwapPolicy::default()
        };
        let fx = fixture_with(policy, RecordingNotifier::default()).await;
        fx.store.save_entry(slot("B", "6:10 PM", "North")).await.unwrap();
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        fx.coordinator.approve(&created.id).await.unwrap();

        let week = fx.store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(
            week,
            vec![slot("A", "6:10 PM", "North"), slot("B", "5:30 PM", "TBD")]
        );
    }

    #[tokio::test]
    async fn failed_reassignment_reports_partial_approval() {
        let store = seeded_store().await;
        let notifier = RecordingNotifier::default();
        let stores = LeagueStores {
            schedule: Arc::new(BrokenWrites(store.clone())),
            ..LeagueStores::from_backend(store.clone())
        };
        let coordinator = SwapCoordinator::new(
            &stores,
            Arc::new(notifier.clone()),
            SwapGates::default(),
            SwapPolicy::default(),
        );
        let created = coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();

        let err = coordinator.approve(&created.id).await.unwrap_err();
        assert!(
            matches!(&err, ServiceError::ReconcileRequired { swap_id, .. } if swap_id == "2024-05-12-B-A")
        );

        assert_eq!(
            coordinator.find_request(&created.id).await.unwrap().status,
            SwapStatus::Approved
        );
        let week = store.entries_for_week(WEEK.into()).await.unwrap();
        assert_eq!(week, vec![slot("A", "5:30 PM", "TBD")]);
        assert_eq!(kinds(&notifier.events()), vec![EventKind::SwapRequested]);
    }

    #[tokio::test]
    async fn notification_failures_do_not_fail_calls() {
        let fx = fixture_with(SwapPolicy::default(), RecordingNotifier::failing()).await;
        let created = fx
            .coordinator
            .create_swap_request(WEEK, "B", "A")
            .await
            .unwrap();
        let approved = fx.coordinator.approve(&created.id).await.unwrap();

        assert_eq!(approved.status, SwapStatus::Approved);
        assert_eq!(fx.notifier.events().len(), 3);
    }

    #[tokio::test]
    async fn unknown_swap_is_not_found() {
        let fx = fixture().await;
        let err = fx.coordinator.approve("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = fx.coordinator.find_request("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
