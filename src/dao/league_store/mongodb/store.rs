use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::open_database,
    error::{MongoDaoError, MongoResult},
    models::{MongoPlayerDocument, MongoScheduleDocument, MongoSwapDocument, doc_id, slot_filter},
};
use crate::dao::{
    league_store::{PlayerDirectory, Reassigned, ScheduleStore, StorageHealth, SwapLedger},
    models::{PlayerEntity, ScheduleEntryEntity, SwapRequestEntity, SwapStatus},
    storage::StorageResult,
};

const PLAYER_COLLECTION_NAME: &str = "players";
const SCHEDULE_COLLECTION_NAME: &str = "schedule";
const SWAP_COLLECTION_NAME: &str = "swap_requests";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoLeagueStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = open_database(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        // findAndModify reports index violations as command errors.
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl MongoLeagueStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = open_database(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let slot_index = IndexModel::builder()
            .keys(doc! {"week_id": 1, "player_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("schedule_slot_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        database
            .collection::<MongoScheduleDocument>(SCHEDULE_COLLECTION_NAME)
            .create_index(slot_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SCHEDULE_COLLECTION_NAME,
                index: "week_id,player_id",
                source,
            })?;

        let status_index = IndexModel::builder()
            .keys(doc! {"status": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("swap_status_idx".to_owned()))
                    .build(),
            )
            .build();
        database
            .collection::<MongoSwapDocument>(SWAP_COLLECTION_NAME)
            .create_index(status_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SWAP_COLLECTION_NAME,
                index: "status",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database().await.collection(PLAYER_COLLECTION_NAME)
    }

    async fn schedule(&self) -> Collection<MongoScheduleDocument> {
        self.database().await.collection(SCHEDULE_COLLECTION_NAME)
    }

    async fn swaps(&self) -> Collection<MongoSwapDocument> {
        self.database().await.collection(SWAP_COLLECTION_NAME)
    }

    async fn find_player(&self, id: String) -> MongoResult<Option<PlayerEntity>> {
        let document = self
            .players()
            .await
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadPlayer { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn save_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let id = player.id.clone();
        let document: MongoPlayerDocument = player.into();
        self.players()
            .await
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SavePlayer { id, source })?;
        Ok(())
    }

    async fn list_players(&self) -> MongoResult<Vec<PlayerEntity>> {
        let documents: Vec<MongoPlayerDocument> = self
            .players()
            .await
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_player(&self, id: String) -> MongoResult<bool> {
        let result = self
            .players()
            .await
            .delete_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::DeletePlayer { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn find_entry(
        &self,
        week_id: String,
        player_id: String,
    ) -> MongoResult<Option<ScheduleEntryEntity>> {
        let document = self
            .schedule()
            .await
            .find_one(slot_filter(&week_id, &player_id))
            .await
            .map_err(|source| MongoDaoError::LoadSchedule {
                scope: format!("week `{week_id}`, player `{player_id}`"),
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn save_entry(&self, entry: ScheduleEntryEntity) -> MongoResult<()> {
        let filter = slot_filter(&entry.week_id, &entry.player_id);
        let (week_id, player_id) = (entry.week_id.clone(), entry.player_id.clone());
        let document: MongoScheduleDocument = entry.into();
        self.schedule()
            .await
            .replace_one(filter, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveEntry {
                week_id,
                player_id,
                source,
            })?;
        Ok(())
    }

    async fn query_schedule(
        &self,
        filter: mongodb::bson::Document,
        scope: String,
    ) -> MongoResult<Vec<ScheduleEntryEntity>> {
        let documents: Vec<MongoScheduleDocument> = self
            .schedule()
            .await
            .find(filter)
            .sort(doc! {"week_id": 1, "player_id": 1})
            .await
            .map_err(|source| MongoDaoError::LoadSchedule {
                scope: scope.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadSchedule { scope, source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn reassign_entry(
        &self,
        week_id: String,
        from: String,
        to: String,
        overwrite: bool,
    ) -> MongoResult<Reassigned> {
        if self.find_entry(week_id.clone(), from.clone()).await?.is_none() {
            return Ok(Reassigned::SourceMissing);
        }
        let replaced = self.find_entry(week_id.clone(), to.clone()).await?;
        if replaced.is_some() && !overwrite {
            return Ok(Reassigned::DestinationTaken);
        }

        let collection = self.schedule().await;
        if replaced.is_some() {
            // Not atomic with the move below; the unique index still rejects a racing insert.
            collection
                .delete_one(slot_filter(&week_id, &to))
                .await
                .map_err(|source| MongoDaoError::MoveEntry {
                    week_id: week_id.clone(),
                    player_id: to.clone(),
                    source,
                })?;
        }

        match collection
            .find_one_and_update(slot_filter(&week_id, &from), doc! {"$set": {"player_id": &to}})
            .return_document(ReturnDocument::After)
            .await
        {
            Ok(Some(document)) => Ok(Reassigned::Moved {
                entry: document.into(),
                replaced,
            }),
            Ok(None) => Ok(Reassigned::SourceMissing),
            Err(err) if is_duplicate_key(&err) => Ok(Reassigned::DestinationTaken),
            Err(source) => Err(MongoDaoError::MoveEntry {
                week_id,
                player_id: from,
                source,
            }),
        }
    }

    async fn exchange_entries(
        &self,
        week_id: String,
        first: String,
        second: String,
    ) -> MongoResult<bool> {
        let (Some(a), Some(b)) = (
            self.find_entry(week_id.clone(), first.clone()).await?,
            self.find_entry(week_id.clone(), second.clone()).await?,
        ) else {
            return Ok(false);
        };

        // No multi-document transaction: the second update can fail after the first landed.
        let collection = self.schedule().await;
        for (player_id, time, course) in [(&first, &b.time, &b.course), (&second, &a.time, &a.course)]
        {
            collection
                .update_one(
                    slot_filter(&week_id, player_id),
                    doc! {"$set": {"time": time, "course": course}},
                )
                .await
                .map_err(|source| MongoDaoError::MoveEntry {
                    week_id: week_id.clone(),
                    player_id: player_id.clone(),
                    source,
                })?;
        }
        Ok(true)
    }

    async fn find_swap(&self, id: String) -> MongoResult<Option<SwapRequestEntity>> {
        let document = self
            .swaps()
            .await
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadSwap { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn save_swap(&self, swap: SwapRequestEntity) -> MongoResult<()> {
        let id = swap.id.clone();
        let document: MongoSwapDocument = swap.into();
        self.swaps()
            .await
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveSwap { id, source })?;
        Ok(())
    }

    async fn save_swap_if(
        &self,
        swap: SwapRequestEntity,
        expected: Option<SwapStatus>,
    ) -> MongoResult<bool> {
        let id = swap.id.clone();
        let document: MongoSwapDocument = swap.into();
        let collection = self.swaps().await;

        match expected {
            None => match collection.insert_one(&document).await {
                Ok(_) => Ok(true),
                Err(err) if is_duplicate_key(&err) => Ok(false),
                Err(source) => Err(MongoDaoError::SaveSwap { id, source }),
            },
            Some(status) => {
                let result = collection
                    .replace_one(doc! {"_id": &id, "status": status.as_str()}, &document)
                    .await
                    .map_err(|source| MongoDaoError::SaveSwap { id, source })?;
                Ok(result.matched_count == 1)
            }
        }
    }

    async fn query_swaps(
        &self,
        filter: mongodb::bson::Document,
    ) -> MongoResult<Vec<SwapRequestEntity>> {
        let documents: Vec<MongoSwapDocument> = self
            .swaps()
            .await
            .find(filter)
            .sort(doc! {"created_at": 1, "_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListSwaps { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListSwaps { source })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl PlayerDirectory for MongoLeagueStore {
    fn find_player(&self, id: String) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_player(id).await.map_err(Into::into) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_player(player).await.map_err(Into::into) })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players().await.map_err(Into::into) })
    }

    fn delete_player(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_player(id).await.map_err(Into::into) })
    }
}

impl ScheduleStore for MongoLeagueStore {
    fn find_entry(
        &self,
        week_id: String,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<ScheduleEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_entry(week_id, player_id)
                .await
                .map_err(Into::into)
        })
    }

    fn save_entry(&self, entry: ScheduleEntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_entry(entry).await.map_err(Into::into) })
    }

    fn entries_for_week(
        &self,
        week_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let scope = format!("week `{week_id}`");
            store
                .query_schedule(doc! {"week_id": week_id}, scope)
                .await
                .map_err(Into::into)
        })
    }

    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<ScheduleEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .query_schedule(doc! {}, "all weeks".to_owned())
                .await
                .map_err(Into::into)
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
            store
                .reassign_entry(week_id, from, to, overwrite)
                .await
                .map_err(Into::into)
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
            store
                .exchange_entries(week_id, first, second)
                .await
                .map_err(Into::into)
        })
    }
}

impl SwapLedger for MongoLeagueStore {
    fn find_swap(&self, id: String) -> BoxFuture<'static, StorageResult<Option<SwapRequestEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_swap(id).await.map_err(Into::into) })
    }

    fn save_swap(&self, swap: SwapRequestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_swap(swap).await.map_err(Into::into) })
    }

    fn save_swap_if(
        &self,
        swap: SwapRequestEntity,
        expected: Option<SwapStatus>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.save_swap_if(swap, expected).await.map_err(Into::into) })
    }

    fn swaps_with_status(
        &self,
        status: SwapStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<SwapRequestEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .query_swaps(doc! {"status": status.as_str()})
                .await
                .map_err(Into::into)
        })
    }
}

impl StorageHealth for MongoLeagueStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
