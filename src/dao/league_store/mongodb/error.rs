use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save player `{id}`")]
    SavePlayer {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load player `{id}`")]
    LoadPlayer {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete player `{id}`")]
    DeletePlayer {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list players")]
    ListPlayers {
        #[source]
        source: MongoError,
    },
    #[error("failed to save schedule entry for `{player_id}` in week `{week_id}`")]
    SaveEntry {
        week_id: String,
        player_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load schedule ({scope})")]
    LoadSchedule {
        scope: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to move schedule slot of `{player_id}` in week `{week_id}`")]
    MoveEntry {
        week_id: String,
        player_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to save swap request `{id}`")]
    SaveSwap {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load swap request `{id}`")]
    LoadSwap {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list swap requests")]
    ListSwaps {
        #[source]
        source: MongoError,
    },
}
