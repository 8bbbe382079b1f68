use std::time::Duration;

use mongodb::{Client, Database, bson::doc};
use tokio::time::sleep;
use tracing::debug;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

/// Pings before giving up; the storage supervisor retries on a slower cadence.
const PING_ATTEMPTS: u32 = 3;
const PING_DELAY: Duration = Duration::from_millis(250);

/// Build a client for `config` and wait until the server answers a ping.
pub async fn open_database(config: &MongoConfig) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut delay = PING_DELAY;
    let mut attempt = 1;
    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok((client, database)),
            Err(source) if attempt >= PING_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                debug!(attempt, database = %config.database_name, error = %err, "MongoDB ping failed; retrying");
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}
