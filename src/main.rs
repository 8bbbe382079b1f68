//! tee-swap binary entrypoint wiring the REST API, storage supervision and notifications.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tee_swap::{
    config::AppConfig,
    dao::league_store::{LeagueStores, memory::MemoryLeagueStore},
    routes,
    services::notification::{LogChannel, MessageChannel},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let channel = notification_channel()?;

    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "mongo".into());
    let app_state = match backend.trim().to_ascii_lowercase().as_str() {
        "memory" => {
            warn!("using in-memory storage; data is lost on restart");
            AppState::with_stores(
                config,
                channel,
                LeagueStores::from_backend(MemoryLeagueStore::new()),
            )
            .await
        }
        "mongo" | "mongodb" => {
            let state = AppState::new(config, channel);
            spawn_mongo_supervisor(state.clone()).await?;
            state
        }
        other => anyhow::bail!("unsupported STORAGE_BACKEND `{other}` (expected `mongo` or `memory`)"),
    };

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, %backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

#[cfg(feature = "mongo-store")]
async fn spawn_mongo_supervisor(state: SharedState) -> anyhow::Result<()> {
    use tee_swap::{
        dao::{
            league_store::mongodb::{MongoConfig, MongoLeagueStore},
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = env::var("MONGO_DB").ok();
    let config = MongoConfig::from_uri(&uri, db_name.as_deref())
        .await
        .context("parsing MONGO_URI")?;

    tokio::spawn(storage_supervisor::run(state, move || {
        let config = config.clone();
        async move {
            let store = MongoLeagueStore::connect(config)
                .await
                .map_err(StorageError::from)?;
            Ok::<_, StorageError>(LeagueStores::from_backend(store))
        }
    }));
    Ok(())
}

#[cfg(not(feature = "mongo-store"))]
async fn spawn_mongo_supervisor(_state: SharedState) -> anyhow::Result<()> {
    anyhow::bail!("built without the `mongo-store` feature; set STORAGE_BACKEND=memory")
}

/// Pick the delivery channel for player notifications.
fn notification_channel() -> anyhow::Result<Arc<dyn MessageChannel>> {
    match env::var("NOTIFY_WEBHOOK_URL").ok().filter(|url| !url.trim().is_empty()) {
        #[cfg(feature = "webhook-notifier")]
        Some(url) => {
            let channel = tee_swap::services::notification::webhook::WebhookChannel::new(&url)
                .context("building notification webhook client")?;
            info!(%url, "notifications delivered through webhook");
            Ok(Arc::new(channel))
        }
        #[cfg(not(feature = "webhook-notifier"))]
        Some(_) => {
            warn!("NOTIFY_WEBHOOK_URL set but built without `webhook-notifier`; logging notifications");
            Ok(Arc::new(LogChannel))
        }
        None => {
            info!("no NOTIFY_WEBHOOK_URL; notifications are only logged");
            Ok(Arc::new(LogChannel))
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
