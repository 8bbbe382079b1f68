use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::league_store::LeagueStores,
    error::ServiceError,
    services::{
        notification::{DirectoryNotifier, MessageChannel, NotificationGateway},
        swap_coordinator::{SwapCoordinator, SwapGates},
    },
};

pub type SharedState = Arc<AppState>;

/// Central application state holding the storage handles and shared services.
pub struct AppState {
    stores: RwLock<Option<LeagueStores>>,
    channel: Arc<dyn MessageChannel>,
    config: AppConfig,
    gates: SwapGates,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, channel: Arc<dyn MessageChannel>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            stores: RwLock::new(None),
            channel,
            config,
            gates: SwapGates::default(),
            degraded: degraded_tx,
        })
    }

    /// Build a state with `stores` already installed.
    pub async fn with_stores(
        config: AppConfig,
        channel: Arc<dyn MessageChannel>,
        stores: LeagueStores,
    ) -> SharedState {
        let state = Self::new(config, channel);
        state.set_stores(stores).await;
        state
    }

    /// Current store handles, if a backend is installed.
    pub async fn stores(&self) -> Option<LeagueStores> {
        let guard = self.stores.read().await;
        guard.clone()
    }

    /// Store handles, or [`ServiceError::Degraded`] while storage is down.
    pub async fn require_stores(&self) -> Result<LeagueStores, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.stores().await.ok_or(ServiceError::Degraded)
    }

    /// Install a backend and leave degraded mode.
    pub async fn set_stores(&self, stores: LeagueStores) {
        {
            let mut guard = self.stores.write().await;
            *guard = Some(stores);
        }
        self.update_degraded(false);
    }

    /// Drop the backend and enter degraded mode.
    pub async fn clear_stores(&self) {
        {
            let mut guard = self.stores.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Notification gateway backed by the installed player directory.
    pub fn notifier(&self, stores: &LeagueStores) -> Arc<dyn NotificationGateway> {
        Arc::new(DirectoryNotifier::new(
            stores.players.clone(),
            self.channel.clone(),
        ))
    }

    /// Coordinator wired to the current stores.
    pub async fn coordinator(&self) -> Result<SwapCoordinator, ServiceError> {
        let stores = self.require_stores().await?;
        let notifier = self.notifier(&stores);
        Ok(SwapCoordinator::new(
            &stores,
            notifier,
            self.gates.clone(),
            self.config.policy(),
        ))
    }
}
