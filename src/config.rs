//! Application-level configuration loading, including the swap policy and API tokens.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TEE_SWAP_CONFIG_PATH";

/// How an approved swap rewrites the schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapMode {
    /// The requester's slot is handed over to the target unchanged, replacing any
    /// slot the target already held that week.
    #[default]
    Repoint,
    /// Requester and target trade time and course.
    Exchange,
    /// Like `Repoint`, but approval is refused when both players hold a slot.
    Refuse,
}

/// Rules applied by the swap coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPolicy {
    /// Schedule rewrite applied on approval.
    pub mode: SwapMode,
    /// Whether a rejected request may be submitted again for the same triple.
    pub allow_recreate_after_reject: bool,
    /// Whether the requester hears about a rejection.
    pub notify_on_reject: bool,
}

impl Default for SwapPolicy {
    fn default() -> Self {
        Self {
            mode: SwapMode::Repoint,
            allow_recreate_after_reject: true,
            notify_on_reject: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    policy: SwapPolicy,
    api_tokens: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        mode = ?app_config.policy.mode,
                        tokens = app_config.api_tokens.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration in code, mostly for tests.
    pub fn new(policy: SwapPolicy, api_tokens: Vec<String>) -> Self {
        Self { policy, api_tokens }
    }

    /// Swap rules handed to the coordinator.
    pub fn policy(&self) -> SwapPolicy {
        self.policy
    }

    /// Accepted bearer tokens. Empty means any non-empty token passes.
    pub fn api_tokens(&self) -> &[String] {
        &self.api_tokens
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    swap_mode: SwapMode,
    #[serde(default = "default_true")]
    allow_recreate_after_reject: bool,
    #[serde(default)]
    notify_on_reject: bool,
    #[serde(default)]
    api_tokens: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let api_tokens = value
            .api_tokens
            .into_iter()
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
            .collect();
        Self {
            policy: SwapPolicy {
                mode: value.swap_mode,
                allow_recreate_after_reject: value.allow_recreate_after_reject,
                notify_on_reject: value.notify_on_reject,
            },
            api_tokens,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
