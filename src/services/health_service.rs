use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness and whether storage is usable, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.stores().await {
        Some(stores) => {
            if let Err(err) = stores.health.health_check().await {
                warn!(error = %err, "storage health check failed");
                return HealthResponse::degraded();
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
