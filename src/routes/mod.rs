use axum::{Router, middleware};

use crate::state::SharedState;

pub mod auth;
pub mod docs;
mod extract;
pub mod health;
pub mod players;
pub mod schedule;
pub mod swaps;

/// Compose all route trees, wiring in shared state and documentation routes.
///
/// Health and documentation stay public; everything else sits behind the bearer guard.
pub fn router(state: SharedState) -> Router<()> {
    let protected = swaps::router()
        .merge(players::router())
        .merge(schedule::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    health::router()
        .merge(docs::router())
        .merge(protected)
        .with_state(state)
}
