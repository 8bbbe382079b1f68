use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Registers the bearer scheme referenced by the protected routes.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Access token issued by the league's identity provider."))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the tee-swap service.
#[openapi(
    modifiers(&BearerSecurity),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::swaps::create_swap,
        crate::routes::swaps::list_pending,
        crate::routes::swaps::get_swap,
        crate::routes::swaps::approve_swap,
        crate::routes::swaps::reject_swap,
        crate::routes::swaps::decide_swap,
        crate::routes::players::list_players,
        crate::routes::players::create_player,
        crate::routes::players::get_player,
        crate::routes::players::update_player,
        crate::routes::players::delete_player,
        crate::routes::schedule::list_schedule,
        crate::routes::schedule::create_entry,
        crate::routes::schedule::week_schedule,
        crate::routes::schedule::update_entry,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::swap::CreateSwapRequest,
            crate::dto::swap::DecideSwapRequest,
            crate::dto::swap::RequestedStatus,
            crate::dto::swap::SwapRequestResponse,
            crate::dto::player::CreatePlayerRequest,
            crate::dto::player::UpdatePlayerRequest,
            crate::dto::player::PlayerResponse,
            crate::dto::schedule::CreateScheduleEntryRequest,
            crate::dto::schedule::UpdateScheduleEntryRequest,
            crate::dto::schedule::ScheduleEntryResponse,
            crate::dao::models::SwapStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "swaps", description = "Swap request lifecycle"),
        (name = "players", description = "League roster"),
        (name = "schedule", description = "Weekly tee times"),
    )
)]
pub struct ApiDoc;
