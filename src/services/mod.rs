/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Player notifications.
pub mod notification;
/// Player roster management.
pub mod player_service;
/// Weekly schedule management.
pub mod schedule_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Swap request lifecycle.
pub mod swap_coordinator;
/// Route-facing wrappers around the swap coordinator.
pub mod swap_service;
