use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Internal Router Module
///
/// Endpoints served by the gateway itself. They sit outside the access layer so
/// health probes and operators are not redirected by host or cookie rules.
pub fn internal_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe. Returns "ok" as soon as the server accepts connections.
        .route("/health", get(handlers::health))
        // GET /_gateway/resolve?host=...&path=...&authenticated=...&role=...
        // Reports how the access router would treat the described request.
        .route("/_gateway/resolve", get(handlers::resolve_route))
}
