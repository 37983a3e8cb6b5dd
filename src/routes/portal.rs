use crate::{AppState, gateway::access_middleware, handlers};
use axum::{Router, middleware};

/// Portal Router Module
///
/// Catches every path not owned by the gateway and forwards it to the portal
/// frontend. The whole router, fallback included, is wrapped in the access
/// middleware: a request reaches `forward_to_portal` only when the access router
/// passed it, and its response leaves with the security headers attached.
pub fn portal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .fallback(handlers::forward_to_portal)
        .layer(middleware::from_fn_with_state(state, access_middleware))
}
