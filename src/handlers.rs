use crate::{
    access::{AccessRouter, Decision, InboundRequest},
    auth::Session,
    models::{ResolveAction, RouteDecisionResponse},
    upstream::{UpstreamError, UpstreamState},
};
use axum::{
    Json,
    extract::{Query, Request, State},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

// --- Filter Structs ---

/// ResolveQuery
///
/// Query parameters of the routing diagnostics endpoint. They describe a request
/// as the gateway would see it; `authenticated` stands in for the access token.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    /// Host header value, with optional port. Omit to simulate a missing host.
    pub host: Option<String>,
    /// Request path, optionally followed by `?query`.
    pub path: String,
    /// `http` or `https`; defaults to the configured public scheme.
    pub scheme: Option<String>,
    /// Whether an access token cookie is present.
    #[serde(default)]
    pub authenticated: bool,
    /// Value of the `userRole` cookie.
    pub role: Option<String>,
}

// --- Handlers ---

/// health
///
/// [Internal Route] Liveness probe for load balancers. Not subject to access checks.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Gateway is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// resolve_route
///
/// [Internal Route] Runs the access router against a described request and reports
/// the portal, route class and decision without forwarding anything.
#[utoipa::path(
    get,
    path = "/_gateway/resolve",
    params(ResolveQuery),
    responses((status = 200, description = "Routing decision", body = RouteDecisionResponse))
)]
pub async fn resolve_route(
    State(access): State<Arc<AccessRouter>>,
    Query(query): Query<ResolveQuery>,
) -> Json<RouteDecisionResponse> {
    let (path, request_query) = match query.path.split_once('?') {
        Some((path, rest)) => (path, Some(rest)),
        None => (query.path.as_str(), None),
    };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let session = Session::new(
        query.authenticated.then_some("diagnostic"),
        query.role.as_deref(),
    );
    let outcome = access.route(&InboundRequest {
        host: query.host.as_deref(),
        scheme: query.scheme.as_deref(),
        path: &path,
        query: request_query,
        session: &session,
    });

    let (action, location, reason) = match outcome.decision {
        Decision::Pass => (ResolveAction::Pass, None, None),
        Decision::Redirect { location, reason } => {
            (ResolveAction::Redirect, Some(location), Some(reason))
        }
    };

    Json(RouteDecisionResponse {
        portal: outcome.portal,
        route_class: outcome.route_class,
        action,
        location,
        reason,
    })
}

/// forward_to_portal
///
/// [Portal Route] Fallback for every path the gateway does not serve itself.
/// Reached only after the access middleware let the request through.
pub async fn forward_to_portal(
    State(upstream): State<UpstreamState>,
    request: Request,
) -> Result<Response, UpstreamError> {
    upstream.forward(request).await
}
