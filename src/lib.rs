use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core gateway services and components.
pub mod access;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod upstream;

// Module for routing segregation (Internal, Portal).
pub mod routes;
use routes::{internal, portal};

// --- Public Re-exports ---

pub use access::AccessRouter;
pub use config::AppConfig;
pub use upstream::{MockUpstream, ReqwestUpstream, UpstreamState};

/// ApiDoc
///
/// OpenAPI description of the gateway's own endpoints, served as JSON at
/// `/_gateway/openapi.json` and browsable at `/_gateway/docs`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::resolve_route),
    components(
        schemas(
            models::PortalType, models::Role, models::RouteClass, models::RedirectReason,
            models::ResolveAction, models::RouteDecisionResponse,
        )
    ),
    tags(
        (name = "warranty-gateway", description = "Portal access gateway")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container shared by every request: configuration, the
/// access routing policy, and the upstream the portal traffic is forwarded to.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Access policy: pure host/path/cookie decision function.
    pub access: Arc<AccessRouter>,
    /// Upstream: where passed-through requests are sent.
    pub upstream: UpstreamState,
}

impl AppState {
    /// Builds the state from configuration, deriving the access policy from it.
    pub fn new(config: AppConfig, upstream: UpstreamState) -> Self {
        let access = Arc::new(AccessRouter::from_config(&config));
        Self {
            config,
            access,
            upstream,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<AccessRouter> {
    fn from_ref(app_state: &AppState) -> Arc<AccessRouter> {
        app_state.access.clone()
    }
}

impl FromRef<AppState> for UpstreamState {
    fn from_ref(app_state: &AppState) -> UpstreamState {
        app_state.upstream.clone()
    }
}

/// create_router
///
/// Assembles the gateway: internal endpoints and docs outside the access layer,
/// the access-checked portal fallback, then request-id and tracing layers around
/// everything.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/_gateway/docs").url("/_gateway/openapi.json", ApiDoc::openapi()))
        // Internal Routes: No access checks.
        .merge(internal::internal_routes())
        // Portal Routes: Access router, then forward to the frontend.
        .merge(portal::portal_routes(state.clone()))
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Request ID Generation: a UUID for every incoming request.
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            // Request Tracing: one span per request, carrying the request ID.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // Request ID Propagation: echo x-request-id on the response.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI, host and `x-request-id`, so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");
    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        host = %host,
        req_id = %request_id,
    )
}
