use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warranty_gateway::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    upstream::{ReqwestUpstream, UpstreamState},
};

/// main
///
/// Entry point: configuration, logging, upstream client, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for the gateway itself so redirects are visible.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warranty_gateway=debug,tower_http=info".into());

    // 3. Logging format by environment: pretty locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Gateway starting in {:?} mode", config.env);
    tracing::info!(
        root_domain = %config.root_domain,
        upstream = %config.upstream_url,
        trust_forwarded_headers = config.trust_forwarded_headers,
        "routing configuration loaded"
    );

    // 4. Upstream client for the portal frontend.
    let upstream = ReqwestUpstream::new(&config.upstream_url)
        .expect("FATAL: Failed to build the upstream HTTP client.");
    let upstream = Arc::new(upstream) as UpstreamState;

    // 5. Router and Server Startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, upstream));

    let listener = TcpListener::bind(bind_addr.as_str())
        .await
        .expect("FATAL: Failed to bind the listen address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("Gateway API documentation available at /_gateway/docs");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
