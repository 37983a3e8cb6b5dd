use std::env;

/// Production root domain used when `ROOT_DOMAIN` is not set.
pub const DEFAULT_ROOT_DOMAIN: &str = "warrantyhub.io";

/// Hostname token that marks a development request. Portals become
/// `dealer.localhost`, `customer.localhost` and the bare `localhost`.
pub const LOOPBACK_HOST: &str = "localhost";

/// AppConfig
///
/// Holds the gateway's entire configuration state. It is loaded once at start-up and
/// is immutable afterwards; handlers and the access middleware pull it out of the
/// shared state via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and production-only requirements.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Canonical production root domain. Portals are its `dealer.` and `customer.` subdomains.
    pub root_domain: String,
    // Origin of the portal frontend that passed-through requests are forwarded to.
    pub upstream_url: String,
    // Scheme written into absolute redirects when the request does not carry one.
    pub public_scheme: String,
    // Whether X-Forwarded-Host / X-Forwarded-Proto from a fronting proxy are honoured.
    pub trust_forwarded_headers: bool,
}

/// Env
///
/// The runtime context: local development or production deployment.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test setup, equivalent to a local run
    /// without any environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            root_domain: DEFAULT_ROOT_DOMAIN.to_string(),
            upstream_url: "http://localhost:3001".to_string(),
            public_scheme: "http".to_string(),
            trust_forwarded_headers: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `UPSTREAM_URL` is missing, so the gateway never starts
    /// without a place to forward traffic to.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let root_domain = env::var("ROOT_DOMAIN")
            .map(|domain| domain.trim().trim_end_matches('.').to_ascii_lowercase())
            .ok()
            .filter(|domain| !domain.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOT_DOMAIN.to_string());
        let trust_forwarded_headers = env::var("TRUST_FORWARDED_HEADERS")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        match env {
            Env::Local => Self {
                env: Env::Local,
                bind_addr,
                root_domain,
                upstream_url: env::var("UPSTREAM_URL")
                    .unwrap_or_else(|_| "http://localhost:3001".to_string()),
                public_scheme: env::var("PUBLIC_SCHEME").unwrap_or_else(|_| "http".to_string()),
                trust_forwarded_headers,
            },
            Env::Production => Self {
                env: Env::Production,
                bind_addr,
                root_domain,
                upstream_url: env::var("UPSTREAM_URL")
                    .expect("FATAL: UPSTREAM_URL required in prod"),
                public_scheme: env::var("PUBLIC_SCHEME").unwrap_or_else(|_| "https".to_string()),
                trust_forwarded_headers,
            },
        }
    }
}
