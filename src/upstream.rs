use async_trait::async_trait;
use axum::{
    body::{self, Body},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;

/// Largest request body the gateway buffers before forwarding.
pub const MAX_FORWARD_BODY: usize = 10 * 1024 * 1024;

// Connection-scoped headers that must not cross the proxy hop.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// ForwardedOrigin
///
/// Host and scheme the access router resolved for a request. The gateway middleware
/// attaches it as a request extension; the forwarder turns it into
/// `X-Forwarded-Host` / `X-Forwarded-Proto`, replacing whatever the client sent.
#[derive(Debug, Clone)]
pub struct ForwardedOrigin {
    pub host: Option<HeaderValue>,
    pub scheme: HeaderValue,
}

impl ForwardedOrigin {
    pub fn new(host: Option<&str>, scheme: &str) -> Self {
        Self {
            host: host.and_then(|host| HeaderValue::from_str(host).ok()),
            scheme: HeaderValue::from_str(scheme)
                .unwrap_or_else(|_| HeaderValue::from_static("http")),
        }
    }

    // Requests forwarded without passing the middleware: trust only the Host header.
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            host: headers.get(header::HOST).cloned(),
            scheme: HeaderValue::from_static("http"),
        }
    }
}

/// UpstreamError
///
/// The ways forwarding a request to the portal frontend can fail.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request body could not be buffered within the forward limit")]
    BodyTooLarge,
    #[error("upstream unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = match self {
            UpstreamError::BodyTooLarge => {
                tracing::warn!(error = %self, "rejecting request body");
                StatusCode::PAYLOAD_TOO_LARGE
            }
            _ => {
                tracing::error!(error = %self, "upstream forward failed");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, status.canonical_reason().unwrap_or("Upstream Error")).into_response()
    }
}

// 1. Upstream Contract
/// Upstream
///
/// Where passed-through requests go. The gateway only depends on this trait, so
/// tests swap the HTTP forwarder for an in-process responder.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Sends the request on and returns the response to hand back to the client.
    async fn forward(&self, request: Request) -> Result<Response, UpstreamError>;
}

pub type UpstreamState = Arc<dyn Upstream>;

// 2. The Real Implementation (HTTP reverse proxy)
/// ReqwestUpstream
///
/// Forwards requests to the portal frontend origin. Response bodies are streamed
/// back as they arrive. Redirects issued by the frontend are returned to the
/// browser untouched rather than followed here.
#[derive(Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestUpstream {
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Upstream for ReqwestUpstream {
    async fn forward(&self, request: Request) -> Result<Response, UpstreamError> {
        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|value| value.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);

        let body = body::to_bytes(body, MAX_FORWARD_BODY)
            .await
            .map_err(|_| UpstreamError::BodyTooLarge)?;

        let origin = parts
            .extensions
            .get::<ForwardedOrigin>()
            .cloned()
            .unwrap_or_else(|| ForwardedOrigin::from_headers(&parts.headers));

        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.remove("x-forwarded-host");
        if let Some(host) = origin.host {
            headers.insert("x-forwarded-host", host);
        }
        headers.insert("x-forwarded-proto", origin.scheme);

        tracing::trace!(method = %parts.method, %url, "forwarding to upstream");

        let upstream_response = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream_response.status();
        let mut response_headers = upstream_response.headers().clone();
        let content_length = response_headers.get(header::CONTENT_LENGTH).cloned();
        strip_hop_by_hop(&mut response_headers);
        if let Some(length) = content_length {
            response_headers.insert(header::CONTENT_LENGTH, length);
        }

        let mut response = Response::builder()
            .status(status)
            .body(Body::from_stream(upstream_response.bytes_stream()))
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;
        response.headers_mut().extend(response_headers);
        Ok(response)
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

// 3. The Mock Implementation (tests)
/// MockUpstream
///
/// Answers every forwarded request itself with `200 OK` and a body of
/// `"<METHOD> <path>"`, so tests can tell a pass-through from a redirect.
#[derive(Clone, Default)]
pub struct MockUpstream;

impl MockUpstream {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn forward(&self, request: Request) -> Result<Response, UpstreamError> {
        let body = format!("{} {}", request.method(), request.uri().path());
        Ok((StatusCode::OK, body).into_response())
    }
}
