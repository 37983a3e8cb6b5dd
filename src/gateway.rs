use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    access::{Decision, InboundRequest, is_bypassed},
    auth::Session,
    upstream::ForwardedOrigin,
};

/// Response headers added to every request the access router lets through.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("x-xss-protection", "1; mode=block"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self' 'unsafe-inline' 'unsafe-eval'; \
         style-src 'self' 'unsafe-inline'; img-src 'self' data: blob:; font-src 'self' data:",
    ),
];

pub fn apply_security_headers(headers: &mut HeaderMap) {
    for &(name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

/// access_middleware
///
/// Runs the access router in front of the portal routes.
///
/// *Mechanism*: builds the (host, path, cookies) facts from the request, asks the
/// `AccessRouter` for a decision, and either answers with a redirect or runs the
/// rest of the stack and stamps the security headers on its response. Framework
/// assets under the bypass prefixes go straight through. Anything that is
/// forwarded carries the resolved host and scheme as a `ForwardedOrigin`.
pub async fn access_middleware(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let trust_forwarded = state.config.trust_forwarded_headers;
    let host = request_host(&request, trust_forwarded).map(str::to_string);
    let scheme = state
        .access
        .scheme_for(request_scheme(&request, trust_forwarded))
        .to_string();
    let origin = ForwardedOrigin::new(host.as_deref(), &scheme);

    if is_bypassed(request.uri().path()) {
        request.extensions_mut().insert(origin);
        return next.run(request).await;
    }

    let outcome = state.access.route(&InboundRequest {
        host: host.as_deref(),
        scheme: Some(&scheme),
        path: request.uri().path(),
        query: request.uri().query(),
        session: &session,
    });

    let permanent = outcome.decision.is_permanent();
    match outcome.decision {
        Decision::Pass => {
            request.extensions_mut().insert(origin);
            let mut response = next.run(request).await;
            apply_security_headers(response.headers_mut());
            response
        }
        Decision::Redirect { location, reason } => {
            tracing::debug!(
                portal = ?outcome.portal,
                route_class = ?outcome.route_class,
                role = ?session.role,
                ?reason,
                %location,
                "access redirect"
            );
            redirect_response(&location, permanent)
        }
    }
}

fn redirect_response(location: &str, permanent: bool) -> Response {
    let status = if permanent {
        StatusCode::PERMANENT_REDIRECT
    } else {
        StatusCode::TEMPORARY_REDIRECT
    };

    match HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(%location, "unencodable redirect target, falling back to /login");
            (
                StatusCode::TEMPORARY_REDIRECT,
                [(header::LOCATION, HeaderValue::from_static("/login"))],
            )
                .into_response()
        }
    }
}

fn header_str<'r>(request: &'r Request, name: &str) -> Option<&'r str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

// X-Forwarded-* may list several hops; the first is the client-facing one.
fn first_hop(value: &str) -> &str {
    value.split(',').next().unwrap_or(value).trim()
}

fn request_host(request: &Request, trust_forwarded: bool) -> Option<&str> {
    let forwarded = if trust_forwarded {
        header_str(request, "x-forwarded-host").map(first_hop)
    } else {
        None
    };

    forwarded
        .or_else(|| header_str(request, header::HOST.as_str()))
        .or_else(|| request.uri().authority().map(|authority| authority.as_str()))
}

fn request_scheme(request: &Request, trust_forwarded: bool) -> Option<&str> {
    let forwarded = if trust_forwarded {
        header_str(request, "x-forwarded-proto").map(first_hop)
    } else {
        None
    };

    forwarded.or_else(|| request.uri().scheme_str())
}
