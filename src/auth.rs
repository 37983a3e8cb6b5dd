use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::models::Role;

/// Cookie holding the opaque bearer token issued by the backend at login.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie holding the signed-in user's role name.
pub const USER_ROLE_COOKIE: &str = "userRole";

/// Session
///
/// The authentication facts the gateway can see for one request. The token is
/// only checked for presence; validating it is the backend's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub role: Role,
}

impl Session {
    pub fn new(access_token: Option<&str>, role: Option<&str>) -> Self {
        Self {
            access_token: access_token
                .filter(|token| !token.is_empty())
                .map(str::to_string),
            role: Role::from_cookie(role),
        }
    }

    /// Anonymous session, used when no cookies are present.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Builds the session from every `Cookie` header on the request.
    /// Unreadable headers are skipped, which degrades to an anonymous session.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut access_token = None;
        let mut role = None;

        let pairs = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.split_once('='));

        for (name, value) in pairs {
            let value = value.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }
            match name.trim() {
                // First occurrence wins, as with browsers sending the most specific path first.
                ACCESS_TOKEN_COOKIE if access_token.is_none() => access_token = Some(value),
                USER_ROLE_COOKIE if role.is_none() => role = Some(value),
                _ => {}
            }
        }

        Session::new(access_token, role)
    }
}

/// Session Extractor Implementation
///
/// Lets the access middleware and handlers take `Session` as an argument.
/// Extraction never fails: missing or garbled cookies yield an anonymous session.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(&parts.headers))
    }
}
