//! Access Router
//!
//! Decides, for one inbound request, whether it may reach the portal frontend or
//! must be redirected. The decision is a pure function of the request's host,
//! scheme, path, query and session cookies, so it can run on any number of
//! requests in parallel without coordination.
//!
//! Evaluation order:
//! 1. canonical base domain (production only),
//! 2. subdomain label → portal, unknown labels sent to `/login`,
//! 3. public routes bounce signed-in users to their dashboard,
//! 4. protected routes send anonymous users to `/login?callbackUrl=...`,
//! 5. signed-in users outside their home portal go to their own dashboard,
//! 6. protected routes admit only the portals and roles listed in [`ROUTE_TABLE`].
//!
//! Steps 5 and 6 read the same table, so portal and role never disagree about
//! where a user belongs.

use axum::http::uri::Authority;

use crate::{
    auth::Session,
    config::{AppConfig, LOOPBACK_HOST},
    models::{PortalType, RedirectReason, Role, RouteClass},
};

/// One row of the route table: every path under `prefix` belongs to `class`
/// and, once authenticated, is open only to the listed portals and roles.
#[derive(Debug)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub class: RouteClass,
    pub portals: &'static [PortalType],
    pub roles: &'static [Role],
}

pub const ROUTE_TABLE: &[RouteRule] = &[
    RouteRule {
        prefix: "/login",
        class: RouteClass::Public,
        portals: &[PortalType::Admin, PortalType::Dealer, PortalType::Customer],
        roles: &[],
    },
    RouteRule {
        prefix: "/super-admin",
        class: RouteClass::ProtectedAdmin,
        portals: &[PortalType::Admin],
        roles: &[Role::SuperAdmin, Role::Admin],
    },
    RouteRule {
        prefix: "/dealer",
        class: RouteClass::ProtectedDealer,
        portals: &[PortalType::Dealer],
        roles: &[Role::Dealer],
    },
    RouteRule {
        prefix: "/customer",
        class: RouteClass::ProtectedCustomer,
        portals: &[PortalType::Customer],
        roles: &[Role::Customer],
    },
    RouteRule {
        prefix: "/dashboard",
        class: RouteClass::ProtectedDashboard,
        portals: &[PortalType::Admin, PortalType::Dealer],
        roles: &[Role::SuperAdmin, Role::Admin, Role::Dealer],
    },
];

/// Framework assets and API calls that never go through the access checks.
pub const BYPASS_PREFIXES: &[&str] = &["/_next", "/api", "/favicon.ico"];

impl RouteRule {
    /// First row whose prefix covers `path`.
    pub fn lookup(path: &str) -> Option<&'static RouteRule> {
        ROUTE_TABLE
            .iter()
            .find(|rule| matches_prefix(path, rule.prefix))
    }

    pub fn admits(&self, portal: PortalType, role: Role) -> bool {
        self.portals.contains(&portal) && self.roles.contains(&role)
    }
}

impl RouteClass {
    pub fn of(path: &str) -> Self {
        RouteRule::lookup(path).map_or(RouteClass::Other, |rule| rule.class)
    }
}

pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PREFIXES
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
}

// Segment-aware: "/dealer" covers "/dealer" and "/dealer/x", not "/dealers".
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Hostname and optional port taken from a `Host` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub hostname: String,
    pub port: Option<u16>,
}

impl HostInfo {
    /// Returns `None` for empty or malformed values.
    pub fn parse(raw: &str) -> Option<Self> {
        let authority: Authority = raw.trim().parse().ok()?;
        if authority.as_str().contains('@') {
            return None;
        }
        let hostname = authority.host().trim_end_matches('.').to_ascii_lowercase();
        if hostname.is_empty() {
            return None;
        }
        Some(Self {
            hostname,
            port: authority.port_u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

/// InboundRequest
///
/// The request facts the decision depends on. Built by the gateway middleware
/// from the HTTP request, or directly by the resolve endpoint and tests.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub host: Option<&'a str>,
    pub scheme: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub session: &'a Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Redirect {
        location: String,
        reason: RedirectReason,
    },
}

impl Decision {
    fn redirect(location: impl Into<String>, reason: RedirectReason) -> Self {
        Decision::Redirect {
            location: location.into(),
            reason,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Pass => None,
            Decision::Redirect { location, .. } => Some(location),
        }
    }

    pub fn reason(&self) -> Option<RedirectReason> {
        match self {
            Decision::Pass => None,
            Decision::Redirect { reason, .. } => Some(*reason),
        }
    }

    /// Canonical-host redirects are permanent; every access redirect is temporary.
    pub fn is_permanent(&self) -> bool {
        self.reason() == Some(RedirectReason::NonCanonicalHost)
    }
}

/// The portal and route class a request resolved to, and what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub portal: PortalType,
    pub route_class: RouteClass,
    pub decision: Decision,
}

// Where absolute redirects point: scheme, base domain, and the port in development.
struct Origin<'a> {
    scheme: &'a str,
    base: &'a str,
    port: Option<u16>,
}

impl Origin<'_> {
    fn url(&self, portal: PortalType, path_and_query: &str) -> String {
        let host = match portal.subdomain() {
            "" => self.base.to_string(),
            label => format!("{label}.{}", self.base),
        };
        let port = self.port.map(|port| format!(":{port}")).unwrap_or_default();
        format!("{}://{host}{port}{path_and_query}", self.scheme)
    }
}

/// AccessRouter
///
/// Immutable routing policy for one deployment: the production root domain and the
/// scheme used for absolute redirects when the request does not say.
#[derive(Debug, Clone)]
pub struct AccessRouter {
    root_domain: String,
    fallback_scheme: String,
}

impl AccessRouter {
    pub fn new(root_domain: impl Into<String>, fallback_scheme: impl Into<String>) -> Self {
        Self {
            root_domain: root_domain.into(),
            fallback_scheme: fallback_scheme.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.root_domain.clone(), config.public_scheme.clone())
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Scheme used for absolute redirects and forwarded headers: the request's own
    /// when it is `http` or `https`, otherwise the configured public scheme.
    pub fn scheme_for<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|scheme| matches!(*scheme, "http" | "https"))
            .unwrap_or(self.fallback_scheme.as_str())
    }

    /// Production unless the hostname carries the loopback token and is not
    /// under the production root domain.
    pub fn environment(&self, hostname: &str) -> Environment {
        if hostname.ends_with(self.root_domain.as_str()) || !hostname.contains(LOOPBACK_HOST) {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// route
    ///
    /// Resolves one request to its portal, route class and decision.
    /// Never fails: a missing or malformed host is the root domain (admin portal),
    /// an unknown role cookie is `Role::None`.
    pub fn route(&self, request: &InboundRequest<'_>) -> RouteOutcome {
        let rule = RouteRule::lookup(request.path);
        let route_class = rule.map_or(RouteClass::Other, |rule| rule.class);
        let scheme = self.scheme_for(request.scheme);
        let host = request.host.and_then(HostInfo::parse);

        let (origin, label) = match &host {
            Some(host) => {
                let environment = self.environment(&host.hostname);
                let base = match environment {
                    Environment::Production => self.root_domain.as_str(),
                    Environment::Development => LOOPBACK_HOST,
                };
                let origin = Origin {
                    scheme,
                    base,
                    port: match environment {
                        Environment::Production => None,
                        Environment::Development => host.port,
                    },
                };

                if environment == Environment::Production && !is_within(&host.hostname, base) {
                    let target =
                        origin.url(PortalType::Admin, &with_query(request.path, request.query));
                    return RouteOutcome {
                        portal: PortalType::Admin,
                        route_class,
                        decision: Decision::redirect(target, RedirectReason::NonCanonicalHost),
                    };
                }

                (origin, subdomain_label(&host.hostname, base))
            }
            None => (
                Origin {
                    scheme,
                    base: self.root_domain.as_str(),
                    port: None,
                },
                "",
            ),
        };

        let Some(portal) = PortalType::from_subdomain(label) else {
            return RouteOutcome {
                portal: PortalType::Admin,
                route_class,
                decision: Decision::redirect(
                    origin.url(PortalType::Admin, "/login"),
                    RedirectReason::UnknownSubdomain,
                ),
            };
        };

        RouteOutcome {
            portal,
            route_class,
            decision: gate(request, portal, rule, &origin),
        }
    }
}

// Authentication and portal/role checks once the portal is known.
fn gate(
    request: &InboundRequest<'_>,
    portal: PortalType,
    rule: Option<&RouteRule>,
    origin: &Origin<'_>,
) -> Decision {
    let session = request.session;
    let class = rule.map_or(RouteClass::Other, |rule| rule.class);

    if !session.is_authenticated() {
        if class.is_protected() {
            return Decision::redirect(
                login_with_callback(request.path),
                RedirectReason::LoginRequired,
            );
        }
        return Decision::Pass;
    }

    let role = session.role;
    if class == RouteClass::Public {
        return dashboard_redirect(
            role,
            portal,
            origin,
            request.path,
            RedirectReason::AlreadyAuthenticated,
        );
    }

    if role.home_portal().is_some_and(|home| home != portal) {
        return dashboard_redirect(
            role,
            portal,
            origin,
            request.path,
            RedirectReason::WrongPortal,
        );
    }

    match rule {
        Some(rule) if rule.class.is_protected() && !rule.admits(portal, role) => {
            dashboard_redirect(role, portal, origin, request.path, RedirectReason::RoleMismatch)
        }
        _ => Decision::Pass,
    }
}

// Sends the user to their dashboard, on their home portal's host when that differs.
// Already being on the dashboard is a pass, never a self-redirect.
fn dashboard_redirect(
    role: Role,
    portal: PortalType,
    origin: &Origin<'_>,
    current_path: &str,
    reason: RedirectReason,
) -> Decision {
    let target = role.default_dashboard();
    match role.home_portal() {
        Some(home) if home != portal => Decision::redirect(origin.url(home, target), reason),
        _ if target == current_path => Decision::Pass,
        _ => Decision::redirect(target, reason),
    }
}

fn login_with_callback(path: &str) -> String {
    match serde_urlencoded::to_string([("callbackUrl", path)]) {
        Ok(query) => format!("/login?{query}"),
        Err(_) => "/login".to_string(),
    }
}

fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

fn is_within(hostname: &str, base: &str) -> bool {
    hostname
        .strip_suffix(base)
        .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
}

fn subdomain_label<'h>(hostname: &'h str, base: &str) -> &'h str {
    hostname
        .strip_suffix(base)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .unwrap_or("")
}
