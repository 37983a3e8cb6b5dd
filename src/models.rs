use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Routing Vocabulary (shared with the portal frontend) ---

/// PortalType
///
/// The tenant-facing surface a request targets, derived from the subdomain label.
/// The bare base domain is the admin portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PortalType {
    Admin,
    Dealer,
    Customer,
}

impl PortalType {
    /// Maps a subdomain label to its portal. An empty label is the root domain.
    /// Returns `None` for any label outside the allow-list.
    pub fn from_subdomain(label: &str) -> Option<Self> {
        match label {
            "" => Some(PortalType::Admin),
            "dealer" => Some(PortalType::Dealer),
            "customer" => Some(PortalType::Customer),
            _ => None,
        }
    }

    /// The subdomain label that hosts this portal (empty for the root domain).
    pub fn subdomain(self) -> &'static str {
        match self {
            PortalType::Admin => "",
            PortalType::Dealer => "dealer",
            PortalType::Customer => "customer",
        }
    }
}

/// Role
///
/// The permission class carried by the `userRole` cookie. Any value outside the
/// known set is treated as `None`, the most restrictive interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    SuperAdmin,
    Admin,
    Dealer,
    Customer,
    #[default]
    None,
}

impl Role {
    pub fn from_cookie(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("super_admin") => Role::SuperAdmin,
            Some("admin") => Role::Admin,
            Some("dealer") => Role::Dealer,
            Some("customer") => Role::Customer,
            _ => Role::None,
        }
    }

    /// Landing page for an authenticated user of this role.
    pub fn default_dashboard(self) -> &'static str {
        match self {
            Role::SuperAdmin | Role::Admin => "/super-admin/dashboard",
            Role::Dealer => "/dealer/dashboard",
            Role::Customer => "/customer/dashboard",
            Role::None => "/login",
        }
    }

    /// The portal this role's dashboard lives on. `None` has no home portal.
    pub fn home_portal(self) -> Option<PortalType> {
        match self {
            Role::SuperAdmin | Role::Admin => Some(PortalType::Admin),
            Role::Dealer => Some(PortalType::Dealer),
            Role::Customer => Some(PortalType::Customer),
            Role::None => None,
        }
    }
}

/// RouteClass
///
/// Coarse category of a request path, resolved from the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum RouteClass {
    Public,
    ProtectedAdmin,
    ProtectedDealer,
    ProtectedCustomer,
    ProtectedDashboard,
    Other,
}

impl RouteClass {
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            RouteClass::ProtectedAdmin
                | RouteClass::ProtectedDealer
                | RouteClass::ProtectedCustomer
                | RouteClass::ProtectedDashboard
        )
    }
}

/// RedirectReason
///
/// Why the access router turned a request away. Logged with every redirect and
/// reported by the resolve endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RedirectReason {
    /// Host is outside the production base domain.
    NonCanonicalHost,
    /// Subdomain label is not `dealer` or `customer`.
    UnknownSubdomain,
    /// Signed-in user opened a public page such as `/login`.
    AlreadyAuthenticated,
    /// Protected page requested without an access token.
    LoginRequired,
    /// Role belongs to a different portal than the one requested.
    WrongPortal,
    /// Route is not open to this role on this portal.
    RoleMismatch,
}

// --- Diagnostics Schemas ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ResolveAction {
    Pass,
    Redirect,
}

/// RouteDecisionResponse
///
/// Body of `GET /_gateway/resolve`: how the access router would treat a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteDecisionResponse {
    pub portal: PortalType,
    pub route_class: RouteClass,
    pub action: ResolveAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub reason: Option<RedirectReason>,
}
