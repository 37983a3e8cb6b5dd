use warranty_gateway::{
    access::{AccessRouter, Decision, HostInfo, InboundRequest, RouteOutcome, is_bypassed},
    auth::Session,
    models::{PortalType, RedirectReason, RouteClass},
};

const ROOT: &str = "warrantyhub.io";

// --- Test Utilities ---

fn router() -> AccessRouter {
    AccessRouter::new(ROOT, "https")
}

fn route_with(
    host: Option<&str>,
    scheme: Option<&str>,
    path: &str,
    query: Option<&str>,
    token: bool,
    role: Option<&str>,
) -> RouteOutcome {
    let session = Session::new(token.then_some("token-value"), role);
    router().route(&InboundRequest {
        host,
        scheme,
        path,
        query,
        session: &session,
    })
}

fn route(host: &str, path: &str, role: Option<&str>) -> RouteOutcome {
    route_with(Some(host), None, path, None, role.is_some(), role)
}

fn assert_redirect(outcome: &RouteOutcome, location: &str, reason: RedirectReason) {
    assert_eq!(
        outcome.decision,
        Decision::Redirect {
            location: location.to_string(),
            reason,
        },
        "unexpected decision for {outcome:?}"
    );
}

// --- Domain Canonicalization ---

#[test]
fn test_foreign_host_redirects_to_canonical_domain_with_query() {
    let outcome = route_with(
        Some("www.example.com"),
        None,
        "/super-admin/dealers",
        Some("page=2"),
        false,
        None,
    );

    assert_redirect(
        &outcome,
        "https://warrantyhub.io/super-admin/dealers?page=2",
        RedirectReason::NonCanonicalHost,
    );
    assert!(outcome.decision.is_permanent());
}

#[test]
fn test_lookalike_domain_is_not_treated_as_subdomain() {
    let outcome = route("evilwarrantyhub.io", "/login", None);
    assert_redirect(
        &outcome,
        "https://warrantyhub.io/login",
        RedirectReason::NonCanonicalHost,
    );
}

#[test]
fn test_bare_ip_is_production_and_drops_port() {
    let outcome = route("127.0.0.1:3000", "/dashboard", None);
    assert_redirect(
        &outcome,
        "https://warrantyhub.io/dashboard",
        RedirectReason::NonCanonicalHost,
    );
}

#[test]
fn test_missing_or_malformed_host_resolves_to_admin_portal() {
    for host in [None, Some(""), Some("bad host"), Some("user@warrantyhub.io")] {
        let outcome = route_with(host, None, "/", None, false, None);
        assert_eq!(outcome.portal, PortalType::Admin, "host {host:?}");
        assert_eq!(outcome.decision, Decision::Pass, "host {host:?}");
    }
}

#[test]
fn test_missing_host_still_gates_protected_routes() {
    let outcome = route_with(None, None, "/dealer/dashboard", None, false, None);
    assert_redirect(
        &outcome,
        "/login?callbackUrl=%2Fdealer%2Fdashboard",
        RedirectReason::LoginRequired,
    );
}

// --- Subdomains and Portals ---

#[test]
fn test_unknown_subdomain_redirects_to_base_login() {
    let outcome = route("foo.warrantyhub.io", "/anything", None);
    assert_redirect(
        &outcome,
        "https://warrantyhub.io/login",
        RedirectReason::UnknownSubdomain,
    );
    assert_eq!(outcome.portal, PortalType::Admin);
}

#[test]
fn test_nested_subdomain_is_not_allowed() {
    let outcome = route("a.dealer.warrantyhub.io", "/dealer/dashboard", Some("dealer"));
    assert_eq!(outcome.decision.reason(), Some(RedirectReason::UnknownSubdomain));
}

#[test]
fn test_unknown_subdomain_in_development_keeps_port() {
    let outcome = route_with(
        Some("foo.localhost:3000"),
        Some("http"),
        "/",
        None,
        false,
        None,
    );
    assert_redirect(
        &outcome,
        "http://localhost:3000/login",
        RedirectReason::UnknownSubdomain,
    );
}

#[test]
fn test_portal_resolution_by_label() {
    assert_eq!(route("warrantyhub.io", "/", None).portal, PortalType::Admin);
    assert_eq!(route("dealer.warrantyhub.io", "/", None).portal, PortalType::Dealer);
    assert_eq!(route("customer.warrantyhub.io", "/", None).portal, PortalType::Customer);
    assert_eq!(route("Dealer.WarrantyHub.io.", "/", None).portal, PortalType::Dealer);
    assert_eq!(route("customer.localhost:3000", "/", None).portal, PortalType::Customer);
    assert_eq!(route("localhost:3000", "/", None).portal, PortalType::Admin);
}

// --- Authentication Gates ---

#[test]
fn test_unauthenticated_protected_route_redirects_to_login_with_callback() {
    let outcome = route("warrantyhub.io", "/super-admin/dashboard", None);
    assert_redirect(
        &outcome,
        "/login?callbackUrl=%2Fsuper-admin%2Fdashboard",
        RedirectReason::LoginRequired,
    );
    assert!(!outcome.decision.is_permanent());
}

#[test]
fn test_unauthenticated_public_and_other_routes_pass() {
    for path in ["/login", "/login/reset", "/", "/dealers", "/about"] {
        assert_eq!(
            route("warrantyhub.io", path, None).decision,
            Decision::Pass,
            "path {path}"
        );
    }
}

#[test]
fn test_empty_access_token_counts_as_unauthenticated() {
    let session = Session::new(Some(""), Some("admin"));
    let outcome = router().route(&InboundRequest {
        host: Some("warrantyhub.io"),
        scheme: None,
        path: "/super-admin/dashboard",
        query: None,
        session: &session,
    });
    assert_eq!(outcome.decision.reason(), Some(RedirectReason::LoginRequired));
}

#[test]
fn test_authenticated_login_visit_goes_to_role_dashboard() {
    let outcome = route("dealer.warrantyhub.io", "/login", Some("dealer"));
    assert_redirect(
        &outcome,
        "/dealer/dashboard",
        RedirectReason::AlreadyAuthenticated,
    );

    let outcome = route("warrantyhub.io", "/login", Some("super_admin"));
    assert_redirect(
        &outcome,
        "/super-admin/dashboard",
        RedirectReason::AlreadyAuthenticated,
    );
}

#[test]
fn test_login_without_known_role_does_not_loop() {
    let outcome = route("warrantyhub.io", "/login", Some("auditor"));
    assert_eq!(outcome.decision, Decision::Pass);
}

// --- Portal and Role Enforcement ---

#[test]
fn test_admin_on_root_domain_passes_admin_routes() {
    let outcome = route("warrantyhub.io", "/super-admin/dealers/list", Some("admin"));
    assert_eq!(outcome.decision, Decision::Pass);
    assert_eq!(outcome.portal, PortalType::Admin);
    assert_eq!(outcome.route_class, RouteClass::ProtectedAdmin);

    let outcome = route("warrantyhub.io", "/super-admin/dashboard", Some("super_admin"));
    assert_eq!(outcome.decision, Decision::Pass);
}

#[test]
fn test_non_dealer_roles_on_dealer_portal_go_home() {
    let cases = [
        ("admin", "https://warrantyhub.io/super-admin/dashboard"),
        ("super_admin", "https://warrantyhub.io/super-admin/dashboard"),
        ("customer", "https://customer.warrantyhub.io/customer/dashboard"),
    ];

    for (role, expected) in cases {
        for path in ["/", "/dealer/dashboard", "/dealer/warranties", "/dashboard", "/reports"] {
            let outcome = route("dealer.warrantyhub.io", path, Some(role));
            assert_redirect(&outcome, expected, RedirectReason::WrongPortal);
        }
    }
}

#[test]
fn test_dealer_on_dealer_portal_passes_own_routes() {
    for path in ["/dealer/dashboard", "/dealer/customers/42", "/dashboard", "/"] {
        let outcome = route("dealer.warrantyhub.io", path, Some("dealer"));
        assert_eq!(outcome.decision, Decision::Pass, "path {path}");
    }
}

#[test]
fn test_dealer_portal_blocks_other_portal_routes() {
    for path in ["/super-admin/dashboard", "/customer/invoices"] {
        let outcome = route("dealer.warrantyhub.io", path, Some("dealer"));
        assert_redirect(&outcome, "/dealer/dashboard", RedirectReason::RoleMismatch);
    }
}

#[test]
fn test_customer_portal_blocks_dashboard_prefix() {
    let outcome = route("customer.warrantyhub.io", "/dashboard", Some("customer"));
    assert_redirect(&outcome, "/customer/dashboard", RedirectReason::RoleMismatch);
}

#[test]
fn test_dealer_on_root_domain_is_sent_to_dealer_portal() {
    let outcome = route("warrantyhub.io", "/dealer/dashboard", Some("dealer"));
    assert_redirect(
        &outcome,
        "https://dealer.warrantyhub.io/dealer/dashboard",
        RedirectReason::WrongPortal,
    );
}

#[test]
fn test_development_cross_portal_redirect_keeps_port() {
    let outcome = route_with(
        Some("localhost:3000"),
        Some("http"),
        "/dealer/dashboard",
        None,
        true,
        Some("customer"),
    );
    assert_redirect(
        &outcome,
        "http://customer.localhost:3000/customer/dashboard",
        RedirectReason::WrongPortal,
    );
    assert!(
        outcome
            .decision
            .location()
            .is_some_and(|location| location.ends_with("/customer/dashboard"))
    );
}

#[test]
fn test_unknown_role_with_token_is_sent_to_login() {
    let outcome = route("warrantyhub.io", "/super-admin/settings", Some("manager"));
    assert_redirect(&outcome, "/login", RedirectReason::RoleMismatch);
}

#[test]
fn test_routing_is_deterministic() {
    let first = route("dealer.warrantyhub.io", "/super-admin/x", Some("customer"));
    let second = route("dealer.warrantyhub.io", "/super-admin/x", Some("customer"));
    assert_eq!(first, second);
}

// --- Route Table and Host Parsing ---

#[test]
fn test_route_class_prefix_matching_is_segment_aware() {
    assert_eq!(RouteClass::of("/login"), RouteClass::Public);
    assert_eq!(RouteClass::of("/login/reset"), RouteClass::Public);
    assert_eq!(RouteClass::of("/super-admin/dealers/list"), RouteClass::ProtectedAdmin);
    assert_eq!(RouteClass::of("/dealer"), RouteClass::ProtectedDealer);
    assert_eq!(RouteClass::of("/customer/x"), RouteClass::ProtectedCustomer);
    assert_eq!(RouteClass::of("/dashboard"), RouteClass::ProtectedDashboard);
    assert_eq!(RouteClass::of("/dealers"), RouteClass::Other);
    assert_eq!(RouteClass::of("/loginx"), RouteClass::Other);
    assert_eq!(RouteClass::of("/"), RouteClass::Other);
}

#[test]
fn test_bypass_prefixes() {
    assert!(is_bypassed("/_next/static/chunks/main.js"));
    assert!(is_bypassed("/api/warranties"));
    assert!(is_bypassed("/favicon.ico"));
    assert!(!is_bypassed("/apiary"));
    assert!(!is_bypassed("/dealer/dashboard"));
}

#[test]
fn test_host_info_parse() {
    assert_eq!(
        HostInfo::parse("localhost:3000"),
        Some(HostInfo {
            hostname: "localhost".to_string(),
            port: Some(3000),
        })
    );
    assert_eq!(
        HostInfo::parse(" Dealer.WarrantyHub.io "),
        Some(HostInfo {
            hostname: "dealer.warrantyhub.io".to_string(),
            port: None,
        })
    );
    assert_eq!(HostInfo::parse(""), None);
    assert_eq!(HostInfo::parse("has space.io"), None);
    assert_eq!(HostInfo::parse("user@warrantyhub.io"), None);
}
