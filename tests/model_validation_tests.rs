use warranty_gateway::models::{
    PortalType, RedirectReason, ResolveAction, Role, RouteClass, RouteDecisionResponse,
};

#[test]
fn test_role_cookie_values() {
    assert_eq!(Role::from_cookie(Some("super_admin")), Role::SuperAdmin);
    assert_eq!(Role::from_cookie(Some("admin")), Role::Admin);
    assert_eq!(Role::from_cookie(Some(" dealer ")), Role::Dealer);
    assert_eq!(Role::from_cookie(Some("customer")), Role::Customer);
    assert_eq!(Role::from_cookie(Some("Admin")), Role::None);
    assert_eq!(Role::from_cookie(None), Role::None);
}

#[test]
fn test_role_dashboards_and_home_portals() {
    assert_eq!(Role::SuperAdmin.default_dashboard(), "/super-admin/dashboard");
    assert_eq!(Role::Admin.default_dashboard(), "/super-admin/dashboard");
    assert_eq!(Role::Dealer.default_dashboard(), "/dealer/dashboard");
    assert_eq!(Role::Customer.default_dashboard(), "/customer/dashboard");
    assert_eq!(Role::None.default_dashboard(), "/login");

    assert_eq!(Role::Admin.home_portal(), Some(PortalType::Admin));
    assert_eq!(Role::Dealer.home_portal(), Some(PortalType::Dealer));
    assert_eq!(Role::None.home_portal(), None);
}

#[test]
fn test_portal_subdomain_allow_list() {
    assert_eq!(PortalType::from_subdomain(""), Some(PortalType::Admin));
    assert_eq!(PortalType::from_subdomain("dealer"), Some(PortalType::Dealer));
    assert_eq!(PortalType::from_subdomain("customer"), Some(PortalType::Customer));
    assert_eq!(PortalType::from_subdomain("www"), None);
    assert_eq!(PortalType::Customer.subdomain(), "customer");
}

#[test]
fn test_wire_names() {
    assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
    assert_eq!(
        serde_json::to_string(&RouteClass::ProtectedDashboard).unwrap(),
        "\"protected-dashboard\""
    );
    assert_eq!(
        serde_json::to_string(&RedirectReason::LoginRequired).unwrap(),
        "\"login_required\""
    );
}

#[test]
fn test_pass_decision_omits_redirect_fields() {
    let response = RouteDecisionResponse {
        portal: PortalType::Dealer,
        route_class: RouteClass::ProtectedDealer,
        action: ResolveAction::Pass,
        location: None,
        reason: None,
    };

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "portal": "dealer",
            "route_class": "protected-dealer",
            "action": "pass",
        })
    );
}
