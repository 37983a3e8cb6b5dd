/// Router Module Index
///
/// Splits the gateway's routes by whether the access router guards them.

/// Gateway-owned endpoints (health, diagnostics). Never access-checked.
pub mod internal;

/// Everything else: access-checked, then forwarded to the portal frontend.
pub mod portal;
