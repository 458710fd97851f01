//! Prometheus metrics exposition
//!
//! Counters covering the auth flow:
//!
//! - `auth_logins_started_total` (counter)
//! - `auth_logins_completed_total` (counter)
//! - `auth_login_failures_total` (counter): label `stage`
//! - `auth_logouts_total` (counter): label `kind` (`local` / `sso`)

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// The handle's `render()` method produces the Prometheus text exposition
/// format served on `/metrics`.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Record a login attempt reaching the provider redirect.
pub fn record_login_started() {
    metrics::counter!("auth_logins_started_total").increment(1);
}

/// Record a callback that established a session.
pub fn record_login_completed() {
    metrics::counter!("auth_logins_completed_total").increment(1);
}

/// Record a failed callback or login initiation, labeled by the stage that
/// failed (invalid_state, token_exchange, claims_fetch, ...).
pub fn record_login_failure(stage: &str) {
    metrics::counter!("auth_login_failures_total", "stage" => stage.to_string()).increment(1);
}

/// Record a logout, labeled local or sso.
pub fn record_logout(kind: &str) {
    metrics::counter!("auth_logouts_total", "kind" => kind.to_string()).increment(1);
}
