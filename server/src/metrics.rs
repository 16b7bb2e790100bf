//! Metrics for the pharmacy backend.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `pharmadesk_status_transitions_total{status}` - Applied status changes
//! - `pharmadesk_backups_total{outcome}` - Backup runs (exported, failed, unauthorized)
//! - `pharmadesk_emails_total{outcome}` - Emails (sent, failed, not_configured)
//! - `pharmadesk_uploads_total` - Stored uploads
//! - `pharmadesk_logins_total{outcome}` - Admin logins (success, rejected)

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Register metric descriptions.
///
/// Call once at start-up, before any metrics are recorded.
pub fn register_metrics() {
    describe_counter!(
        "pharmadesk_status_transitions_total",
        "Status changes applied to requests, by new status"
    );
    describe_counter!(
        "pharmadesk_backups_total",
        "Backup runs by outcome (exported, failed, unauthorized)"
    );
    describe_counter!(
        "pharmadesk_emails_total",
        "Emails by outcome (sent, failed, not_configured)"
    );
    describe_counter!("pharmadesk_uploads_total", "Files stored by the upload endpoint");
    describe_counter!(
        "pharmadesk_logins_total",
        "Admin login attempts by outcome (success, rejected)"
    );

    tracing::debug!("Metrics registered");
}

/// Install the Prometheus exporter with its own HTTP listener.
///
/// # Errors
///
/// [`BuildError`] if the recorder or listener cannot be installed.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
