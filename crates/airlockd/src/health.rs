//! Structured health reporting for gateway lifecycle events.

use std::sync::Arc;

use airlock_config::Config;

use crate::bootstrap::BootstrapError;
use crate::state::StateSnapshot;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a client is seated in a slot.
    fn client_admitted(&self, slot: usize, peer: &str);

    /// Invoked when a client is refused because every slot is taken.
    fn client_rejected(&self, peer: &str);

    /// Invoked when a slot is freed.
    fn client_departed(&self, slot: usize);

    /// Invoked on each heartbeat with the current state snapshot.
    fn heartbeat(&self, snapshot: &StateSnapshot);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn client_admitted(&self, slot: usize, peer: &str) {
        (**self).client_admitted(slot, peer);
    }

    fn client_rejected(&self, peer: &str) {
        (**self).client_rejected(peer);
    }

    fn client_departed(&self, slot: usize) {
        (**self).client_departed(slot);
    }

    fn heartbeat(&self, snapshot: &StateSnapshot) {
        (**self).heartbeat(snapshot);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "airlockd::health",
            event = "bootstrap_starting",
            "starting gateway bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "airlockd::health",
            event = "bootstrap_succeeded",
            socket = %config.socket,
            log_filter = %config.log_filter,
            log_format = ?config.log_format,
            "gateway bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "airlockd::health",
            event = "bootstrap_failed",
            error = %error,
            "gateway bootstrap failed"
        );
    }

    fn client_admitted(&self, slot: usize, peer: &str) {
        tracing::info!(
            target: "airlockd::health",
            event = "client_admitted",
            slot,
            peer,
            "client connected"
        );
    }

    fn client_rejected(&self, peer: &str) {
        tracing::warn!(
            target: "airlockd::health",
            event = "client_rejected",
            peer,
            "connection refused: all slots occupied"
        );
    }

    fn client_departed(&self, slot: usize) {
        tracing::info!(
            target: "airlockd::health",
            event = "client_departed",
            slot,
            "client disconnected"
        );
    }

    fn heartbeat(&self, snapshot: &StateSnapshot) {
        tracing::debug!(
            target: "airlockd::health",
            event = "heartbeat",
            mode = %snapshot.mode,
            active_clients = snapshot.active_clients,
            requests = snapshot.request_counter,
            successes = snapshot.success_counter,
            errors = snapshot.error_counter,
            "gateway heartbeat"
        );
    }
}
