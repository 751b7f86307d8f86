//! Gateway bootstrap orchestration.
//!
//! Ordering matters: telemetry first so later failures are logged,
//! then socket preparation, then the bind. The returned [`Gateway`]
//! is fully wired and only needs [`Gateway::run`].

use std::sync::Arc;

use thiserror::Error;

use airlock_config::{Config, SocketSetupError};

use crate::collaborators::Collaborators;
use crate::dispatch::HandlerRegistry;
use crate::gateway::Gateway;
use crate::health::HealthReporter;
use crate::pipeline::Pipeline;
use crate::state::{SafetyMode, SafetyState};
use crate::telemetry::{self, TelemetryError};
use crate::transport::{GatewayListener, ListenerError};

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket directory preparation failed.
    #[error("failed to prepare gateway socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket path.
        #[source]
        source: SocketSetupError,
    },
    /// The listener could not be bound.
    #[error("failed to bind gateway listener: {source}")]
    Listener {
        /// Underlying bind error.
        #[source]
        source: ListenerError,
    },
}

/// Bootstraps a gateway from resolved configuration.
///
/// # Errors
///
/// Returns [`BootstrapError`] when telemetry, socket preparation, or
/// the bind fails; the failure is also reported through `reporter`.
pub fn bootstrap(
    config: &Config,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Gateway, BootstrapError> {
    reporter.bootstrap_starting();

    if let Err(source) = telemetry::initialise(config) {
        let error = BootstrapError::Telemetry { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    if let Err(source) = config.socket.prepare_filesystem() {
        let error = BootstrapError::Socket { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    let listener = match GatewayListener::bind(&config.socket) {
        Ok(listener) => listener,
        Err(source) => {
            let error = BootstrapError::Listener { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let mode = if config.permissive {
        SafetyMode::Permissive
    } else {
        SafetyMode::Safe
    };
    let pipeline = Pipeline::new(
        SafetyState::new(mode, config.debug),
        HandlerRegistry::with_host_handlers(),
        Collaborators::host_defaults(),
        config.limits.cooldown(),
    );

    reporter.bootstrap_succeeded(config);

    Ok(Gateway::new(
        listener,
        pipeline,
        Box::new(reporter),
        config.limits.max_clients,
        config.limits.tick_interval(),
        config.limits.heartbeat_interval(),
    ))
}
