//! Shared configuration for the airlock gateway daemon and client.
//!
//! Both binaries need to agree on the socket endpoint, logging setup,
//! and the operational limits of the connection loop, so all of it
//! lives here. Values are resolved from command-line flags and
//! environment variables by the binaries; this crate supplies the
//! types, the parsing, and the computed defaults.

mod defaults;
mod limits;
mod logging;
mod socket;

pub use defaults::{DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT, default_socket_endpoint};
pub use limits::Limits;
pub use logging::LogFormat;
pub use socket::{EndpointParseError, SocketEndpoint, SocketSetupError};

use serde::{Deserialize, Serialize};

/// Resolved gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Endpoint the daemon listens on and the client connects to.
    pub socket: SocketEndpoint,
    /// Tracing filter expression, e.g. `info` or `airlockd=debug`.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Operational limits of the connection loop.
    #[serde(default)]
    pub limits: Limits,
    /// Start in permissive mode (critical requests skip confirmation).
    #[serde(default)]
    pub permissive: bool,
    /// Log every outbound response frame.
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket_endpoint(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::default(),
            limits: Limits::default(),
            permissive: false,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_safe_mode() {
        let config = Config::default();
        assert!(!config.permissive);
        assert!(!config.debug);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }
}
