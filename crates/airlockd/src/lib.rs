//! The airlock gateway daemon.
//!
//! `airlockd` accepts a bounded set of local client connections and
//! runs every inbound frame through a fixed pipeline: decode →
//! validate → safety gate → dispatch → encode. The safety gate is the
//! heart of the daemon: it classifies requests as critical by verb,
//! target, or caller flag, demands explicit confirmation for critical
//! requests in safe mode, rate-limits accepted criticals, and
//! unconditionally blocks file access under protected system paths.
//!
//! The loop is single-threaded and cooperative. All transport
//! operations are non-blocking; the only suspension point is the
//! bounded wait at the top of each tick, which doubles as the host
//! heartbeat. Every failure is contained to the request or connection
//! that caused it — there are no fatal error classes inside the loop.
//!
//! Handlers reach the outside world only through the collaborator
//! seams in [`collaborators`]: subsystem command routing, telemetry,
//! system info, the filesystem, and the audit log.

mod bootstrap;
pub mod collaborators;
mod dispatch;
mod gateway;
mod health;
mod pipeline;
mod policy;
mod state;
mod telemetry;
mod transport;
mod validate;

pub use bootstrap::{BootstrapError, bootstrap};
pub use gateway::Gateway;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use state::{Counters, SafetyMode, SafetyState, StateSnapshot};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

/// Target name under which the gateway reports its own telemetry.
pub const GATEWAY_TARGET: &str = "AIRLOCK";

#[cfg(test)]
mod tests;
