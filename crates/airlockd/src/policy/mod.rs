//! Safety gate: classification and admission of validated requests.
//!
//! Sits between the validator and the dispatch table. Every decision
//! is derived from the static tables in [`tables`] plus the mutable
//! [`SafetyState`], so the gate itself stays a pure ordering of
//! checks.

use std::time::{Duration, Instant};

use thiserror::Error;

use airlock_protocol::{Request, RequestKind};

use crate::state::{SafetyMode, SafetyState};

pub mod tables;

/// Outcome of gating one validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Proceed to dispatch. `critical` is carried for audit severity.
    Allowed {
        /// Whether the request was classified high-impact.
        critical: bool,
    },
    /// Refuse with the given reason; the request never reaches a
    /// handler.
    Blocked(BlockReason),
}

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockReason {
    /// Critical request in safe mode without the confirmation flag.
    #[error("command blocked by safety system: requires confirmation")]
    ConfirmationRequired,
    /// Second critical request inside the cooldown window.
    #[error("critical request rate limit exceeded")]
    RateLimited,
    /// File operation naming a protected system directory.
    #[error("system directory access denied")]
    ProtectedPath,
}

/// Whether the request is high-impact.
///
/// A request is critical when the caller says so, when its operation
/// or payload contains a destructive verb, when it writes a file, or
/// when it is a lifecycle action against a component (any start/stop,
/// or anything at all against a critical subsystem).
#[must_use]
pub fn classify(request: &Request, kind: RequestKind) -> bool {
    if request.is_critical || kind == RequestKind::WriteFile {
        return true;
    }
    if tables::contains_critical_verb(&request.command)
        || tables::contains_critical_verb(&request.params)
    {
        return true;
    }
    if kind == RequestKind::ManageComponent {
        let action = request.params.trim().trim_matches('"');
        if action.eq_ignore_ascii_case("start") || action.eq_ignore_ascii_case("stop") {
            return true;
        }
        if tables::is_critical_subsystem(&request.app_name) {
            return true;
        }
    }
    false
}

/// Runs the gate checks in order and updates rate-limit state on
/// admission of a critical request.
///
/// Emergency stop is never gated: the one request that makes the
/// system safer must not be refusable by the mechanism it controls.
pub fn evaluate(
    state: &mut SafetyState,
    request: &Request,
    kind: RequestKind,
    now: Instant,
    cooldown: Duration,
) -> GateDecision {
    if kind == RequestKind::EmergencyStop {
        return GateDecision::Allowed { critical: true };
    }

    if matches!(kind, RequestKind::ReadFile | RequestKind::WriteFile)
        && tables::mentions_protected_path(&request.params)
    {
        return GateDecision::Blocked(BlockReason::ProtectedPath);
    }

    if !classify(request, kind) {
        return GateDecision::Allowed { critical: false };
    }

    if state.mode() == SafetyMode::Safe && !request.require_confirmation {
        return GateDecision::Blocked(BlockReason::ConfirmationRequired);
    }

    if state.within_cooldown(now, cooldown) {
        return GateDecision::Blocked(BlockReason::RateLimited);
    }

    state.record_critical(now);
    GateDecision::Allowed { critical: true }
}
