//! Process-wide safety state and operational counters.
//!
//! The aggregate is owned exclusively by the connection loop and
//! passed by mutable reference into the pipeline, which keeps it
//! unit-testable in isolation from transport I/O. An implementation
//! that services connections from parallel threads must serialise all
//! mutations here behind one exclusive critical section: the counters
//! and the rate-limit timestamp are read-then-written non-atomically.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use strum::Display;

/// Operating mode of the safety gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SafetyMode {
    /// Critical requests require explicit confirmation.
    #[default]
    Safe,
    /// Confirmation is not required.
    Permissive,
}

/// Monotonic operational counters, reset only by an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Requests that reached a dispatch handler.
    pub requests: u64,
    /// Responses reporting success.
    pub successes: u64,
    /// Responses reporting failure, including pre-dispatch rejections.
    pub errors: u64,
}

impl Counters {
    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Mutable gateway state with process lifetime.
#[derive(Debug)]
pub struct SafetyState {
    mode: SafetyMode,
    debug_mode: bool,
    critical_request_count: u64,
    last_critical: Option<Instant>,
    counters: Counters,
    started: Instant,
}

impl SafetyState {
    /// Builds the initial state for the given mode and debug flag.
    #[must_use]
    pub fn new(mode: SafetyMode, debug_mode: bool) -> Self {
        Self {
            mode,
            debug_mode,
            critical_request_count: 0,
            last_critical: None,
            counters: Counters::default(),
            started: Instant::now(),
        }
    }

    /// Current operating mode.
    #[must_use]
    pub const fn mode(&self) -> SafetyMode {
        self.mode
    }

    /// Whether outbound frames are logged.
    #[must_use]
    pub const fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Enables or disables response-frame logging.
    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.debug_mode = enabled;
    }

    /// Forces safe mode; used by the emergency-stop handler.
    pub fn engage_safe_mode(&mut self) {
        self.mode = SafetyMode::Safe;
    }

    /// Accepted critical requests since startup.
    #[must_use]
    pub const fn critical_request_count(&self) -> u64 {
        self.critical_request_count
    }

    /// Whether `now` falls inside the cooldown window opened by the
    /// last accepted critical request.
    #[must_use]
    pub fn within_cooldown(&self, now: Instant, cooldown: Duration) -> bool {
        self.last_critical
            .is_some_and(|last| now.saturating_duration_since(last) < cooldown)
    }

    /// Records an accepted critical request at `now`.
    pub fn record_critical(&mut self, now: Instant) {
        self.critical_request_count += 1;
        self.last_critical = Some(now);
    }

    /// Mutable access to the operational counters.
    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    /// Read access to the operational counters.
    #[must_use]
    pub const fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Read-only snapshot for heartbeat reporting and telemetry.
    #[must_use]
    pub fn snapshot(&self, active_clients: usize) -> StateSnapshot {
        StateSnapshot {
            mode: self.mode,
            debug_mode: self.debug_mode,
            active_clients,
            request_counter: self.counters.requests,
            success_counter: self.counters.successes,
            error_counter: self.counters.errors,
            critical_request_count: self.critical_request_count,
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

impl Default for SafetyState {
    fn default() -> Self {
        Self::new(SafetyMode::Safe, false)
    }
}

/// Point-in-time view of counters and mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    /// Operating mode at snapshot time.
    pub mode: SafetyMode,
    /// Debug flag at snapshot time.
    pub debug_mode: bool,
    /// Occupied connection slots.
    pub active_clients: usize,
    /// Requests that reached a handler.
    pub request_counter: u64,
    /// Successful responses.
    pub success_counter: u64,
    /// Failed responses.
    pub error_counter: u64,
    /// Accepted critical requests.
    pub critical_request_count: u64,
    /// Seconds since gateway start.
    pub uptime_secs: u64,
}

/// Current wall-clock time in unix seconds, for response timestamps.
#[must_use]
pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_safe_mode_with_zero_counters() {
        let state = SafetyState::default();
        assert_eq!(state.mode(), SafetyMode::Safe);
        assert_eq!(state.critical_request_count(), 0);
        assert_eq!(*state.counters(), Counters::default());
    }

    #[test]
    fn cooldown_window_tracks_last_critical() {
        let mut state = SafetyState::default();
        let now = Instant::now();
        assert!(!state.within_cooldown(now, Duration::from_secs(5)));

        state.record_critical(now);
        assert!(state.within_cooldown(now, Duration::from_secs(5)));
        assert!(!state.within_cooldown(now + Duration::from_secs(6), Duration::from_secs(5)));
        assert_eq!(state.critical_request_count(), 1);
    }

    #[test]
    fn reset_clears_counters_but_not_critical_history() {
        let mut state = SafetyState::default();
        state.counters_mut().requests = 4;
        state.counters_mut().errors = 2;
        state.record_critical(Instant::now());

        state.counters_mut().reset();
        assert_eq!(*state.counters(), Counters::default());
        assert_eq!(state.critical_request_count(), 1);
    }

    #[test]
    fn engage_safe_mode_overrides_permissive() {
        let mut state = SafetyState::new(SafetyMode::Permissive, false);
        state.engage_safe_mode();
        assert_eq!(state.mode(), SafetyMode::Safe);
    }
}
