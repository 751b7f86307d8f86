//! The per-frame processing pipeline.
//!
//! One inbound frame flows decode, validate, gate, dispatch, encode.
//! Every failure along the way is request-local: the pipeline always
//! yields exactly one response frame and leaves the gateway ready for
//! the next request.

use std::time::{Duration, Instant};

use tracing::debug;

use airlock_protocol::{Request, RequestKind, Response, codec};

use crate::collaborators::{AuditSeverity, Collaborators};
use crate::dispatch::{HandlerContext, HandlerRegistry};
use crate::policy::{self, GateDecision};
use crate::state::{SafetyState, unix_timestamp};
use crate::validate;

const PIPELINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pipeline");

/// Owns the state and collaborator seams one gateway runs against.
#[derive(Debug)]
pub struct Pipeline {
    state: SafetyState,
    registry: HandlerRegistry,
    collaborators: Collaborators,
    cooldown: Duration,
}

impl Pipeline {
    /// Assembles a pipeline from its parts.
    #[must_use]
    pub fn new(
        state: SafetyState,
        registry: HandlerRegistry,
        collaborators: Collaborators,
        cooldown: Duration,
    ) -> Self {
        Self {
            state,
            registry,
            collaborators,
            cooldown,
        }
    }

    /// Read access to the safety state, for heartbeat reporting.
    #[must_use]
    pub fn state(&self) -> &SafetyState {
        &self.state
    }

    /// Processes one raw frame into encoded response bytes.
    pub fn process_frame(&mut self, frame: &[u8], now: Instant, active_clients: usize) -> Vec<u8> {
        let response = self.process(frame, now, active_clients);
        let bytes = codec::encode_response(&response);
        if self.state.debug_mode()
            && let Ok(text) = std::str::from_utf8(&bytes)
        {
            debug!(target: PIPELINE_TARGET, frame = text, "outbound frame");
        }
        bytes
    }

    /// Processes one raw frame into a response.
    pub fn process(&mut self, frame: &[u8], now: Instant, active_clients: usize) -> Response {
        let timestamp = unix_timestamp();

        let request = match codec::decode_request(frame) {
            Ok(request) => request,
            Err(error) => {
                self.state.counters_mut().errors += 1;
                debug!(target: PIPELINE_TARGET, %error, "frame rejected at decode");
                return Response::failure(0, timestamp, "invalid request format");
            }
        };

        let kind = match validate::validate(&request) {
            Ok(kind) => kind,
            Err(reason) => {
                self.state.counters_mut().errors += 1;
                debug!(target: PIPELINE_TARGET, id = request.id, %reason, "request rejected");
                return Response::failure(request.id, timestamp, reason.to_string());
            }
        };

        match policy::evaluate(&mut self.state, &request, kind, now, self.cooldown) {
            GateDecision::Blocked(reason) => {
                self.state.counters_mut().errors += 1;
                self.collaborators.audit.record(
                    AuditSeverity::Error,
                    &format!("request {} blocked: {reason}", request.id),
                );
                Response::failure(request.id, timestamp, reason.to_string())
            }
            GateDecision::Allowed { critical } => {
                self.admit(&request, kind, critical, timestamp, active_clients)
            }
        }
    }

    fn admit(
        &mut self,
        request: &Request,
        kind: RequestKind,
        critical: bool,
        timestamp: u64,
        active_clients: usize,
    ) -> Response {
        if critical {
            self.collaborators.audit.record(
                AuditSeverity::Info,
                &format!("critical {kind} admitted for {}", request.app_name),
            );
        }

        self.state.counters_mut().requests += 1;
        let mut ctx = HandlerContext {
            state: &mut self.state,
            collaborators: &mut self.collaborators,
            timestamp,
            active_clients,
        };
        let response = self.registry.dispatch(kind, request, &mut ctx);

        if response.is_success() {
            self.state.counters_mut().successes += 1;
        } else {
            self.state.counters_mut().errors += 1;
        }
        response
    }
}
