//! Request dispatch: one handler per request kind.
//!
//! The registry maps each [`RequestKind`] onto a handler seam. Handlers
//! produce a [`Response`] unconditionally; refusal is expressed as a
//! failure response, never as a panic or a dropped request.

use std::collections::HashMap;

use tracing::debug;

use airlock_protocol::{Request, RequestKind, Response};

use crate::collaborators::Collaborators;
use crate::state::SafetyState;

pub mod handlers;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Mutable view a handler gets for the duration of one request.
pub struct HandlerContext<'a> {
    /// Gateway safety state and counters.
    pub state: &'a mut SafetyState,
    /// Host-facing collaborator seams.
    pub collaborators: &'a mut Collaborators,
    /// Wall-clock seconds stamped on the response.
    pub timestamp: u64,
    /// Clients currently occupying connection slots.
    pub active_clients: usize,
}

/// One request kind's behaviour.
pub trait RequestHandler {
    /// Services a gated request. Must not panic; failures become
    /// failure responses.
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response;
}

/// Kind-keyed handler table.
pub struct HandlerRegistry {
    handlers: HashMap<RequestKind, Box<dyn RequestHandler>>,
}

impl HandlerRegistry {
    /// Empty registry; behaviour tests build it up piecemeal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Production registry with every kind wired to its host handler.
    #[must_use]
    pub fn with_host_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(RequestKind::SendCommand, handlers::SendCommand);
        registry.register(RequestKind::GetTelemetry, handlers::GetTelemetry);
        registry.register(RequestKind::GetSystemStatus, handlers::GetSystemStatus);
        registry.register(RequestKind::ManageComponent, handlers::ManageComponent);
        registry.register(RequestKind::ListFiles, handlers::ListFiles);
        registry.register(RequestKind::ReadFile, handlers::ReadFile);
        registry.register(RequestKind::WriteFile, handlers::WriteFile);
        registry.register(RequestKind::GetEventLog, handlers::GetEventLog);
        registry.register(RequestKind::EmergencyStop, handlers::EmergencyStop);
        registry
    }

    /// Binds a handler to a kind, replacing any previous binding.
    pub fn register(&mut self, kind: RequestKind, handler: impl RequestHandler + 'static) {
        self.handlers.insert(kind, Box::new(handler));
    }

    /// Routes one gated request to its handler.
    pub fn dispatch(
        &self,
        kind: RequestKind,
        request: &Request,
        ctx: &mut HandlerContext<'_>,
    ) -> Response {
        debug!(target: DISPATCH_TARGET, id = request.id, %kind, "dispatching request");
        match self.handlers.get(&kind) {
            Some(handler) => handler.handle(request, ctx),
            None => Response::failure(
                request.id,
                ctx.timestamp,
                format!("no handler registered for {kind}"),
            ),
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_host_handlers()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
