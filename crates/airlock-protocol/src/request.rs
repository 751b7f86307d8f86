//! Request frame as decoded from client-supplied JSON.

use serde::{Deserialize, Serialize};

use crate::kind::{RequestKind, UnknownKindError};

/// One inbound operation.
///
/// `id` and `type` are required on the wire; every other field defaults
/// to its empty/false value when absent. Unknown extra fields are
/// ignored for forward compatibility. The raw kind code is kept as sent
/// so the validator can report out-of-range codes as a rejection rather
/// than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Request {
    /// Caller-supplied correlation token. Zero is reserved and invalid.
    pub id: u32,
    /// Wire code of the operation kind (0–8).
    #[serde(rename = "type")]
    pub kind_code: u8,
    /// Subsystem the operation addresses.
    #[serde(default)]
    pub app_name: String,
    /// Specific action for send-command requests.
    #[serde(default)]
    pub command: String,
    /// Kind-specific parameters: a JSON-quoted path, an action verb, ...
    #[serde(default)]
    pub params: String,
    /// Caller's assertion that this request was explicitly approved.
    #[serde(default)]
    pub require_confirmation: bool,
    /// Caller's assertion that this request is high-impact.
    #[serde(default)]
    pub is_critical: bool,
}

impl Request {
    /// Builds a request of the given kind with all optional fields empty.
    #[must_use]
    pub fn new(id: u32, kind: RequestKind) -> Self {
        Self {
            id,
            kind_code: kind.code(),
            app_name: String::new(),
            command: String::new(),
            params: String::new(),
            require_confirmation: false,
            is_critical: false,
        }
    }

    /// Maps the raw wire code into the closed kind set.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownKindError`] when the code is outside 0–8.
    pub fn kind(&self) -> Result<RequestKind, UnknownKindError> {
        RequestKind::try_from(self.kind_code)
    }

    /// Sets the target subsystem.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.app_name = target.into();
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.command = operation.into();
        self
    }

    /// Sets the opaque payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.params = payload.into();
        self
    }

    /// Marks the request as explicitly confirmed by the caller.
    #[must_use]
    pub fn confirmed(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Marks the request as high-impact.
    #[must_use]
    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }
}
