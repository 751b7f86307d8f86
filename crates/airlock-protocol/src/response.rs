//! Response frame returned to clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::MAX_ERROR_BYTES;

/// Status code for a successful response.
pub const STATUS_OK: i32 = 0;

/// Status code for a failed response.
pub const STATUS_ERROR: i32 = -1;

/// One outcome, correlated to a request by `id`.
///
/// Exactly one of `result` and `error` is populated; the constructors
/// are the only way to build a response, which keeps the invariant out
/// of reach of callers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Response {
    id: u32,
    status: i32,
    timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    /// Builds a successful response carrying a structured result.
    #[must_use]
    pub fn success(id: u32, timestamp: u64, result: Value) -> Self {
        Self {
            id,
            status: STATUS_OK,
            timestamp,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failed response carrying a human-readable cause.
    ///
    /// The message is capped at [`MAX_ERROR_BYTES`]; causes we generate
    /// ourselves stay well under the bound, the cap only guards against
    /// collaborator messages echoing unbounded input.
    #[must_use]
    pub fn failure(id: u32, timestamp: u64, error: impl Into<String>) -> Self {
        Self {
            id,
            status: STATUS_ERROR,
            timestamp,
            result: None,
            error: Some(cap_message(error.into())),
        }
    }

    /// Correlation token echoed from the originating request.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Outcome code: [`STATUS_OK`] or [`STATUS_ERROR`].
    #[must_use]
    pub const fn status(&self) -> i32 {
        self.status
    }

    /// Completion time in unix seconds.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Structured result, present iff the response succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Failure cause, present iff the response failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the response reports success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Truncates a message to [`MAX_ERROR_BYTES`] on a character boundary.
fn cap_message(message: String) -> String {
    if message.len() <= MAX_ERROR_BYTES {
        return message;
    }
    let mut end = MAX_ERROR_BYTES;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_populates_result_only() {
        let response = Response::success(3, 100, json!({"ok": true}));
        assert!(response.is_success());
        assert!(response.result().is_some());
        assert!(response.error().is_none());
    }

    #[test]
    fn failure_populates_error_only() {
        let response = Response::failure(3, 100, "boom");
        assert!(!response.is_success());
        assert_eq!(response.status(), STATUS_ERROR);
        assert!(response.result().is_none());
        assert_eq!(response.error(), Some("boom"));
    }

    #[test]
    fn oversized_error_message_is_capped() {
        let long = "x".repeat(MAX_ERROR_BYTES * 2);
        let response = Response::failure(1, 0, long);
        assert_eq!(response.error().map(str::len), Some(MAX_ERROR_BYTES));
    }

    #[test]
    fn cap_respects_char_boundaries() {
        let long = "é".repeat(MAX_ERROR_BYTES);
        let response = Response::failure(1, 0, long);
        let error = response.error().unwrap_or_default();
        assert!(error.len() <= MAX_ERROR_BYTES);
        assert!(error.chars().all(|c| c == 'é'));
    }
}
