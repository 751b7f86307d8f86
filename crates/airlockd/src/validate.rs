//! Structural and semantic validation of decoded requests.
//!
//! A pure function over the request: no state, no I/O. Checks run in a
//! fixed order and short-circuit on the first failure. Oversized
//! fields are rejected, never truncated — a silently shortened file
//! path would read the wrong file.

use thiserror::Error;

use airlock_protocol::{
    MAX_OPERATION_BYTES, MAX_PAYLOAD_BYTES, MAX_TARGET_BYTES, Request, RequestKind,
};

/// Constraint classes a request can violate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Correlation id zero is reserved.
    #[error("invalid request parameters: id must be non-zero")]
    ZeroId,
    /// The wire kind code falls outside the closed set.
    #[error("invalid request parameters: unknown request type {0}")]
    UnknownKind(u8),
    /// The kind requires a target subsystem and none was given.
    #[error("invalid request parameters: {kind} requires a target")]
    MissingTarget {
        /// Kind that demanded the target.
        kind: RequestKind,
    },
    /// A string field exceeded its length bound.
    #[error("invalid request parameters: {field} exceeds {max} bytes")]
    Oversized {
        /// Wire name of the offending field.
        field: &'static str,
        /// Permitted maximum.
        max: usize,
    },
    /// Send-command requests must name an operation.
    #[error("invalid request parameters: send_command requires an operation name")]
    MissingOperation,
}

/// Validates a decoded request, yielding its typed kind on success.
///
/// # Errors
///
/// Returns the first violated constraint in check order: id, kind,
/// target, operation, payload.
pub fn validate(request: &Request) -> Result<RequestKind, RejectReason> {
    if request.id == 0 {
        return Err(RejectReason::ZeroId);
    }

    let kind = request
        .kind()
        .map_err(|error| RejectReason::UnknownKind(error.0))?;

    if kind.requires_target() {
        if request.app_name.is_empty() {
            return Err(RejectReason::MissingTarget { kind });
        }
        if request.app_name.len() > MAX_TARGET_BYTES {
            return Err(RejectReason::Oversized {
                field: "app_name",
                max: MAX_TARGET_BYTES,
            });
        }
    }

    if kind == RequestKind::SendCommand {
        if request.command.is_empty() {
            return Err(RejectReason::MissingOperation);
        }
        if request.command.len() > MAX_OPERATION_BYTES {
            return Err(RejectReason::Oversized {
                field: "command",
                max: MAX_OPERATION_BYTES,
            });
        }
    }

    if request.params.len() > MAX_PAYLOAD_BYTES {
        return Err(RejectReason::Oversized {
            field: "params",
            max: MAX_PAYLOAD_BYTES,
        });
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_request() -> Request {
        Request::new(1, RequestKind::SendCommand)
            .with_target("CFE_ES")
            .with_operation("NOOP")
    }

    #[test]
    fn accepts_well_formed_request() {
        assert_eq!(validate(&noop_request()), Ok(RequestKind::SendCommand));
    }

    #[test]
    fn rejects_zero_id_first() {
        let mut request = noop_request();
        request.id = 0;
        request.kind_code = 99;
        assert_eq!(validate(&request), Err(RejectReason::ZeroId));
    }

    #[test]
    fn rejects_unknown_kind() {
        let mut request = noop_request();
        request.kind_code = 9;
        assert_eq!(validate(&request), Err(RejectReason::UnknownKind(9)));
    }

    #[test]
    fn rejects_missing_target_for_target_kinds() {
        for kind in [
            RequestKind::SendCommand,
            RequestKind::GetTelemetry,
            RequestKind::ManageComponent,
        ] {
            let request = Request::new(1, kind).with_operation("NOOP");
            assert_eq!(validate(&request), Err(RejectReason::MissingTarget { kind }));
        }
    }

    #[test]
    fn target_is_optional_for_file_kinds() {
        let request = Request::new(1, RequestKind::ListFiles);
        assert_eq!(validate(&request), Ok(RequestKind::ListFiles));
    }

    #[test]
    fn rejects_oversized_target_instead_of_truncating() {
        let request = noop_request().with_target("X".repeat(MAX_TARGET_BYTES + 1));
        assert_eq!(
            validate(&request),
            Err(RejectReason::Oversized {
                field: "app_name",
                max: MAX_TARGET_BYTES,
            })
        );
    }

    #[test]
    fn rejects_missing_operation_for_send_command() {
        let request = Request::new(1, RequestKind::SendCommand).with_target("CFE_ES");
        assert_eq!(validate(&request), Err(RejectReason::MissingOperation));
    }

    #[test]
    fn rejects_oversized_operation() {
        let request = noop_request().with_operation("Y".repeat(MAX_OPERATION_BYTES + 1));
        assert_eq!(
            validate(&request),
            Err(RejectReason::Oversized {
                field: "command",
                max: MAX_OPERATION_BYTES,
            })
        );
    }

    #[test]
    fn rejects_oversized_payload() {
        let request = Request::new(1, RequestKind::ListFiles)
            .with_payload("p".repeat(MAX_PAYLOAD_BYTES + 1));
        assert_eq!(
            validate(&request),
            Err(RejectReason::Oversized {
                field: "params",
                max: MAX_PAYLOAD_BYTES,
            })
        );
    }
}
