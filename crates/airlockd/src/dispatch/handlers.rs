//! Host handlers, one per request kind.

use camino::Utf8Path;
use serde::Serialize;
use serde_json::json;

use airlock_protocol::{Request, Response};

use crate::GATEWAY_TARGET;
use crate::collaborators::{AuditSeverity, FileStoreError, files};
use crate::dispatch::{HandlerContext, RequestHandler};

/// Audit entries returned by an event-log query.
const REPORTED_EVENTS: usize = 10;

/// Extracts a string payload, accepting both a JSON-quoted string and
/// a bare one.
fn payload_string(raw: &str) -> String {
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim().to_owned())
}

fn success_with(id: u32, timestamp: u64, value: &impl Serialize) -> Response {
    match serde_json::to_value(value) {
        Ok(result) => Response::success(id, timestamp, result),
        Err(error) => Response::failure(id, timestamp, format!("failed to encode result: {error}")),
    }
}

/// Routes a named operation onto the command bus.
pub struct SendCommand;

impl RequestHandler for SendCommand {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        match ctx
            .collaborators
            .command_link
            .send(&request.app_name, &request.command)
        {
            Ok(routed) => success_with(
                request.id,
                ctx.timestamp,
                &json!({
                    "command_sent": true,
                    "app": request.app_name,
                    "command": request.command,
                    "msg_id": format!("0x{:04X}", routed.message_id),
                    "cmd_code": routed.command_code,
                }),
            ),
            Err(error) => Response::failure(request.id, ctx.timestamp, error.to_string()),
        }
    }
}

/// Answers telemetry queries; only the gateway's own telemetry is
/// served locally.
pub struct GetTelemetry;

impl RequestHandler for GetTelemetry {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        if request.app_name.eq_ignore_ascii_case(GATEWAY_TARGET) {
            let snapshot = ctx.state.snapshot(ctx.active_clients);
            success_with(
                request.id,
                ctx.timestamp,
                &json!({
                    "app_name": GATEWAY_TARGET,
                    "timestamp": ctx.timestamp,
                    "telemetry": snapshot,
                }),
            )
        } else {
            success_with(
                request.id,
                ctx.timestamp,
                &json!({
                    "app_name": request.app_name,
                    "timestamp": ctx.timestamp,
                    "status": "telemetry_not_available",
                    "message": format!("telemetry retrieval for {} not implemented", request.app_name),
                }),
            )
        }
    }
}

/// Reports overall gateway status.
pub struct GetSystemStatus;

impl RequestHandler for GetSystemStatus {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        let snapshot = ctx.state.snapshot(ctx.active_clients);
        success_with(
            request.id,
            ctx.timestamp,
            &json!({
                "system_status": {
                    "timestamp": ctx.timestamp,
                    "gateway_version": env!("CARGO_PKG_VERSION"),
                    "gateway": snapshot,
                }
            }),
        )
    }
}

/// Lifecycle queries and (acknowledged, unimplemented) start/stop.
pub struct ManageComponent;

impl RequestHandler for ManageComponent {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        let action = payload_string(&request.params);
        match action.to_ascii_lowercase().as_str() {
            "status" => {
                let info = ctx.collaborators.system.describe(&request.app_name);
                success_with(
                    request.id,
                    ctx.timestamp,
                    &json!({
                        "action": "status",
                        "app": request.app_name,
                        "info": info,
                    }),
                )
            }
            verb @ ("start" | "stop") => {
                ctx.collaborators.audit.record(
                    AuditSeverity::Info,
                    &format!("component {verb} requested for {}", request.app_name),
                );
                success_with(
                    request.id,
                    ctx.timestamp,
                    &json!({
                        "action": verb,
                        "app": request.app_name,
                        "status": "not_implemented",
                    }),
                )
            }
            _ => Response::failure(
                request.id,
                ctx.timestamp,
                format!("unknown action in params: {}", request.params),
            ),
        }
    }
}

/// Bounded directory listing.
pub struct ListFiles;

impl RequestHandler for ListFiles {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        let directory = if request.params.len() > 2 {
            payload_string(&request.params)
        } else {
            files::DEFAULT_DIRECTORY.to_owned()
        };

        match ctx.collaborators.files.list(Utf8Path::new(&directory)) {
            Ok(entries) => success_with(
                request.id,
                ctx.timestamp,
                &json!({
                    "directory": directory,
                    "files": entries,
                }),
            ),
            Err(FileStoreError::InvalidPath(message)) => {
                Response::failure(request.id, ctx.timestamp, message)
            }
            Err(FileStoreError::Io(_)) => Response::failure(
                request.id,
                ctx.timestamp,
                format!("failed to open directory: {directory}"),
            ),
        }
    }
}

/// Bounded file read.
pub struct ReadFile;

impl RequestHandler for ReadFile {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        if request.params.len() < 3 {
            return Response::failure(request.id, ctx.timestamp, "file path is required");
        }
        let path = payload_string(&request.params);

        match ctx.collaborators.files.read(Utf8Path::new(&path)) {
            Ok(content) => success_with(
                request.id,
                ctx.timestamp,
                &json!({
                    "file_path": path,
                    "size": content.len(),
                    "content": content,
                }),
            ),
            Err(FileStoreError::InvalidPath(message)) => {
                Response::failure(request.id, ctx.timestamp, message)
            }
            Err(FileStoreError::Io(_)) => Response::failure(
                request.id,
                ctx.timestamp,
                format!("failed to open file: {path}"),
            ),
        }
    }
}

/// Standing refusal: the gateway never writes host files.
pub struct WriteFile;

impl RequestHandler for WriteFile {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        ctx.collaborators
            .audit
            .record(AuditSeverity::Error, "file write blocked for safety");
        Response::failure(
            request.id,
            ctx.timestamp,
            "file write operation not implemented for safety reasons",
        )
    }
}

/// Serves the tail of the audit ring.
pub struct GetEventLog;

impl RequestHandler for GetEventLog {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        let events = ctx.collaborators.audit.recent(REPORTED_EVENTS);
        success_with(
            request.id,
            ctx.timestamp,
            &json!({
                "event_log": {
                    "timestamp": ctx.timestamp,
                    "recent_events": events,
                }
            }),
        )
    }
}

/// Forces safe mode and records the event at the highest severity.
pub struct EmergencyStop;

impl RequestHandler for EmergencyStop {
    fn handle(&self, request: &Request, ctx: &mut HandlerContext<'_>) -> Response {
        ctx.state.engage_safe_mode();
        ctx.collaborators.audit.record(
            AuditSeverity::Critical,
            "emergency stop requested via gateway",
        );
        success_with(
            request.id,
            ctx.timestamp,
            &json!({
                "emergency_stop": {
                    "timestamp": ctx.timestamp,
                    "status": "executed",
                    "actions": ["safe_mode_engaged", "event_logged"],
                    "message": "emergency stop procedure initiated",
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use airlock_protocol::RequestKind;

    use crate::collaborators::Collaborators;
    use crate::dispatch::HandlerRegistry;
    use crate::state::{SafetyMode, SafetyState};

    use super::*;

    fn dispatch(request: &Request) -> (Response, SafetyState) {
        let mut state = SafetyState::new(SafetyMode::Safe, false);
        let mut collaborators = Collaborators::host_defaults();
        let registry = HandlerRegistry::with_host_handlers();
        let kind = request.kind().unwrap();
        let mut ctx = HandlerContext {
            state: &mut state,
            collaborators: &mut collaborators,
            timestamp: 1_700_000_000,
            active_clients: 1,
        };
        let response = registry.dispatch(kind, request, &mut ctx);
        (response, state)
    }

    #[test]
    fn send_command_reports_routing_details() {
        let request = Request::new(1, RequestKind::SendCommand)
            .with_target("CFE_ES")
            .with_operation("NOOP");
        let (response, _) = dispatch(&request);
        let result = response.result().expect("result");
        assert_eq!(result["command_sent"], true);
        assert_eq!(result["msg_id"], "0x1806");
        assert_eq!(result["cmd_code"], 0);
    }

    #[test]
    fn send_command_to_unknown_target_fails() {
        let request = Request::new(2, RequestKind::SendCommand)
            .with_target("NOPE")
            .with_operation("NOOP");
        let (response, _) = dispatch(&request);
        assert_eq!(response.error(), Some("unknown target 'NOPE'"));
    }

    #[test]
    fn own_telemetry_reports_counters_and_mode() {
        let request = Request::new(3, RequestKind::GetTelemetry).with_target("AIRLOCK");
        let (response, _) = dispatch(&request);
        let result = response.result().expect("result");
        assert_eq!(result["app_name"], "AIRLOCK");
        assert_eq!(result["telemetry"]["mode"], "safe");
        assert_eq!(result["telemetry"]["request_counter"], 0);
    }

    #[test]
    fn foreign_telemetry_is_reported_unavailable() {
        let request = Request::new(4, RequestKind::GetTelemetry).with_target("TO_LAB");
        let (response, _) = dispatch(&request);
        let result = response.result().expect("result");
        assert_eq!(result["status"], "telemetry_not_available");
    }

    #[rstest]
    #[case("\"start\"", "start")]
    #[case("\"stop\"", "stop")]
    fn manage_lifecycle_acknowledges_without_acting(
        #[case] payload: &str,
        #[case] action: &str,
    ) {
        let request = Request::new(5, RequestKind::ManageComponent)
            .with_target("TO_LAB")
            .with_payload(payload);
        let (response, _) = dispatch(&request);
        let result = response.result().expect("result");
        assert_eq!(result["action"], action);
        assert_eq!(result["status"], "not_implemented");
    }

    #[test]
    fn manage_unknown_action_fails() {
        let request = Request::new(6, RequestKind::ManageComponent)
            .with_target("TO_LAB")
            .with_payload("\"restart-ish\"");
        let (response, _) = dispatch(&request);
        assert_eq!(
            response.error(),
            Some("unknown action in params: \"restart-ish\"")
        );
    }

    #[test]
    fn read_file_without_path_fails() {
        let request = Request::new(7, RequestKind::ReadFile);
        let (response, _) = dispatch(&request);
        assert_eq!(response.error(), Some("file path is required"));
    }

    #[test]
    fn write_file_is_always_refused() {
        let request = Request::new(8, RequestKind::WriteFile).confirmed();
        let (response, _) = dispatch(&request);
        assert_eq!(
            response.error(),
            Some("file write operation not implemented for safety reasons")
        );
    }

    #[test]
    fn emergency_stop_forces_safe_mode_from_permissive() {
        let mut state = SafetyState::new(SafetyMode::Permissive, false);
        let mut collaborators = Collaborators::host_defaults();
        let registry = HandlerRegistry::with_host_handlers();
        let request = Request::new(9, RequestKind::EmergencyStop);
        let mut ctx = HandlerContext {
            state: &mut state,
            collaborators: &mut collaborators,
            timestamp: 1_700_000_000,
            active_clients: 0,
        };
        let response = registry.dispatch(RequestKind::EmergencyStop, &request, &mut ctx);
        assert_eq!(state.mode(), SafetyMode::Safe);
        let result = response.result().expect("result");
        assert_eq!(result["emergency_stop"]["status"], "executed");
    }

    #[test]
    fn event_log_includes_recorded_events() {
        let mut state = SafetyState::new(SafetyMode::Safe, false);
        let mut collaborators = Collaborators::host_defaults();
        collaborators
            .audit
            .record(AuditSeverity::Info, "gateway started");
        let registry = HandlerRegistry::with_host_handlers();
        let request = Request::new(10, RequestKind::GetEventLog);
        let mut ctx = HandlerContext {
            state: &mut state,
            collaborators: &mut collaborators,
            timestamp: 1_700_000_000,
            active_clients: 0,
        };
        let response = registry.dispatch(RequestKind::GetEventLog, &request, &mut ctx);
        let result = response.result().expect("result");
        let events = result["event_log"]["recent_events"]
            .as_array()
            .expect("events array");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["message"], "gateway started");
    }

    #[test]
    fn payload_string_accepts_quoted_and_bare_forms() {
        assert_eq!(payload_string("\"/tmp/x\""), "/tmp/x");
        assert_eq!(payload_string("/tmp/x"), "/tmp/x");
    }
}
