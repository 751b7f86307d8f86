//! Tracing-backed audit trail with a bounded in-memory ring.

use std::collections::VecDeque;

use super::{AuditEvent, AuditLog, AuditSeverity};
use crate::state::unix_timestamp;

const AUDIT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::audit");

/// Entries retained for event-log queries. Older entries are dropped;
/// the structured log keeps the full history.
pub const AUDIT_RING_CAPACITY: usize = 64;

/// Default audit log: every entry goes to the structured log and into
/// a fixed-size ring served back by event-log requests.
#[derive(Debug, Default)]
pub struct TracingAudit {
    entries: VecDeque<AuditEvent>,
    next_id: u64,
}

impl AuditLog for TracingAudit {
    fn record(&mut self, severity: AuditSeverity, message: &str) {
        match severity {
            AuditSeverity::Info => tracing::info!(target: AUDIT_TARGET, "{message}"),
            AuditSeverity::Error => tracing::warn!(target: AUDIT_TARGET, "{message}"),
            AuditSeverity::Critical => tracing::error!(target: AUDIT_TARGET, "{message}"),
        }

        self.next_id += 1;
        if self.entries.len() == AUDIT_RING_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(AuditEvent {
            id: self.next_id,
            timestamp: unix_timestamp(),
            severity,
            message: message.to_owned(),
        });
    }

    fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }
}
