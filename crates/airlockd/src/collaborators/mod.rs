//! Host-facing collaborator seams.
//!
//! Handlers never touch the filesystem, the command bus, or the audit
//! trail directly. They go through the traits here, so behaviour
//! tests can substitute recording fakes and the dispatch layer stays
//! deterministic.

use camino::Utf8Path;
use serde::Serialize;
use thiserror::Error;

pub mod audit;
pub mod command_link;
pub mod files;
pub mod system;

pub use audit::TracingAudit;
pub use command_link::BusCommandLink;
pub use files::LocalFileStore;
pub use system::HostSystemInfo;

/// Severity of an audit entry, ordered from chatter to alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditSeverity {
    /// Routine operational notes.
    Info,
    /// Refused or failed requests.
    Error,
    /// Safety-relevant events that must never be missed.
    Critical,
}

/// One recorded audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// Monotonic sequence number, starting at 1.
    pub id: u64,
    /// Wall-clock seconds when the entry was recorded.
    pub timestamp: u64,
    /// Entry severity.
    pub severity: AuditSeverity,
    /// Free-form description.
    pub message: String,
}

/// Append-only trail of safety-relevant events.
pub trait AuditLog {
    /// Records one entry at the given severity.
    fn record(&mut self, severity: AuditSeverity, message: &str);

    /// Most recent entries, newest last, at most `limit`.
    fn recent(&self, limit: usize) -> Vec<AuditEvent>;
}

/// A command accepted by the bus link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutedCommand {
    /// Message identifier of the receiving subsystem.
    pub message_id: u16,
    /// Function code within that subsystem.
    pub command_code: u8,
}

/// Errors the command link can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandLinkError {
    /// The target subsystem has no bus entry at all.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
    /// The target exists but does not accept this operation.
    #[error("unknown command '{operation}' for target '{target}'")]
    Unroutable {
        /// Subsystem the request addressed.
        target: String,
        /// Operation that had no route.
        operation: String,
    },
}

/// Routes named operations onto the command bus.
pub trait CommandLink {
    /// Resolves and sends one command, returning how it was routed.
    ///
    /// # Errors
    ///
    /// Returns [`CommandLinkError::Unroutable`] when the pair has no
    /// table entry.
    fn send(&mut self, target: &str, operation: &str) -> Result<RoutedCommand, CommandLinkError>;
}

/// One directory entry as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Bare file name.
    pub name: String,
    /// Size in bytes as reported by the filesystem.
    pub size: u64,
    /// `"file"` or `"directory"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Errors surfaced by file operations.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// Path failed the store's admission rules.
    #[error("{0}")]
    InvalidPath(String),
    /// Underlying filesystem failure.
    #[error("file operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only view of the host filesystem.
pub trait FileStore {
    /// Lists a directory, bounded by the store's entry cap.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError`] when the path is refused or the
    /// directory cannot be read.
    fn list(&self, directory: &Utf8Path) -> Result<Vec<FileEntry>, FileStoreError>;

    /// Reads a file's leading bytes as UTF-8, bounded by the store's
    /// read cap.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError`] when the path is refused or the
    /// file cannot be read.
    fn read(&self, path: &Utf8Path) -> Result<String, FileStoreError>;
}

/// Describes host components for lifecycle queries.
pub trait SystemInfo {
    /// Status description of a named component.
    fn describe(&self, component: &str) -> serde_json::Value;
}

/// The full set of collaborators a gateway runs against.
pub struct Collaborators {
    /// Audit trail.
    pub audit: Box<dyn AuditLog>,
    /// Command bus link.
    pub command_link: Box<dyn CommandLink>,
    /// Filesystem view.
    pub files: Box<dyn FileStore>,
    /// Component status source.
    pub system: Box<dyn SystemInfo>,
}

impl Collaborators {
    /// Production wiring: tracing-backed audit, the static bus table,
    /// and the local filesystem.
    #[must_use]
    pub fn host_defaults() -> Self {
        Self {
            audit: Box::new(TracingAudit::default()),
            command_link: Box::new(BusCommandLink::default()),
            files: Box::new(LocalFileStore::default()),
            system: Box::new(HostSystemInfo),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
