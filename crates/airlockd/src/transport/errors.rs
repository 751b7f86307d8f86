//! Error types for socket listener operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding the gateway listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The TCP host name did not resolve.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Host name that failed to resolve.
        host: String,
        /// Port the endpoint named.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no addresses.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Host name that resolved to nothing.
        host: String,
        /// Port the endpoint named.
        port: u16,
    },
    /// The TCP bind itself failed.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying bind error.
        #[source]
        source: io::Error,
    },
    /// The bound listener could not be switched to non-blocking mode.
    #[error("failed to switch listener to non-blocking mode: {source}")]
    NonBlocking {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Unix endpoints cannot be served on this platform.
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix {
        /// Endpoint that requested a unix socket.
        endpoint: String,
    },
    /// The unix bind itself failed.
    #[cfg(unix)]
    #[error("failed to bind unix listener at {path}: {source}")]
    BindUnix {
        /// Socket path the bind was attempted on.
        path: String,
        /// Underlying bind error.
        #[source]
        source: io::Error,
    },
    /// Another daemon is already serving the socket path.
    #[cfg(unix)]
    #[error("unix socket {path} already has a live listener")]
    UnixInUse {
        /// Socket path in use.
        path: String,
    },
    /// The socket path exists but is some other kind of file.
    #[cfg(unix)]
    #[error("refusing to replace non-socket file at {path}")]
    UnixNotSocket {
        /// Offending path.
        path: String,
    },
    /// The existing socket path could not be inspected.
    #[cfg(unix)]
    #[error("failed to inspect existing socket path {path}: {source}")]
    UnixMetadata {
        /// Path whose metadata was unreadable.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The liveness probe against an existing socket failed in a way
    /// that is neither refused nor gone.
    #[cfg(unix)]
    #[error("probe of existing unix socket {path} failed: {source}")]
    UnixConnect {
        /// Probed socket path.
        path: String,
        /// Underlying connect error.
        #[source]
        source: io::Error,
    },
    /// A confirmed-stale socket file could not be removed.
    #[cfg(unix)]
    #[error("failed to remove stale unix socket {path}: {source}")]
    UnixCleanup {
        /// Stale socket path.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}
