//! Computed defaults shared by the binaries.

use crate::socket::SocketEndpoint;

/// Default TCP port used where Unix domain sockets are unavailable.
pub const DEFAULT_TCP_PORT: u16 = 9021;

/// Default tracing filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned copy of the default log filter, for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Computes the default socket endpoint for the gateway.
///
/// On Unix this is `airlock/airlockd.sock` under the user runtime
/// directory (falling back to a uid-namespaced temp directory);
/// elsewhere it is TCP loopback on [`DEFAULT_TCP_PORT`].
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    default_endpoint_inner()
}

#[cfg(unix)]
fn default_endpoint_inner() -> SocketEndpoint {
    use camino::Utf8PathBuf;

    let base = dirs::runtime_dir()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .unwrap_or_else(|| {
            let uid = unsafe { libc::geteuid() };
            let tmp = Utf8PathBuf::from_path_buf(std::env::temp_dir())
                .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"));
            tmp.join(format!("uid-{uid}"))
        });
    SocketEndpoint::unix(base.join("airlock").join("airlockd.sock"))
}

#[cfg(not(unix))]
fn default_endpoint_inner() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}
