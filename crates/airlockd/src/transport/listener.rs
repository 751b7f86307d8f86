//! Non-blocking listener polled by the gateway loop.
//!
//! Unlike a threaded accept loop, the gateway calls [`GatewayListener::
//! accept_one`] once per tick and services existing connections in
//! between. The listener only owns binding, polling, and socket-file
//! hygiene.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

use tracing::{info, warn};

use airlock_config::SocketEndpoint;

use super::{ClientStream, ListenerError, TRANSPORT_TARGET};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::Path;

/// Bound, non-blocking gateway listener.
#[derive(Debug)]
pub struct GatewayListener {
    endpoint: SocketEndpoint,
    listener: ListenerKind,
}

#[derive(Debug)]
enum ListenerKind {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl GatewayListener {
    /// Binds to the endpoint and switches to non-blocking mode.
    ///
    /// A stale unix socket file left by a crashed daemon is removed
    /// after a connect probe confirms nothing is serving it.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when binding or configuration fails.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let listener = match endpoint {
            SocketEndpoint::Tcp { host, port } => ListenerKind::Tcp(bind_tcp(host, *port)?),
            SocketEndpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    ListenerKind::Unix(bind_unix(path.as_std_path())?)
                }
                #[cfg(not(unix))]
                {
                    return Err(ListenerError::UnsupportedUnix {
                        endpoint: endpoint.to_string(),
                    });
                }
            }
        };

        let bound = Self {
            endpoint: endpoint.clone(),
            listener,
        };
        bound
            .set_nonblocking()
            .map_err(|source| ListenerError::NonBlocking { source })?;
        info!(target: TRANSPORT_TARGET, endpoint = %bound.endpoint, "gateway listener bound");
        Ok(bound)
    }

    fn set_nonblocking(&self) -> io::Result<()> {
        match &self.listener {
            ListenerKind::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            ListenerKind::Unix(listener) => listener.set_nonblocking(true),
        }
    }

    /// Local TCP address, when bound over TCP.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.listener {
            ListenerKind::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            ListenerKind::Unix(_) => None,
        }
    }

    /// Accepts at most one pending connection.
    ///
    /// The accepted stream stays non-blocking; the gateway loop polls
    /// it alongside every other slot.
    ///
    /// # Errors
    ///
    /// Propagates accept errors other than `WouldBlock`, which maps
    /// to `Ok(None)`.
    pub fn accept_one(&self) -> io::Result<Option<ClientStream>> {
        let accepted = match &self.listener {
            ListenerKind::Tcp(listener) => match listener.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(true)?;
                    Some(ClientStream::Tcp(stream))
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => None,
                Err(error) => return Err(error),
            },
            #[cfg(unix)]
            ListenerKind::Unix(listener) => match listener.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(true)?;
                    Some(ClientStream::Unix(stream))
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => None,
                Err(error) => return Err(error),
            },
        };
        Ok(accepted)
    }
}

impl Drop for GatewayListener {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let SocketEndpoint::Unix { path } = &self.endpoint
            && let Err(error) = fs::remove_file(path.as_std_path())
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: TRANSPORT_TARGET,
                error = %error,
                path = %path,
                "failed to remove unix socket file"
            );
        }
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
fn bind_unix(path: &Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        let metadata =
            fs::symlink_metadata(path).map_err(|source| ListenerError::UnixMetadata {
                path: path.display().to_string(),
                source,
            })?;
        if !metadata.file_type().is_socket() {
            return Err(ListenerError::UnixNotSocket {
                path: path.display().to_string(),
            });
        }
        match UnixStream::connect(path) {
            Ok(_stream) => {
                return Err(ListenerError::UnixInUse {
                    path: path.display().to_string(),
                });
            }
            Err(error)
                if error.kind() == io::ErrorKind::ConnectionRefused
                    || error.kind() == io::ErrorKind::NotFound =>
            {
                fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
                    path: path.display().to_string(),
                    source,
                })?;
            }
            Err(error) => {
                return Err(ListenerError::UnixConnect {
                    path: path.display().to_string(),
                    source: error,
                });
            }
        }
    }

    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::net::TcpStream;

    use super::*;

    #[test]
    fn tcp_accept_is_nonblocking() {
        let endpoint = SocketEndpoint::tcp("127.0.0.1", 0);
        let listener = GatewayListener::bind(&endpoint).expect("bind");
        assert!(listener.accept_one().expect("poll").is_none());

        let addr = listener.local_addr().expect("local addr");
        let _client = TcpStream::connect(addr).expect("connect");
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        loop {
            if let Some(stream) = listener.accept_one().expect("poll") {
                assert!(stream.peer().starts_with("127.0.0.1"));
                break;
            }
            assert!(std::time::Instant::now() < deadline, "accept timed out");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }

    #[cfg(unix)]
    #[test]
    fn stale_unix_socket_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("airlockd.sock");
        {
            let _stale = UnixListener::bind(&path).expect("bind stale");
        }
        assert!(path.exists());

        let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8").to_owned());
        let listener = GatewayListener::bind(&endpoint).expect("rebind over stale socket");
        UnixStream::connect(&path).expect("connect");
        drop(listener);
        assert!(!path.exists(), "socket file removed on drop");
    }

    #[cfg(unix)]
    #[test]
    fn live_unix_socket_is_not_stolen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("airlockd.sock");
        let _existing = UnixListener::bind(&path).expect("bind existing");

        let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8").to_owned());
        let error = GatewayListener::bind(&endpoint).expect_err("must refuse");
        assert!(matches!(error, ListenerError::UnixInUse { .. }));
    }
}
