//! Socket endpoint configuration shared by daemon and client.

use std::fmt;
use std::fs::DirBuilder;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Endpoint the gateway serves on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum SocketEndpoint {
    /// Unix domain socket.
    Unix {
        /// Filesystem path of the socket.
        path: Utf8PathBuf,
    },
    /// TCP socket, intended for loopback use only.
    Tcp {
        /// Host name or address to bind/connect.
        host: String,
        /// Port number.
        port: u16,
    },
}

impl SocketEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// The socket path when this is a Unix endpoint.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Creates the socket's parent directory with owner-only
    /// permissions. TCP endpoints need no filesystem preparation.
    ///
    /// # Errors
    ///
    /// Returns [`SocketSetupError`] when the path has no parent or the
    /// directory cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketSetupError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
            return Err(SocketSetupError::MissingParent {
                path: path.to_path_buf(),
            });
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        if let Err(source) = builder.create(parent.as_std_path())
            && source.kind() != std::io::ErrorKind::AlreadyExists
        {
            return Err(SocketSetupError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = EndpointParseError;

    /// Parses `unix:///path`, `tcp://host:port`, or a bare absolute
    /// path (treated as a Unix socket).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.starts_with('/') {
            return Ok(Self::unix(input));
        }
        let url = Url::parse(input)?;
        match url.scheme() {
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(EndpointParseError::MissingPath(input.to_string()));
                }
                Ok(Self::unix(path))
            }
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| EndpointParseError::MissingHost(input.to_string()))?;
                let port = url
                    .port()
                    .ok_or_else(|| EndpointParseError::MissingPort(input.to_string()))?;
                Ok(Self::tcp(host, port))
            }
            other => Err(EndpointParseError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Errors raised while parsing a [`SocketEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not `unix` or `tcp`.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host was absent.
    #[error("missing host in '{0}'")]
    MissingHost(String),
    /// TCP port was absent.
    #[error("missing port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing socket path in '{0}'")]
    MissingPath(String),
    /// Input was not a valid URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised while preparing the socket filesystem.
#[derive(Debug, Error)]
pub enum SocketSetupError {
    /// Socket path has no parent directory to create.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// Offending socket path.
        path: Utf8PathBuf,
    },
    /// Parent directory creation failed.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("unix:///tmp/airlockd.sock", SocketEndpoint::unix("/tmp/airlockd.sock"))]
    #[case("/run/airlock/airlockd.sock", SocketEndpoint::unix("/run/airlock/airlockd.sock"))]
    #[case("tcp://127.0.0.1:9021", SocketEndpoint::tcp("127.0.0.1", 9021))]
    fn parses_valid_endpoints(#[case] input: &str, #[case] expected: SocketEndpoint) {
        assert_eq!(input.parse::<SocketEndpoint>().expect("parses"), expected);
    }

    #[rstest]
    #[case::missing_port("tcp://127.0.0.1")]
    #[case::bad_scheme("http://127.0.0.1:80")]
    fn rejects_invalid_endpoints(#[case] input: &str) {
        assert!(input.parse::<SocketEndpoint>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let endpoint = SocketEndpoint::tcp("localhost", 9021);
        assert_eq!(
            endpoint.to_string().parse::<SocketEndpoint>().expect("parses"),
            endpoint
        );
    }

    #[test]
    fn prepares_unix_socket_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("airlockd.sock");
        let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path"));
        endpoint.prepare_filesystem().expect("prepare");
        assert!(path.parent().expect("parent").is_dir());
    }

    #[test]
    fn tcp_endpoint_needs_no_preparation() {
        assert!(SocketEndpoint::tcp("127.0.0.1", 0).prepare_filesystem().is_ok());
    }
}
