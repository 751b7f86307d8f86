//! `airlock` command-line client.
//!
//! Sends one request frame to a running `airlockd` and prints the
//! response. Exit status mirrors the response status: zero for
//! success, one for a gateway failure, two for transport problems.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use airlock_config::{SocketEndpoint, default_socket_endpoint};
use airlock_protocol::{
    CodecError, MAX_FRAME_BYTES, Request, RequestKind, Response, codec,
};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the airlock gateway daemon.
#[derive(Debug, Parser)]
#[command(name = "airlock", version, about)]
struct Cli {
    /// Gateway endpoint; defaults to the daemon's default socket.
    #[arg(long, env = "AIRLOCK_SOCKET")]
    socket: Option<SocketEndpoint>,

    /// Correlation id for the request.
    #[arg(long, default_value_t = 1)]
    id: u32,

    /// Assert explicit confirmation for a critical request.
    #[arg(long)]
    confirm: bool,

    /// Flag the request as high-impact.
    #[arg(long)]
    critical: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Route a named operation to a subsystem.
    SendCommand {
        /// Target subsystem, e.g. CFE_ES.
        target: String,
        /// Operation name, e.g. NOOP.
        operation: String,
    },
    /// Query a subsystem's telemetry.
    GetTelemetry {
        /// Target subsystem; AIRLOCK reports the gateway itself.
        target: String,
    },
    /// Query overall gateway status.
    GetSystemStatus,
    /// Query or drive a component's lifecycle.
    ManageComponent {
        /// Target component.
        target: String,
        /// Action: start, stop, or status.
        action: String,
    },
    /// List a directory on the gateway host.
    ListFiles {
        /// Directory path; the gateway default when omitted.
        path: Option<String>,
    },
    /// Read a file from the gateway host.
    ReadFile {
        /// Absolute file path.
        path: String,
    },
    /// Request a file write (refused by standing policy).
    WriteFile {
        /// Absolute file path.
        path: String,
    },
    /// Fetch recent gateway audit events.
    GetEventLog,
    /// Force the gateway into safe mode.
    EmergencyStop,
}

impl Command {
    fn into_request(self, id: u32) -> Request {
        match self {
            Self::SendCommand { target, operation } => Request::new(id, RequestKind::SendCommand)
                .with_target(target)
                .with_operation(operation),
            Self::GetTelemetry { target } => {
                Request::new(id, RequestKind::GetTelemetry).with_target(target)
            }
            Self::GetSystemStatus => Request::new(id, RequestKind::GetSystemStatus),
            Self::ManageComponent { target, action } => {
                Request::new(id, RequestKind::ManageComponent)
                    .with_target(target)
                    .with_payload(quote(&action))
            }
            Self::ListFiles { path } => {
                let request = Request::new(id, RequestKind::ListFiles);
                match path {
                    Some(path) => request.with_payload(quote(&path)),
                    None => request,
                }
            }
            Self::ReadFile { path } => {
                Request::new(id, RequestKind::ReadFile).with_payload(quote(&path))
            }
            Self::WriteFile { path } => {
                Request::new(id, RequestKind::WriteFile).with_payload(quote(&path))
            }
            Self::GetEventLog => Request::new(id, RequestKind::GetEventLog),
            Self::EmergencyStop => Request::new(id, RequestKind::EmergencyStop),
        }
    }
}

/// Payload strings travel JSON-quoted inside the params field.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to encode request: {0}")]
    Encode(#[from] CodecError),
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("transport failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("gateway closed the connection without responding")]
    Closed,
    #[error("unreadable response: {0}")]
    Decode(CodecError),
    #[cfg(not(unix))]
    #[error("unix socket endpoints are unsupported on this platform")]
    UnsupportedUnix,
}

enum Transport {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Transport {
    fn connect(endpoint: &SocketEndpoint) -> Result<Self, CliError> {
        let connect_error = |source| CliError::Connect {
            endpoint: endpoint.to_string(),
            source,
        };
        match endpoint {
            SocketEndpoint::Tcp { host, port } => {
                let stream =
                    TcpStream::connect((host.as_str(), *port)).map_err(connect_error)?;
                stream.set_read_timeout(Some(RESPONSE_TIMEOUT))?;
                Ok(Self::Tcp(stream))
            }
            SocketEndpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    let stream =
                        UnixStream::connect(path.as_std_path()).map_err(connect_error)?;
                    stream.set_read_timeout(Some(RESPONSE_TIMEOUT))?;
                    Ok(Self::Unix(stream))
                }
                #[cfg(not(unix))]
                {
                    Err(CliError::UnsupportedUnix)
                }
            }
        }
    }

    fn round_trip(&mut self, frame: &[u8]) -> Result<Response, CliError> {
        let mut buffer = vec![0_u8; MAX_FRAME_BYTES * 2];
        let count = match self {
            Self::Tcp(stream) => {
                stream.write_all(frame)?;
                stream.read(&mut buffer)?
            }
            #[cfg(unix)]
            Self::Unix(stream) => {
                stream.write_all(frame)?;
                stream.read(&mut buffer)?
            }
        };
        if count == 0 {
            return Err(CliError::Closed);
        }
        codec::decode_response(&buffer[..count]).map_err(CliError::Decode)
    }
}

fn run(cli: Cli) -> Result<Response, CliError> {
    let endpoint = cli.socket.unwrap_or_else(default_socket_endpoint);
    let mut request = cli.command.into_request(cli.id);
    if cli.confirm {
        request = request.confirmed();
    }
    if cli.critical {
        request = request.critical();
    }

    let frame = codec::encode_request(&request)?;
    let mut transport = Transport::connect(&endpoint)?;
    transport.round_trip(&frame)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(response) => {
            let rendered = serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!("{response:?}"));
            println!("{rendered}");
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("airlock: {error}");
            ExitCode::from(2)
        }
    }
}
