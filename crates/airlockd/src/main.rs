//! `airlockd` binary entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use airlock_config::{Config, LogFormat, SocketEndpoint};
use airlockd::{HealthReporter, StructuredHealthReporter, bootstrap};

/// Safety-gated command/response gateway daemon.
#[derive(Debug, Parser)]
#[command(name = "airlockd", version, about)]
struct Cli {
    /// Socket endpoint, e.g. `unix:///run/airlock/airlockd.sock` or
    /// `tcp://127.0.0.1:9021`.
    #[arg(long, env = "AIRLOCKD_SOCKET")]
    socket: Option<SocketEndpoint>,

    /// Tracing filter expression, e.g. `info` or `airlockd=debug`.
    #[arg(long, env = "AIRLOCKD_LOG_FILTER")]
    log_filter: Option<String>,

    /// Log output format: `json` or `compact`.
    #[arg(long, env = "AIRLOCKD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Start in permissive mode: critical requests skip confirmation.
    #[arg(long, env = "AIRLOCKD_PERMISSIVE")]
    permissive: bool,

    /// Log each outbound response frame.
    #[arg(long, env = "AIRLOCKD_DEBUG")]
    debug: bool,

    /// Maximum simultaneous client connections.
    #[arg(long, env = "AIRLOCKD_MAX_CLIENTS")]
    max_clients: Option<usize>,

    /// Loop tick interval in milliseconds.
    #[arg(long, env = "AIRLOCKD_TICK_INTERVAL_MS")]
    tick_interval_ms: Option<u64>,

    /// Cooldown between accepted critical requests, in seconds.
    #[arg(long, env = "AIRLOCKD_COOLDOWN_SECS")]
    cooldown_secs: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::default();
        if let Some(socket) = self.socket {
            config.socket = socket;
        }
        if let Some(log_filter) = self.log_filter {
            config.log_filter = log_filter;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if let Some(max_clients) = self.max_clients {
            config.limits.max_clients = max_clients;
        }
        if let Some(tick_interval_ms) = self.tick_interval_ms {
            config.limits.tick_interval_ms = tick_interval_ms;
        }
        if let Some(cooldown_secs) = self.cooldown_secs {
            config.limits.cooldown_secs = cooldown_secs;
        }
        config.permissive = self.permissive;
        config.debug = self.debug;
        config
    }
}

fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(error) = flag::register(signal, Arc::clone(&shutdown)) {
            eprintln!("airlockd: failed to register signal handler: {error}");
            return ExitCode::FAILURE;
        }
    }

    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    match bootstrap(&config, reporter) {
        Ok(mut gateway) => {
            gateway.run(&shutdown);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("airlockd: {error}");
            ExitCode::FAILURE
        }
    }
}
