//! Test doubles and the in-process gateway harness.
//!
//! The harness binds a real TCP listener on an ephemeral port and
//! drives [`Gateway::tick`] by hand, so behaviour tests exercise the
//! full frame path without a background thread.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use airlock_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::collaborators::Collaborators;
use crate::dispatch::HandlerRegistry;
use crate::gateway::Gateway;
use crate::health::HealthReporter;
use crate::pipeline::Pipeline;
use crate::state::{SafetyMode, SafetyState, StateSnapshot};
use crate::transport::GatewayListener;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ClientAdmitted(usize),
    ClientRejected,
    ClientDeparted(usize),
    Heartbeat,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn client_admitted(&self, slot: usize, _peer: &str) {
        self.record(HealthEvent::ClientAdmitted(slot));
    }

    fn client_rejected(&self, _peer: &str) {
        self.record(HealthEvent::ClientRejected);
    }

    fn client_departed(&self, slot: usize) {
        self.record(HealthEvent::ClientDeparted(slot));
    }

    fn heartbeat(&self, _snapshot: &StateSnapshot) {
        self.record(HealthEvent::Heartbeat);
    }
}

/// In-process gateway over an ephemeral TCP port.
pub struct GatewayWorld {
    gateway: Gateway,
    addr: SocketAddr,
    reporter: Arc<RecordingHealthReporter>,
}

impl GatewayWorld {
    /// Gateway in safe mode with default limits.
    pub fn safe() -> Self {
        Self::with(SafetyMode::Safe, 4, Duration::from_secs(5))
    }

    /// Gateway in permissive mode with default limits.
    pub fn permissive() -> Self {
        Self::with(SafetyMode::Permissive, 4, Duration::from_secs(5))
    }

    /// Fully parameterised gateway.
    pub fn with(mode: SafetyMode, max_clients: usize, cooldown: Duration) -> Self {
        let endpoint = SocketEndpoint::tcp("127.0.0.1", 0);
        let listener = GatewayListener::bind(&endpoint).expect("bind harness listener");
        let addr = listener.local_addr().expect("harness local addr");
        let reporter = Arc::new(RecordingHealthReporter::default());
        let pipeline = Pipeline::new(
            SafetyState::new(mode, false),
            HandlerRegistry::with_host_handlers(),
            Collaborators::host_defaults(),
            cooldown,
        );
        let gateway = Gateway::new(
            listener,
            pipeline,
            Box::new(Arc::clone(&reporter)),
            max_clients,
            Duration::from_millis(10),
            Duration::from_secs(10),
        );
        Self {
            gateway,
            addr,
            reporter,
        }
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.reporter.events()
    }

    /// Connects a client and ticks until the gateway seats (or
    /// rejects) it.
    pub fn connect(&mut self) -> TcpStream {
        let client = TcpStream::connect(self.addr).expect("connect client");
        client
            .set_read_timeout(Some(Duration::from_millis(20)))
            .expect("read timeout");
        // One tick to run the accept path.
        self.gateway.tick();
        client
    }

    /// Sends one frame and ticks until a response frame arrives.
    pub fn request(&mut self, client: &mut TcpStream, frame: &str) -> serde_json::Value {
        client.write_all(frame.as_bytes()).expect("send frame");
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut buffer = [0_u8; 8192];
        loop {
            self.gateway.tick();
            match client.read(&mut buffer) {
                Ok(0) => panic!("connection closed while awaiting response"),
                Ok(count) => {
                    return serde_json::from_slice(&buffer[..count]).expect("response json");
                }
                Err(error)
                    if error.kind() == std::io::ErrorKind::WouldBlock
                        || error.kind() == std::io::ErrorKind::TimedOut =>
                {
                    assert!(Instant::now() < deadline, "timed out awaiting response");
                }
                Err(error) => panic!("read failed: {error}"),
            }
        }
    }

    /// Runs a few ticks without expecting traffic.
    pub fn settle(&mut self) {
        for _ in 0..5 {
            self.gateway.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
