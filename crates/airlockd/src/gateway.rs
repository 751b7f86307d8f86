//! The single-threaded gateway loop.
//!
//! One thread owns the listener, every client slot, and the pipeline.
//! Each tick accepts at most one pending connection, then services
//! occupied slots in ascending order, one frame per slot per tick.
//! Requests on one connection therefore complete in arrival order,
//! and no lock is ever taken.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::health::HealthReporter;
use crate::pipeline::Pipeline;
use crate::transport::{ConnectionTable, GatewayListener, ReadOutcome, TRANSPORT_TARGET};

/// The assembled gateway, ready to run.
pub struct Gateway {
    listener: GatewayListener,
    connections: ConnectionTable,
    pipeline: Pipeline,
    reporter: Box<dyn HealthReporter>,
    tick_interval: Duration,
    heartbeat_interval: Duration,
}

impl Gateway {
    /// Assembles a gateway over a bound listener.
    #[must_use]
    pub(crate) fn new(
        listener: GatewayListener,
        pipeline: Pipeline,
        reporter: Box<dyn HealthReporter>,
        max_clients: usize,
        tick_interval: Duration,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            listener,
            connections: ConnectionTable::new(max_clients),
            pipeline,
            reporter,
            tick_interval,
            heartbeat_interval,
        }
    }

    /// Local TCP address, when bound over TCP.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs until `shutdown` becomes true.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        let mut last_heartbeat = Instant::now();
        while !shutdown.load(Ordering::SeqCst) {
            self.tick();
            if last_heartbeat.elapsed() >= self.heartbeat_interval {
                let snapshot = self.pipeline.state().snapshot(self.connections.active());
                self.reporter.heartbeat(&snapshot);
                last_heartbeat = Instant::now();
            }
            std::thread::sleep(self.tick_interval);
        }
    }

    /// One loop iteration: a single accept attempt, then one service
    /// pass over every occupied slot.
    pub fn tick(&mut self) {
        self.accept_pending();
        for index in self.connections.occupied() {
            self.service_slot(index);
        }
    }

    fn accept_pending(&mut self) {
        let stream = match self.listener.accept_one() {
            Ok(Some(stream)) => stream,
            Ok(None) => return,
            Err(error) => {
                warn!(target: TRANSPORT_TARGET, %error, "accept failed");
                return;
            }
        };

        let peer = stream.peer();
        match self.connections.admit(stream) {
            Ok(slot) => self.reporter.client_admitted(slot, &peer),
            // Dropping the stream closes it; seated clients are untouched.
            Err(_rejected) => self.reporter.client_rejected(&peer),
        }
    }

    fn service_slot(&mut self, index: usize) {
        let Some(stream) = self.connections.stream_mut(index) else {
            return;
        };

        let frame = match stream.read_frame() {
            Ok(ReadOutcome::Frame(frame)) => frame,
            Ok(ReadOutcome::Idle) => return,
            Ok(ReadOutcome::Closed) => {
                self.connections.release(index);
                self.reporter.client_departed(index);
                return;
            }
            Err(error) => {
                warn!(target: TRANSPORT_TARGET, slot = index, %error, "read failed");
                self.connections.release(index);
                self.reporter.client_departed(index);
                return;
            }
        };

        let active = self.connections.active();
        let reply = self.pipeline.process_frame(&frame, Instant::now(), active);

        let Some(stream) = self.connections.stream_mut(index) else {
            return;
        };
        if let Err(error) = stream.send(&reply) {
            warn!(target: TRANSPORT_TARGET, slot = index, %error, "send failed");
            self.connections.release(index);
            self.reporter.client_departed(index);
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Gateway")
            .field("connections", &self.connections)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}
