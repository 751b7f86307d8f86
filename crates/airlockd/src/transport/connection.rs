//! Non-blocking client streams and the fixed slot table.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use tracing::debug;

use airlock_protocol::MAX_FRAME_BYTES;

use super::TRANSPORT_TARGET;

const SEND_RETRY_LIMIT: u32 = 40;
const SEND_RETRY_PAUSE: Duration = Duration::from_millis(5);

/// Result of polling a stream for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One datagram-like frame arrived.
    Frame(Vec<u8>),
    /// Nothing pending; poll again next tick.
    Idle,
    /// The peer closed its end.
    Closed,
}

/// One accepted client connection in non-blocking mode.
#[derive(Debug)]
pub enum ClientStream {
    /// TCP peer.
    Tcp(TcpStream),
    /// Unix-domain peer.
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ClientStream {
    /// Short peer description for log lines.
    #[must_use]
    pub fn peer(&self) -> String {
        match self {
            Self::Tcp(stream) => stream
                .peer_addr()
                .map_or_else(|_| "tcp:unknown".to_owned(), |addr| addr.to_string()),
            #[cfg(unix)]
            Self::Unix(_) => "unix:local".to_owned(),
        }
    }

    /// Polls for one frame without blocking.
    ///
    /// Reads a single burst of at most one frame's worth of bytes
    /// plus one, so an oversized frame is still observed (and later
    /// rejected) rather than silently split.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors other than `WouldBlock`, which maps to
    /// [`ReadOutcome::Idle`].
    pub fn read_frame(&mut self) -> io::Result<ReadOutcome> {
        let mut buffer = vec![0_u8; MAX_FRAME_BYTES + 1];
        let read = match self {
            Self::Tcp(stream) => stream.read(&mut buffer),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(&mut buffer),
        };
        match read {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(count) => {
                buffer.truncate(count);
                Ok(ReadOutcome::Frame(buffer))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(ReadOutcome::Idle),
            Err(error) => Err(error),
        }
    }

    /// Writes one frame, retrying briefly while the socket is busy.
    ///
    /// # Errors
    ///
    /// Fails when the retry budget is exhausted or the stream errors.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let mut written = 0;
        let mut retries = 0;
        while written < frame.len() {
            let attempt = match self {
                Self::Tcp(stream) => stream.write(&frame[written..]),
                #[cfg(unix)]
                Self::Unix(stream) => stream.write(&frame[written..]),
            };
            match attempt {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(count) => written += count,
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                    retries += 1;
                    if retries > SEND_RETRY_LIMIT {
                        return Err(io::Error::from(io::ErrorKind::TimedOut));
                    }
                    std::thread::sleep(SEND_RETRY_PAUSE);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }
}

/// Fixed-capacity table of client slots.
///
/// Slot indices are stable for the life of a connection and iteration
/// is always in ascending slot order.
#[derive(Debug)]
pub struct ConnectionTable {
    slots: Vec<Option<ClientStream>>,
}

impl ConnectionTable {
    /// A table with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Occupied slot count.
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Seats a client in the lowest free slot.
    ///
    /// Returns the slot index, or the stream back when the table is
    /// full so the caller can refuse it.
    pub fn admit(&mut self, stream: ClientStream) -> Result<usize, ClientStream> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(stream);
                return Ok(index);
            }
        }
        Err(stream)
    }

    /// Frees a slot.
    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index)
            && slot.take().is_some()
        {
            debug!(target: TRANSPORT_TARGET, slot = index, "connection slot released");
        }
    }

    /// Mutable access to one slot's stream.
    pub fn stream_mut(&mut self, index: usize) -> Option<&mut ClientStream> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Indices of occupied slots, ascending.
    #[must_use]
    pub fn occupied(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
            .collect()
    }
}
