//! Scripted connector and manual clock for testing.
//!
//! # Why a scripted connector?
//!
//! The real [`super::TcpConnector`] needs a projector (or a fake server) on
//! the network, and its failures depend on timing.  [`MockConnector`]
//! replaces the socket with an in-memory script:
//!
//! - Each call to `connect` consumes the next queued [`ConnectScript`].
//! - An accepted connection replays its inbound chunks one per `read` call.
//!   When the chunks run out, reads fail with `TimedOut`, exactly like an
//!   expired socket read timeout.  An empty chunk reads as end-of-stream.
//! - Every connect, read, write, and close is appended to a shared event log,
//!   so tests can assert exactly what went over the "wire" and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let connector = MockConnector::new();
//! connector.accept([GREETING.to_vec(), HANDSHAKE_ACK.to_vec()]);
//!
//! let session = Session::open(&config, &connector, &mut throttle)?;
//! assert_eq!(connector.writes(), vec![b"PJREQ".to_vec()]);
//! ```

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::throttle::Clock;
use super::{Channel, ConnectFailure, Connector};

/// One observable interaction with the mock projector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Connect { host: String, port: u16 },
    Read(Vec<u8>),
    Write(Vec<u8>),
    Close,
}

/// What the next `connect` call does.
#[derive(Debug, Clone)]
pub enum ConnectScript {
    Refuse,
    TimeOut,
    Accept {
        inbound: Vec<Vec<u8>>,
        /// Every write on this connection fails with `BrokenPipe`.
        fail_writes: bool,
    },
}

#[derive(Default)]
struct MockState {
    scripts: VecDeque<ConnectScript>,
    events: Vec<ChannelEvent>,
    read_timeouts: Vec<Option<Duration>>,
}

/// A [`Connector`] that replays scripted connections.
///
/// Cloning shares the script queue and the event log.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a connection that delivers `inbound`, one chunk per read.
    pub fn accept<I, B>(&self, inbound: I) -> &Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        self.push(ConnectScript::Accept {
            inbound: inbound.into_iter().map(Into::into).collect(),
            fail_writes: false,
        })
    }

    /// Queues a connection whose writes all fail.
    pub fn accept_failing_writes<I, B>(&self, inbound: I) -> &Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        self.push(ConnectScript::Accept {
            inbound: inbound.into_iter().map(Into::into).collect(),
            fail_writes: true,
        })
    }

    /// Queues a refused connection.
    pub fn refuse(&self) -> &Self {
        self.push(ConnectScript::Refuse)
    }

    /// Queues a connection attempt that times out.
    pub fn time_out(&self) -> &Self {
        self.push(ConnectScript::TimeOut)
    }

    fn push(&self, script: ConnectScript) -> &Self {
        lock(&self.state).scripts.push_back(script);
        self
    }

    /// Returns a copy of the event log.
    pub fn events(&self) -> Vec<ChannelEvent> {
        lock(&self.state).events.clone()
    }

    /// Returns only the bytes written, one entry per write call.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns how many connection attempts were made.
    pub fn connect_count(&self) -> usize {
        lock(&self.state)
            .events
            .iter()
            .filter(|e| matches!(e, ChannelEvent::Connect { .. }))
            .count()
    }

    /// Returns every read timeout that was set, in order.
    pub fn read_timeouts(&self) -> Vec<Option<Duration>> {
        lock(&self.state).read_timeouts.clone()
    }
}

impl Connector for MockConnector {
    fn connect(
        &self,
        host: &str,
        port: u16,
        _timeout: Duration,
    ) -> Result<Box<dyn Channel>, ConnectFailure> {
        let mut state = lock(&self.state);
        state.events.push(ChannelEvent::Connect {
            host: host.to_string(),
            port,
        });
        let addr = format!("{host}:{port}");

        match state.scripts.pop_front() {
            Some(ConnectScript::Accept {
                inbound,
                fail_writes,
            }) => Ok(Box::new(MockChannel {
                inbound: inbound.into(),
                fail_writes,
                state: Arc::clone(&self.state),
            })),
            Some(ConnectScript::TimeOut) => Err(ConnectFailure::TimedOut { addr }),
            Some(ConnectScript::Refuse) | None => Err(ConnectFailure::Refused { addr }),
        }
    }
}

/// The channel handed out by [`MockConnector`].
pub struct MockChannel {
    inbound: VecDeque<Vec<u8>>,
    fail_writes: bool,
    state: Arc<Mutex<MockState>>,
}

impl Read for MockChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "mock read timed out"));
        };
        if chunk.is_empty() {
            return Ok(0);
        }
        if chunk.len() > buf.len() {
            let rest = chunk.split_off(buf.len());
            self.inbound.push_front(rest);
        }
        buf[..chunk.len()].copy_from_slice(&chunk);
        lock(&self.state).events.push(ChannelEvent::Read(chunk.clone()));
        Ok(chunk.len())
    }
}

impl Write for MockChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failed"));
        }
        lock(&self.state).events.push(ChannelEvent::Write(buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Channel for MockChannel {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        lock(&self.state).read_timeouts.push(timeout);
        Ok(())
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        lock(&self.state).events.push(ChannelEvent::Close);
    }
}

/// A [`Clock`] that only moves when told to.
///
/// `sleep` advances the clock by the requested duration and records it, so
/// throttle behaviour can be asserted without real waiting.
pub struct ManualClock {
    now: Mutex<Instant>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *lock(&self.now) += duration;
    }

    /// Returns every sleep requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }

    pub fn total_slept(&self) -> Duration {
        lock(&self.sleeps).iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }

    fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
        self.advance(duration);
    }
}

/// Test doubles keep working after a panicking test thread poisoned a lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
