//! Network infrastructure for the projector control channel.
//!
//! Architecture:
//! - A [`Connector`] turns a host/port into a connected [`Channel`].
//!   [`TcpConnector`] is the production implementation; `mock::MockConnector`
//!   replays scripted bytes for tests.
//! - `handshake` runs the greeting exchange and yields a `Session`, which owns
//!   the channel exclusively until it is dropped.
//! - `transport` sends one framed command on a `Session` and validates the ack.
//! - `throttle` enforces the minimum delay between commands.
//!
//! Nothing in this module logs.  Every failure is returned as a typed error
//! and the application layer decides what to report.

pub mod handshake;
pub mod mock;
pub mod throttle;
pub mod transport;

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

/// Default JVC control port.
pub const DEFAULT_PORT: u16 = 20554;

/// Largest value frame read after the ack of a reference command.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024;

/// Why a TCP connection could not be established.
#[derive(Debug, Error)]
pub enum ConnectFailure {
    /// The projector actively refused the connection (port closed, or the
    /// control server is busy with another client).
    #[error("connection refused by {addr}")]
    Refused { addr: String },

    /// No answer within the connect timeout.
    #[error("connection to {addr} timed out")]
    TimedOut { addr: String },

    /// The host name did not resolve to any address.
    #[error("could not resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Any other socket error.
    #[error("failed to connect to {addr}: {source}")]
    Other {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Connection settings for one projector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    /// Applies to the TCP connect and to the handshake reads.
    pub connect_timeout: Duration,
    /// Applies to every ack and value read after the handshake.
    pub command_timeout: Duration,
    /// Minimum wall-clock gap between two commands.
    pub command_delay: Duration,
    /// Pre-shared credential for NZ series models.
    pub credential: Option<String>,
    pub max_payload: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(10),
            command_delay: Duration::from_millis(1000),
            credential: None,
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// A connected, bidirectional byte stream.
pub trait Channel: Read + Write + Send {
    /// Sets the timeout for subsequent reads.  `None` blocks indefinitely.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Channel for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

/// Opens channels to a projector.
pub trait Connector: Send + Sync {
    /// Connects to `host:port`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectFailure`] classifying why the connection failed.
    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn Channel>, ConnectFailure>;
}

/// Production connector backed by [`TcpStream::connect_timeout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Box<dyn Channel>, ConnectFailure> {
        let addrs: Vec<_> = (host, port)
            .to_socket_addrs()
            .map_err(|source| ConnectFailure::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();

        let mut last_failure = ConnectFailure::Resolve {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
        };

        // Try every resolved address in order; keep the last failure.
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream
                        .set_nodelay(true)
                        .map_err(|source| ConnectFailure::Other {
                            addr: addr.to_string(),
                            source,
                        })?;
                    return Ok(Box::new(stream));
                }
                Err(e) => last_failure = classify_connect_error(addr.to_string(), e),
            }
        }

        Err(last_failure)
    }
}

fn classify_connect_error(addr: String, error: io::Error) -> ConnectFailure {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => ConnectFailure::Refused { addr },
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ConnectFailure::TimedOut { addr },
        _ => ConnectFailure::Other {
            addr,
            source: error,
        },
    }
}

/// Returns `true` if `error` is a read-timeout expiry.
///
/// Unix sockets report an expired `SO_RCVTIMEO` as `WouldBlock`, Windows as
/// `TimedOut`.
pub(crate) fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Reads up to `len` bytes, stopping early only if the peer closes.
///
/// There is no length prefix on the wire, so the caller passes the length of
/// the frame it expects.  A short result means the peer hung up mid-frame.
pub(crate) fn read_frame(channel: &mut dyn Channel, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match channel.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
