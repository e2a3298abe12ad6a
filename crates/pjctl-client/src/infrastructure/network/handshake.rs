//! The JVC 3-way handshake and the session it produces.
//!
//! # Handshake sequence
//!
//! ```text
//! Client                                Projector
//! ──────                                ─────────
//! (throttle gate)
//! TCP connect ───────────────────────▶
//!              ◀─────────────────────── "PJ_OK"
//! "PJREQ" or "PJREQ_<credential>" ───▶
//!              ◀─────────────────────── "PJACK"
//! ready: send framed commands
//! ```
//!
//! The projector closes the socket if `PJREQ` does not arrive within about
//! five seconds of `PJ_OK`, so the steps run back to back.  There are no
//! retries at this level; a failed step ends the attempt and the caller
//! decides whether to try again.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use pjctl_core::protocol::frame::{request_token, GREETING, HANDSHAKE_ACK};
use thiserror::Error;

use super::throttle::Throttle;
use super::{read_frame, Channel, ConnectFailure, Connector, SessionConfig};

/// The step of the handshake an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Connecting,
    AwaitingGreeting,
    SendingRequest,
    AwaitingAck,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandshakeStage::Connecting => "connecting",
            HandshakeStage::AwaitingGreeting => "awaiting greeting",
            HandshakeStage::SendingRequest => "sending request",
            HandshakeStage::AwaitingAck => "awaiting ack",
        })
    }
}

/// Errors that end a handshake attempt.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("connection failed: {0}")]
    ConnectionFailed(#[from] ConnectFailure),

    #[error("bad greeting: expected PJ_OK, received {received:02X?}")]
    BadGreeting { received: Vec<u8> },

    #[error("write error: {0}")]
    WriteFailed(String),

    #[error("bad ack: expected PJACK, received {received:02X?}")]
    BadAck { received: Vec<u8> },

    #[error("read error while {stage}: {source}")]
    Read {
        stage: HandshakeStage,
        #[source]
        source: io::Error,
    },
}

impl HandshakeError {
    /// Returns the step at which the handshake failed.
    pub fn stage(&self) -> HandshakeStage {
        match self {
            HandshakeError::ConnectionFailed(_) => HandshakeStage::Connecting,
            HandshakeError::BadGreeting { .. } => HandshakeStage::AwaitingGreeting,
            HandshakeError::WriteFailed(_) => HandshakeStage::SendingRequest,
            HandshakeError::BadAck { .. } => HandshakeStage::AwaitingAck,
            HandshakeError::Read { stage, .. } => *stage,
        }
    }
}

/// A live, handshaken connection to the projector.
///
/// The session owns the socket exclusively and closes it when dropped.  It
/// borrows the client's [`Throttle`] mutably for its whole lifetime, so the
/// last-command timestamp has a single writer.
pub struct Session<'a> {
    pub(super) channel: Box<dyn Channel>,
    pub(super) throttle: &'a mut Throttle,
    pub(super) command_timeout: Duration,
    pub(super) max_payload: usize,
}

impl<'a> Session<'a> {
    /// Waits out the throttle, connects, and runs the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError`] naming the failed step.
    pub fn open(
        config: &SessionConfig,
        connector: &dyn Connector,
        throttle: &'a mut Throttle,
    ) -> Result<Self, HandshakeError> {
        throttle.wait();

        let mut channel = connector.connect(&config.host, config.port, config.connect_timeout)?;
        channel
            .set_read_timeout(Some(config.connect_timeout))
            .map_err(|source| HandshakeError::Read {
                stage: HandshakeStage::Connecting,
                source,
            })?;

        let greeting = read_frame(channel.as_mut(), GREETING.len()).map_err(|source| {
            HandshakeError::Read {
                stage: HandshakeStage::AwaitingGreeting,
                source,
            }
        })?;
        if greeting != GREETING {
            return Err(HandshakeError::BadGreeting { received: greeting });
        }

        let token = request_token(config.credential.as_deref());
        channel
            .write_all(&token)
            .and_then(|()| channel.flush())
            .map_err(|e| HandshakeError::WriteFailed(e.to_string()))?;

        let ack = read_frame(channel.as_mut(), HANDSHAKE_ACK.len()).map_err(|source| {
            HandshakeError::Read {
                stage: HandshakeStage::AwaitingAck,
                source,
            }
        })?;
        if ack != HANDSHAKE_ACK {
            return Err(HandshakeError::BadAck { received: ack });
        }

        Ok(Self {
            channel,
            throttle,
            command_timeout: config.command_timeout,
            max_payload: config.max_payload,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
