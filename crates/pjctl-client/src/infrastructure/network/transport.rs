//! Sending one framed command over an open [`Session`].
//!
//! Every command is acknowledged by a fixed-length ack frame.  Reference
//! (query) commands are followed by a second frame carrying the value:
//!
//! ```text
//! Client                                Projector
//! ──────                                ─────────
//! (throttle gate)
//! "?\x89\x01PW\n" ───────────────────▶
//!              ◀─────────────────────── "\x06\x89\x01PW\n"    ack
//!              ◀─────────────────────── "@\x89\x01PW1\n"      value (reference only)
//! ```
//!
//! A projector that does not answer within the command timeout is rejecting
//! the command in its current state (for example picture settings while in
//! standby).  That case gets its own [`TransportError::Timeout`] variant.

use std::io::{self, Write};

use pjctl_core::protocol::frame::FOOTER;
use pjctl_core::CommandKind;
use thiserror::Error;

use super::handshake::Session;
use super::{is_timeout, read_frame, Channel};

/// What a successful command returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The validated ack frame of an operation command.
    Ack(Vec<u8>),
    /// The raw value frame that followed the ack of a reference command.
    Payload(Vec<u8>),
}

impl Response {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Response::Ack(bytes) | Response::Payload(bytes) => bytes,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("command not currently permitted: no response before the read timeout")]
    Timeout,

    #[error("unexpected ack: expected {expected:02X?}, received {received:02X?}")]
    UnexpectedAck { expected: Vec<u8>, received: Vec<u8> },

    #[error("connection closed by projector")]
    ConnectionClosed,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A reference command that has been written and whose ack and value frame
/// are still to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub expected_ack: Vec<u8>,
    pub max_payload: usize,
}

impl PendingQuery {
    /// Validates `ack`, then reads the value frame.
    ///
    /// The value frame has no length prefix.  Reads continue until the
    /// buffer ends with the footer or holds `max_payload` bytes.  If the
    /// projector goes quiet or closes after part of a frame, the bytes
    /// received so far are the payload.
    fn complete(self, channel: &mut dyn Channel, ack: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        check_ack(&self.expected_ack, ack)?;

        let mut payload = Vec::with_capacity(self.max_payload);
        let mut buf = vec![0u8; self.max_payload];
        while payload.len() < self.max_payload && payload.last() != Some(&FOOTER) {
            let room = self.max_payload - payload.len();
            match channel.read(&mut buf[..room]) {
                Ok(0) if payload.is_empty() => return Err(TransportError::ConnectionClosed),
                Ok(0) => break,
                Ok(n) => payload.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) && !payload.is_empty() => break,
                Err(e) => return Err(classify_read_error(e)),
            }
        }
        Ok(payload)
    }
}

impl Session<'_> {
    /// Sends `frame`, validates the ack, and reads the value of a reference
    /// command.
    ///
    /// The throttle is marked only when the whole exchange succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the write fails, no ack arrives in time,
    /// the ack differs from `expected_ack`, or the peer closes.
    pub fn send(
        &mut self,
        frame: &[u8],
        expected_ack: &[u8],
        kind: CommandKind,
    ) -> Result<Response, TransportError> {
        self.throttle.wait();

        self.channel.write_all(frame)?;
        self.channel.flush()?;
        self.channel.set_read_timeout(Some(self.command_timeout))?;

        let received =
            read_frame(self.channel.as_mut(), expected_ack.len()).map_err(classify_read_error)?;
        if received.is_empty() {
            return Err(TransportError::ConnectionClosed);
        }

        let response = match kind {
            CommandKind::Operation => Response::Ack(check_ack(expected_ack, received)?),
            CommandKind::Reference => {
                let pending = PendingQuery {
                    expected_ack: expected_ack.to_vec(),
                    max_payload: self.max_payload,
                };
                Response::Payload(pending.complete(self.channel.as_mut(), received)?)
            }
        };

        self.throttle.mark();
        Ok(response)
    }
}

fn check_ack(expected: &[u8], received: Vec<u8>) -> Result<Vec<u8>, TransportError> {
    if received == expected {
        Ok(received)
    } else {
        Err(TransportError::UnexpectedAck {
            expected: expected.to_vec(),
            received,
        })
    }
}

fn classify_read_error(error: io::Error) -> TransportError {
    if is_timeout(&error) {
        TransportError::Timeout
    } else {
        TransportError::Io(error)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
