//! The protocol client: every projector operation goes through here.
//!
//! # Connection model
//!
//! The projector accepts one control client at a time and drops idle
//! connections, so nothing is kept open between calls.  Every top-level
//! operation opens a [`Session`], sends its command(s), and lets the session
//! drop, which closes the socket on success and on failure alike.
//!
//! # Throttling
//!
//! The [`Throttle`] lives here, not in the session, because the minimum delay
//! has to hold across calls: `power_on()` followed immediately by
//! `apply_preset()` must still be spaced out.  Sessions borrow it mutably
//! while they run.
//!
//! # Errors
//!
//! Every failure is a [`ClientError`] tagged with the [`Stage`] it happened
//! in.  The two lenient readers, [`ProtocolClient::read_boolean_state`] and
//! [`ProtocolClient::get_power_state_with_retry`], log and substitute a
//! fallback value instead.

use std::fmt;
use std::sync::Arc;

use pjctl_core::protocol::frame::strip_known_markers;
use pjctl_core::{
    Command, CommandKind, CommandRegistry, CommandSpec, JvcRegistry, PowerState, RegistryError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::presets::Preset;
use crate::infrastructure::network::handshake::{HandshakeError, HandshakeStage, Session};
use crate::infrastructure::network::throttle::{Clock, SystemClock, Throttle};
use crate::infrastructure::network::transport::TransportError;
use crate::infrastructure::network::{ConnectFailure, Connector, SessionConfig, TcpConnector};

/// Attempts made by [`ProtocolClient::power_state`].
pub const POWER_STATE_ATTEMPTS: u32 = 3;

/// Where in the pipeline a [`ClientError`] arose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Registry,
    Connect,
    Handshake,
    Transport,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Registry => "registry",
            Stage::Connect => "connect",
            Stage::Handshake => "handshake",
            Stage::Transport => "transport",
        })
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("command failed: {0}")]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn stage(&self) -> Stage {
        match self {
            ClientError::Registry(_) => Stage::Registry,
            ClientError::Handshake(e) => match e.stage() {
                HandshakeStage::Connecting => Stage::Connect,
                _ => Stage::Handshake,
            },
            ClientError::Transport(_) => Stage::Transport,
        }
    }

    /// Returns `true` if the projector refused the TCP connection.
    pub fn is_refused(&self) -> bool {
        matches!(
            self,
            ClientError::Handshake(HandshakeError::ConnectionFailed(
                ConnectFailure::Refused { .. }
            ))
        )
    }
}

/// Blocking client for one projector.
pub struct ProtocolClient {
    config: SessionConfig,
    registry: Arc<dyn CommandRegistry>,
    connector: Arc<dyn Connector>,
    throttle: Throttle,
}

impl ProtocolClient {
    /// Creates a client using the built-in JVC table, real TCP sockets, and
    /// the system clock.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(JvcRegistry::new()),
            Arc::new(TcpConnector),
            Arc::new(SystemClock),
        )
    }

    /// Creates a client from explicit collaborators.
    pub fn with_parts(
        config: SessionConfig,
        registry: Arc<dyn CommandRegistry>,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let throttle = Throttle::new(config.command_delay, clock);
        Self {
            config,
            registry,
            connector,
            throttle,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Command execution ─────────────────────────────────────────────────

    /// Sends one command in its own session.
    ///
    /// Returns the ack frame for an operation, or the raw value frame for a
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] tagged with the failing stage.  An unknown
    /// command fails before any connection is made.
    pub fn execute_one(
        &mut self,
        name: &str,
        value: &str,
        kind: CommandKind,
    ) -> Result<Vec<u8>, ClientError> {
        let command = Command {
            name: name.to_string(),
            value: value.to_string(),
            kind,
        };
        let spec = self.registry.lookup(&command)?;
        self.run_single(&command, &spec)
    }

    /// Sends `commands` in order over a single session.
    ///
    /// Every command is resolved before connecting, so a typo in the list
    /// sends nothing.  The first failure ends the sequence; later commands
    /// are not written.  An empty list is a no-op and does not connect.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`] encountered.
    pub fn execute_sequence(&mut self, commands: &[Command]) -> Result<(), ClientError> {
        if commands.is_empty() {
            return Ok(());
        }
        let specs = self.resolve_all(commands)?;

        let mut session = self.open_session()?;
        for (index, (command, spec)) in commands.iter().zip(&specs).enumerate() {
            debug!("sending {command} ({}/{})", index + 1, commands.len());
            session
                .send(&spec.frame(), &spec.expected_ack(), spec.kind)
                .map_err(|e| {
                    let remaining = commands.len() - index - 1;
                    warn!("{command} failed, abandoning {remaining} remaining command(s): {e}");
                    e
                })?;
        }
        drop(session);
        info!("sent {} command(s) to {}", commands.len(), self.config.host);
        Ok(())
    }

    /// Sends `commands` in order, one session per command.
    ///
    /// Slower than [`execute_sequence`](Self::execute_sequence) but tolerant
    /// of projectors that drop the connection after each command.  Stops at
    /// the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`] encountered.
    pub fn execute_many(&mut self, commands: &[Command]) -> Result<(), ClientError> {
        let specs = self.resolve_all(commands)?;
        for (command, spec) in commands.iter().zip(&specs) {
            self.run_single(command, spec)?;
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Sends a reference command and returns its value with all protocol
    /// markers stripped, e.g. `PW1` for `power_status`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] tagged with the failing stage.
    pub fn query(&mut self, name: &str) -> Result<Vec<u8>, ClientError> {
        let command = Command::reference(name);
        let spec = self.registry.lookup(&command)?;
        let payload = self.run_single(&command, &spec)?;
        Ok(strip_known_markers(&payload))
    }

    /// Reads an on/off setting.
    ///
    /// The setting is off when the cleaned payload is exactly the setting's
    /// code followed by the code of its `off` value; any other reply counts
    /// as on.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if `name` has no `off` value or the query
    /// fails.
    pub fn query_boolean_state(&mut self, name: &str) -> Result<bool, ClientError> {
        let off = self.registry.lookup(&Command::operation(name, "off"))?;
        let payload = self.query(name)?;
        let value = strip_code_prefix(&payload, &off);
        Ok(value != off.param.as_slice())
    }

    /// Like [`query_boolean_state`](Self::query_boolean_state), but a failed
    /// read is logged and reported as `true`.
    ///
    /// Callers use this to pick a command list; assuming "on" makes them send
    /// the list that first switches the setting off, which is safe in both
    /// states.
    pub fn read_boolean_state(&mut self, name: &str) -> bool {
        match self.query_boolean_state(name) {
            Ok(state) => state,
            Err(e) => {
                warn!("could not read {name} (stage: {}), assuming on: {e}", e.stage());
                true
            }
        }
    }

    /// Reads the power state, trying up to `max_attempts` times.
    ///
    /// Each attempt opens a fresh session.  Returns [`PowerState::Unknown`]
    /// when every attempt fails, or when `max_attempts` is zero.
    pub fn get_power_state_with_retry(&mut self, max_attempts: u32) -> PowerState {
        for attempt in 1..=max_attempts {
            match self.read_power_state() {
                Ok(state) => {
                    debug!("power state is {state} (attempt {attempt})");
                    return state;
                }
                Err(e) => warn!("power state read failed (attempt {attempt}/{max_attempts}): {e}"),
            }
        }
        PowerState::Unknown
    }

    /// Reads the power state with the default retry budget.
    pub fn power_state(&mut self) -> PowerState {
        self.get_power_state_with_retry(POWER_STATE_ATTEMPTS)
    }

    // ── Conveniences ──────────────────────────────────────────────────────

    pub fn power_on(&mut self) -> Result<(), ClientError> {
        self.execute_one("power", "on", CommandKind::Operation)?;
        info!("power on sent to {}", self.config.host);
        Ok(())
    }

    pub fn power_off(&mut self) -> Result<(), ClientError> {
        self.execute_one("power", "off", CommandKind::Operation)?;
        info!("power off sent to {}", self.config.host);
        Ok(())
    }

    /// Returns `true` if the projector is on or warming up.
    pub fn is_on(&mut self) -> bool {
        self.power_state().is_on()
    }

    /// Presses the remote's info key, toggling the on-screen info panel.
    pub fn info(&mut self) -> Result<(), ClientError> {
        self.execute_one("remote", "info", CommandKind::Operation)?;
        Ok(())
    }

    /// Applies `preset`, choosing its command list from the current
    /// low-latency state.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError`] from the command sequence.  A failed
    /// low-latency read is not an error.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<(), ClientError> {
        let low_latency = self.read_boolean_state("low_latency");
        let commands = preset.commands(low_latency);
        info!(
            "applying {preset} ({} command(s), low latency {})",
            commands.len(),
            if low_latency { "on" } else { "off" }
        );
        self.execute_sequence(&commands)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn open_session(&mut self) -> Result<Session<'_>, ClientError> {
        Ok(Session::open(
            &self.config,
            self.connector.as_ref(),
            &mut self.throttle,
        )?)
    }

    fn resolve_all(&self, commands: &[Command]) -> Result<Vec<CommandSpec>, ClientError> {
        commands
            .iter()
            .map(|c| self.registry.lookup(c).map_err(ClientError::from))
            .collect()
    }

    fn run_single(&mut self, command: &Command, spec: &CommandSpec) -> Result<Vec<u8>, ClientError> {
        debug!("sending {command}");
        let mut session = self.open_session()?;
        let response = session.send(&spec.frame(), &spec.expected_ack(), spec.kind)?;
        Ok(response.into_bytes())
    }

    fn read_power_state(&mut self) -> Result<PowerState, ClientError> {
        let command = Command::reference("power_status");
        let spec = self.registry.lookup(&command)?;
        let payload = strip_known_markers(&self.run_single(&command, &spec)?);
        let code = payload
            .strip_prefix(spec.ack_code.as_slice())
            .unwrap_or(&payload);
        Ok(PowerState::from_code(code))
    }
}

/// Removes the command code, or failing that the ack code, from the front of
/// a cleaned reference payload.
fn strip_code_prefix<'p>(payload: &'p [u8], spec: &CommandSpec) -> &'p [u8] {
    payload
        .strip_prefix(spec.code.as_slice())
        .or_else(|| payload.strip_prefix(spec.ack_code.as_slice()))
        .unwrap_or(payload)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
