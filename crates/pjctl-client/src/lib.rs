//! pjctl-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pjctl-client do? (for beginners)
//!
//! It drives a JVC projector over its TCP control port.  Every top-level call
//! follows the same short-lived connection pattern:
//!
//! 1. Wait until the configured delay has passed since the last command
//!    (the projector drops clients that talk to it too quickly).
//! 2. Connect and complete the `PJ_OK` / `PJREQ` / `PJACK` handshake.
//! 3. Send one or more framed commands, each fully acknowledged before the
//!    next one is written.
//! 4. Close the socket.
//!
//! The work is strictly sequential and blocking.  There is no background
//! thread and no event loop; the caller's thread does everything.

/// Application layer: the protocol client and the picture presets.
pub mod application;

/// Infrastructure layer: sockets, handshake, transport, throttling, config files.
pub mod infrastructure;

pub use application::presets::Preset;
pub use application::protocol_client::{ClientError, ProtocolClient, Stage};
pub use infrastructure::network::SessionConfig;
pub use pjctl_core::{compose_conditional_sequence, Command, CommandKind, PowerState};
