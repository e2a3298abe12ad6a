//! # pjctl-core
//!
//! Shared library for pjctl containing the wire codec, the command model, and
//! the static command table for JVC D-ILA projectors.
//!
//! This crate has zero dependencies on network sockets, clocks, or logging.
//! Everything here is pure data transformation, so it can be unit-tested
//! without a projector on the network.
//!
//! # Architecture overview (for beginners)
//!
//! A JVC projector exposes a serial-style control protocol over a raw TCP
//! socket (port 20554 by default).  Every command is a short byte frame:
//!
//! ```text
//! [type:1][unit:2][body:N][footer:1]
//!   '!'    89 01   "PW1"    '\n'      <- "power on"
//! ```
//!
//! The projector answers every accepted command with an *ack* frame that
//! echoes a short ack code.  Query-style ("reference") commands are followed by
//! a second frame carrying the requested value.
//!
//! This crate defines:
//!
//! - **`protocol`** – The byte-level frame layout: encoding requests, computing
//!   the ack the projector must echo, decoding frames, and stripping the fixed
//!   markers off a response so only the value remains.
//!
//! - **`registry`** – The mapping from human-readable names (`"power"`,
//!   `"on"`) to command bytes and ack codes, behind the [`CommandRegistry`]
//!   trait.  [`JvcRegistry`] is the built-in table.
//!
//! - **`domain`** – Typed interpretations of device state ([`PowerState`]) and
//!   the branch rule used by composite "mode" sequences.

pub mod domain;
pub mod protocol;
pub mod registry;

// Re-export the most-used types at the crate root so callers can write
// `pjctl_core::Command` instead of `pjctl_core::registry::command::Command`.
pub use domain::power::PowerState;
pub use domain::sequence::compose_conditional_sequence;
pub use protocol::frame::{
    decode_command, encode_command, expected_ack, request_token, strip_known_markers,
    CommandKind, Frame, FrameError,
};
pub use registry::command::{Command, CommandSpec};
pub use registry::jvc::JvcRegistry;
pub use registry::{CommandRegistry, RegistryError};
