//! Domain entities for pjctl.
//!
//! Typed interpretations of projector state and the rules for composing
//! state-dependent command sequences.  Like the rest of this crate, nothing
//! here touches a socket.

/// Projector power state decoded from a `power_status` response.
pub mod power;

/// Branch rule for composite "mode" sequences.
pub mod sequence;
