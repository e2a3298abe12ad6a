//! Application layer use cases for the projector client.
//!
//! - **`protocol_client`** – The entry point for every projector operation.
//!   Resolves commands through the registry, opens short-lived sessions,
//!   and owns the throttle state that spaces commands apart.  This is the
//!   only layer that logs.
//!
//! - **`presets`** – Named picture presets whose command list depends on
//!   the current low-latency state.

pub mod presets;
pub mod protocol_client;
