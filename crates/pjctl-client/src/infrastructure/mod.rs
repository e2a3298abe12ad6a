//! Infrastructure layer for the client.
//!
//! Contains everything that touches the outside world: TCP sockets, the
//! wall clock, and the configuration file.
//!
//! **Dependency rule**: this layer may depend on `pjctl_core`, but MUST NOT
//! import from `application`.
//!
//! # Sub-modules
//!
//! - **`network`** – Connector and channel abstractions over `TcpStream`, the
//!   3-way handshake that produces a [`network::handshake::Session`], the
//!   per-command transport, and the throttle gate.  A scripted in-memory
//!   connector is provided in `network::mock` for tests.
//!
//! - **`storage`** – TOML configuration persistence.

pub mod network;
pub mod storage;
