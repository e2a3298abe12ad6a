//! Storage infrastructure: the `pjctl` configuration file.
//!
//! The `config` sub-module reads and writes the TOML file that holds the
//! projector address, timeouts, the optional NZ-series credential, and the
//! default log level.  A missing file is not an error; every field has a
//! default so first runs work without any setup.

pub mod config;
