//! Command registry: maps human-readable command names to wire bytes.
//!
//! The protocol engine never hard-codes a command.  It asks a
//! [`CommandRegistry`] to resolve a [`Command`] (`"picture_mode"`, `"hdr10"`)
//! into a [`CommandSpec`] (`PMPM` + `04`, ack code `PM`).  Keeping the table
//! behind a trait isolates the protocol logic from the (large, data-only)
//! command table, and lets tests substitute a tiny registry.

pub mod command;
pub mod jvc;

use thiserror::Error;

use self::command::{Command, CommandSpec};

/// Errors returned by a [`CommandRegistry`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// `name` is not registered, or `value` is not a valid option for `name`.
    #[error("unknown command: {name},{value}")]
    UnknownCommand { name: String, value: String },
}

/// Resolves commands into their wire encoding.
pub trait CommandRegistry: Send + Sync {
    /// Looks up the encoding and expected ack code of `command`.
    ///
    /// For [`crate::CommandKind::Reference`] commands the value is ignored;
    /// the query body is the bare command code.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownCommand`] if the name or value is not
    /// in the table.
    fn lookup(&self, command: &Command) -> Result<CommandSpec, RegistryError>;
}
