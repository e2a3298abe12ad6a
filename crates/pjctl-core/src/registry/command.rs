//! Command value objects.

use std::fmt;

use crate::protocol::frame::{self, CommandKind};

/// A semantic command: a name, a value name, and the command class.
///
/// Commands are plain values.  They carry no socket or session reference and
/// can be built, cloned, and stored in preset lists freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    pub name: String,
    pub value: String,
    pub kind: CommandKind,
}

impl Command {
    /// Creates an operation command such as `power,on`.
    pub fn operation(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: CommandKind::Operation,
        }
    }

    /// Creates a reference (query) command such as `power_status`.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            kind: CommandKind::Reference,
        }
    }

    /// Parses the `"name,value"` form used on the command line.
    ///
    /// Whitespace around both parts is ignored, so `"enhance, seven"` works.
    /// Returns `None` if there is no comma.
    pub fn parse_operation(raw: &str) -> Option<Self> {
        let (name, value) = raw.split_once(',')?;
        Some(Self::operation(name.trim(), value.trim()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CommandKind::Operation => write!(f, "{},{}", self.name, self.value),
            CommandKind::Reference => write!(f, "{}?", self.name),
        }
    }
}

/// The resolved encoding of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command code, e.g. `PMLL`.
    pub code: Vec<u8>,
    /// Parameter code, e.g. `1`.  Empty for reference commands.
    pub param: Vec<u8>,
    pub kind: CommandKind,
    /// Code echoed inside the ack frame, e.g. `PM`.
    pub ack_code: Vec<u8>,
}

impl CommandSpec {
    /// Returns `code ++ param`, the frame body.
    pub fn body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.code.len() + self.param.len());
        body.extend_from_slice(&self.code);
        body.extend_from_slice(&self.param);
        body
    }

    /// Returns the complete request frame.
    pub fn frame(&self) -> Vec<u8> {
        frame::encode_command(self.kind.marker(), &frame::UNIT_ADDRESS, &self.body())
    }

    /// Returns the ack frame the projector must echo for this command.
    pub fn expected_ack(&self) -> Vec<u8> {
        frame::expected_ack(frame::ACK_PREFIX, &frame::UNIT_ADDRESS, &self.ack_code)
    }
}
