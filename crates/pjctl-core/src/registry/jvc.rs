//! Built-in command table for JVC D-ILA projectors (NX/NZ series).
//!
//! Each entry pairs a command code with the ack code the projector echoes and
//! the named parameter values it accepts.  Any entry can also be sent as a
//! reference query, in which case the body is the bare command code.

use super::command::{Command, CommandSpec};
use super::{CommandRegistry, RegistryError};
use crate::protocol::frame::CommandKind;

const POWER_ACK: &str = "PW";
const INPUT_ACK: &str = "IP";
const PICTURE_ACK: &str = "PM";
const HDMI_ACK: &str = "IS";
const LENS_ACK: &str = "IN";
const REMOTE_ACK: &str = "RC";

type Values = &'static [(&'static str, &'static str)];

struct Entry {
    name: &'static str,
    code: &'static str,
    ack_code: &'static str,
    values: Values,
    /// Query-only entries are resolved for reference commands but are not
    /// listed as user-facing commands.
    query_only: bool,
}

const fn entry(
    name: &'static str,
    code: &'static str,
    ack_code: &'static str,
    values: Values,
) -> Entry {
    Entry {
        name,
        code,
        ack_code,
        values,
        query_only: false,
    }
}

const fn query(name: &'static str, code: &'static str, ack_code: &'static str) -> Entry {
    Entry {
        name,
        code,
        ack_code,
        values: &[],
        query_only: true,
    }
}

const ON_OFF: Values = &[("off", "0"), ("on", "1")];

static TABLE: &[Entry] = &[
    entry("power", "PW", POWER_ACK, ON_OFF),
    entry("input", "IP", INPUT_ACK, &[("hdmi1", "6"), ("hdmi2", "7")]),
    entry(
        "picture_mode",
        "PMPM",
        PICTURE_ACK,
        &[
            ("film", "00"),
            ("cinema", "01"),
            ("natural", "03"),
            ("hdr10", "04"),
            ("thx", "06"),
            ("frame_adapt_hdr", "0B"),
            ("user1", "0C"),
            ("user2", "0D"),
            ("user3", "0E"),
            ("user4", "0F"),
            ("user5", "10"),
            ("user6", "11"),
            ("hlg", "14"),
            ("hdr10_plus", "15"),
            ("pana_pq", "16"),
            ("filmmaker", "17"),
            ("frame_adapt_hdr2", "18"),
            ("frame_adapt_hdr3", "19"),
        ],
    ),
    entry("low_latency", "PMLL", PICTURE_ACK, ON_OFF),
    entry(
        "enhance",
        "PMEN",
        PICTURE_ACK,
        &[
            ("zero", "0"),
            ("one", "1"),
            ("two", "2"),
            ("three", "3"),
            ("four", "4"),
            ("five", "5"),
            ("six", "6"),
            ("seven", "7"),
            ("eight", "8"),
            ("nine", "9"),
            ("ten", "A"),
        ],
    ),
    entry(
        "motion_enhance",
        "PMME",
        PICTURE_ACK,
        &[("off", "0"), ("low", "1"), ("high", "2")],
    ),
    entry(
        "graphic_mode",
        "PMGM",
        PICTURE_ACK,
        &[("standard", "0"), ("hires1", "1"), ("hires2", "2")],
    ),
    entry(
        "laser_dim",
        "PMDC",
        PICTURE_ACK,
        &[("off", "0"), ("auto1", "1"), ("auto2", "2"), ("auto3", "3")],
    ),
    entry(
        "laser_power",
        "PMLP",
        PICTURE_ACK,
        &[("low", "0"), ("high", "1"), ("med", "2")],
    ),
    entry(
        "aperture",
        "PMAP",
        PICTURE_ACK,
        &[("off", "0"), ("auto1", "1"), ("auto2", "2")],
    ),
    entry("mask", "ISMA", HDMI_ACK, &[("on", "1"), ("off", "2")]),
    entry(
        "anamorphic",
        "INVS",
        LENS_ACK,
        &[("off", "0"), ("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")],
    ),
    entry(
        "installation_mode",
        "INML",
        LENS_ACK,
        &[
            ("mode1", "0"),
            ("mode2", "1"),
            ("mode3", "2"),
            ("mode4", "3"),
            ("mode5", "4"),
            ("mode6", "5"),
            ("mode7", "6"),
            ("mode8", "7"),
            ("mode9", "8"),
            ("mode10", "9"),
        ],
    ),
    entry(
        "remote",
        "RC73",
        REMOTE_ACK,
        &[
            ("menu", "2E"),
            ("up", "01"),
            ("down", "02"),
            ("left", "36"),
            ("right", "34"),
            ("ok", "2F"),
            ("back", "03"),
            ("hide", "1D"),
            ("lens_control", "30"),
            ("info", "74"),
        ],
    ),
    query("power_status", "PW", POWER_ACK),
    query("current_output", "IP", INPUT_ACK),
];

/// The built-in JVC command table.
#[derive(Debug, Clone, Copy, Default)]
pub struct JvcRegistry;

impl JvcRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Returns the user-facing command names, sorted.
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = TABLE
            .iter()
            .filter(|e| !e.query_only)
            .map(|e| e.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the value names accepted by `name`, in table order.
    pub fn value_names(&self, name: &str) -> Option<Vec<&'static str>> {
        find(name).map(|e| e.values.iter().map(|(value, _)| *value).collect())
    }
}

impl CommandRegistry for JvcRegistry {
    fn lookup(&self, command: &Command) -> Result<CommandSpec, RegistryError> {
        let unknown = || RegistryError::UnknownCommand {
            name: command.name.clone(),
            value: command.value.clone(),
        };

        let entry = find(&command.name).ok_or_else(unknown)?;

        let param = match command.kind {
            CommandKind::Reference => Vec::new(),
            CommandKind::Operation => entry
                .values
                .iter()
                .find(|(value, _)| *value == command.value)
                .map(|(_, code)| code.as_bytes().to_vec())
                .ok_or_else(unknown)?,
        };

        Ok(CommandSpec {
            code: entry.code.as_bytes().to_vec(),
            param,
            kind: command.kind,
            ack_code: entry.ack_code.as_bytes().to_vec(),
        })
    }
}

fn find(name: &str) -> Option<&'static Entry> {
    TABLE.iter().find(|e| e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_power_on() {
        // Arrange
        let registry = JvcRegistry::new();

        // Act
        let spec = registry.lookup(&Command::operation("power", "on")).unwrap();

        // Assert
        assert_eq!(spec.frame(), b"!\x89\x01PW1\n");
        assert_eq!(spec.expected_ack(), b"\x06\x89\x01PW\n");
    }

    #[test]
    fn test_lookup_picture_mode_uses_two_digit_param() {
        let spec = JvcRegistry
            .lookup(&Command::operation("picture_mode", "frame_adapt_hdr"))
            .unwrap();
        assert_eq!(spec.body(), b"PMPM0B");
        assert_eq!(spec.ack_code, b"PM");
    }

    #[test]
    fn test_lookup_reference_has_bare_code_body() {
        let spec = JvcRegistry
            .lookup(&Command::reference("low_latency"))
            .unwrap();
        assert_eq!(spec.frame(), b"?\x89\x01PMLL\n");
        assert!(spec.param.is_empty());
    }

    #[test]
    fn test_lookup_info_key() {
        let spec = JvcRegistry
            .lookup(&Command::operation("remote", "info"))
            .unwrap();
        assert_eq!(spec.body(), b"RC7374");
        assert_eq!(spec.ack_code, b"RC");
    }

    #[test]
    fn test_lookup_unknown_name_returns_error() {
        let result = JvcRegistry.lookup(&Command::operation("teleport", "on"));
        assert_eq!(
            result,
            Err(RegistryError::UnknownCommand {
                name: "teleport".into(),
                value: "on".into()
            })
        );
    }

    #[test]
    fn test_lookup_unknown_value_returns_error() {
        let result = JvcRegistry.lookup(&Command::operation("power", "sideways"));
        assert!(matches!(result, Err(RegistryError::UnknownCommand { .. })));
    }

    #[test]
    fn test_query_only_entry_rejects_operations() {
        let result = JvcRegistry.lookup(&Command::operation("power_status", "on"));
        assert!(result.is_err());
        assert!(JvcRegistry.lookup(&Command::reference("power_status")).is_ok());
    }

    #[test]
    fn test_command_names_are_sorted_and_hide_queries() {
        let names = JvcRegistry.command_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"power"));
        assert!(!names.contains(&"power_status"));
    }

    #[test]
    fn test_value_names_for_low_latency() {
        assert_eq!(JvcRegistry.value_names("low_latency"), Some(vec!["off", "on"]));
        assert_eq!(JvcRegistry.value_names("nope"), None);
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<_> = TABLE.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TABLE.len());
    }
}
