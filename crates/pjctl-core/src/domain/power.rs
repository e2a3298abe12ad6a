//! Power state of the projector.

use std::fmt;

/// Power state reported by the `power_status` query.
///
/// `Unknown` is not a wire value.  It is what callers get when the state
/// could not be read at all (see the best-effort power query in the client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    Standby,
    On,
    Cooling,
    /// Lamp/laser warm-up.
    Reserved,
    Emergency,
    Unknown,
}

impl PowerState {
    /// Decodes the single-digit state code that follows the `PW` ack code.
    ///
    /// Unrecognised codes decode to [`PowerState::Unknown`].
    pub fn from_code(code: &[u8]) -> Self {
        match code {
            b"0" => PowerState::Standby,
            b"1" => PowerState::On,
            b"2" => PowerState::Cooling,
            b"3" => PowerState::Reserved,
            b"4" => PowerState::Emergency,
            _ => PowerState::Unknown,
        }
    }

    /// Returns `true` when the projector is on or warming up.
    pub fn is_on(self) -> bool {
        matches!(self, PowerState::On | PowerState::Reserved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::Standby => "standby",
            PowerState::On => "on",
            PowerState::Cooling => "cooling",
            PowerState::Reserved => "reserved",
            PowerState::Emergency => "emergency",
            PowerState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known_values() {
        assert_eq!(PowerState::from_code(b"0"), PowerState::Standby);
        assert_eq!(PowerState::from_code(b"1"), PowerState::On);
        assert_eq!(PowerState::from_code(b"2"), PowerState::Cooling);
        assert_eq!(PowerState::from_code(b"3"), PowerState::Reserved);
        assert_eq!(PowerState::from_code(b"4"), PowerState::Emergency);
    }

    #[test]
    fn test_from_code_unrecognised_is_unknown() {
        assert_eq!(PowerState::from_code(b"9"), PowerState::Unknown);
        assert_eq!(PowerState::from_code(b""), PowerState::Unknown);
    }

    #[test]
    fn test_is_on_includes_warm_up() {
        assert!(PowerState::On.is_on());
        assert!(PowerState::Reserved.is_on());
        assert!(!PowerState::Standby.is_on());
        assert!(!PowerState::Cooling.is_on());
        assert!(!PowerState::Unknown.is_on());
    }

    #[test]
    fn test_display_uses_lowercase_names() {
        assert_eq!(PowerState::Cooling.to_string(), "cooling");
    }
}
