//! Named picture presets.
//!
//! Each preset is two command lists.  Which one is sent depends on whether
//! low latency is currently enabled: picture settings such as laser dimming
//! are locked while low latency is on, so the "on" list for the picture
//! presets starts by switching it off, and the gaming presets skip the
//! settings that would require it to be off.

use std::fmt;
use std::str::FromStr;

use pjctl_core::{compose_conditional_sequence, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    GamingHdr,
    GamingSdr,
    HdrPicture,
    SdrPicture,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::GamingHdr,
        Preset::GamingSdr,
        Preset::HdrPicture,
        Preset::SdrPicture,
    ];

    /// The name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Preset::GamingHdr => "gaming-hdr",
            Preset::GamingSdr => "gaming-sdr",
            Preset::HdrPicture => "hdr-picture",
            Preset::SdrPicture => "sdr-picture",
        }
    }

    /// Returns the commands to send given the current low-latency state.
    pub fn commands(self, low_latency_on: bool) -> Vec<Command> {
        let (when_on, when_off) = self.branches();
        compose_conditional_sequence(low_latency_on, &when_on, &when_off)
    }

    fn branches(self) -> (Vec<Command>, Vec<Command>) {
        match self {
            Preset::GamingHdr => (
                vec![
                    op("picture_mode", "hdr10"),
                    op("enhance", "seven"),
                    op("motion_enhance", "off"),
                    op("graphic_mode", "hires1"),
                ],
                vec![
                    op("picture_mode", "hdr10"),
                    op("laser_dim", "off"),
                    op("low_latency", "on"),
                    op("enhance", "seven"),
                    op("motion_enhance", "off"),
                    op("graphic_mode", "hires1"),
                ],
            ),
            Preset::GamingSdr => (
                vec![
                    op("enhance", "seven"),
                    op("motion_enhance", "off"),
                    op("graphic_mode", "hires1"),
                ],
                vec![
                    op("laser_dim", "off"),
                    op("low_latency", "on"),
                    op("enhance", "seven"),
                    op("motion_enhance", "off"),
                    op("graphic_mode", "hires1"),
                ],
            ),
            Preset::HdrPicture => with_low_latency_disabled(vec![
                op("picture_mode", "frame_adapt_hdr"),
                op("laser_dim", "auto1"),
                op("enhance", "seven"),
                op("motion_enhance", "low"),
                op("graphic_mode", "hires1"),
            ]),
            Preset::SdrPicture => with_low_latency_disabled(vec![
                op("laser_dim", "auto1"),
                op("enhance", "seven"),
                op("motion_enhance", "low"),
                op("graphic_mode", "hires1"),
            ]),
        }
    }
}

fn op(name: &str, value: &str) -> Command {
    Command::operation(name, value)
}

/// Builds `(["low_latency,off", ..rest], rest)`.
fn with_low_latency_disabled(rest: Vec<Command>) -> (Vec<Command>, Vec<Command>) {
    let mut when_on = Vec::with_capacity(rest.len() + 1);
    when_on.push(op("low_latency", "off"));
    when_on.extend(rest.iter().cloned());
    (when_on, rest)
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pjctl_core::{CommandRegistry, JvcRegistry};

    #[test]
    fn test_from_str_round_trips_every_name() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>(), Ok(preset));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown_name() {
        let err = "cinema".parse::<Preset>().unwrap_err();
        assert!(err.contains("gaming-hdr"));
    }

    #[test]
    fn test_picture_presets_disable_low_latency_first_when_on() {
        // Arrange / Act
        let on = Preset::HdrPicture.commands(true);
        let off = Preset::HdrPicture.commands(false);

        // Assert
        assert_eq!(on[0], Command::operation("low_latency", "off"));
        assert_eq!(&on[1..], off.as_slice());
    }

    #[test]
    fn test_sdr_picture_branches_differ_only_by_leading_toggle() {
        let on = Preset::SdrPicture.commands(true);
        let off = Preset::SdrPicture.commands(false);
        assert_eq!(on.len(), off.len() + 1);
        assert_eq!(&on[1..], off.as_slice());
    }

    #[test]
    fn test_gaming_hdr_enables_low_latency_only_when_off() {
        let on = Preset::GamingHdr.commands(true);
        let off = Preset::GamingHdr.commands(false);

        let enable = Command::operation("low_latency", "on");
        assert!(!on.contains(&enable));
        assert!(off.contains(&enable));
        assert_eq!(off[0], Command::operation("picture_mode", "hdr10"));
    }

    #[test]
    fn test_gaming_sdr_off_branch_dims_laser_before_low_latency() {
        let off = Preset::GamingSdr.commands(false);
        assert_eq!(off[0], Command::operation("laser_dim", "off"));
        assert_eq!(off[1], Command::operation("low_latency", "on"));
    }

    #[test]
    fn test_every_preset_command_is_registered() {
        let registry = JvcRegistry::new();
        for preset in Preset::ALL {
            for state in [true, false] {
                for command in preset.commands(state) {
                    assert!(
                        registry.lookup(&command).is_ok(),
                        "{preset}: {command} is not in the registry"
                    );
                }
            }
        }
    }
}
