//! Composition rule for state-dependent command sequences.
//!
//! Several projector settings are only adjustable while a toggle (most
//! notably low latency) is in a particular position; sending them in the
//! wrong state makes the projector silently ignore the command and the read
//! times out.  Toggles are therefore never assumed to be idempotent: the
//! caller reads the current state first and picks the list for that state.
//! By convention the `when_true` list starts with the command that disables
//! the toggle, followed by the rest of the settings.

use crate::registry::command::Command;

/// Returns `when_true` if `current_state` is set, otherwise `when_false`.
///
/// # Examples
///
/// ```rust
/// use pjctl_core::{compose_conditional_sequence, Command};
///
/// let rest = vec![Command::operation("enhance", "seven")];
/// let mut disable_first = vec![Command::operation("low_latency", "off")];
/// disable_first.extend(rest.clone());
///
/// let seq = compose_conditional_sequence(true, &disable_first, &rest);
/// assert_eq!(seq[0], Command::operation("low_latency", "off"));
/// assert_eq!(compose_conditional_sequence(false, &disable_first, &rest), rest);
/// ```
pub fn compose_conditional_sequence(
    current_state: bool,
    when_true: &[Command],
    when_false: &[Command],
) -> Vec<Command> {
    if current_state {
        when_true.to_vec()
    } else {
        when_false.to_vec()
    }
}
