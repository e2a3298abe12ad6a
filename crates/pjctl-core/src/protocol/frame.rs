//! Frame codec for the JVC projector control protocol.
//!
//! Wire format:
//! ```text
//! request:  [type:1][unit:2][body:N][footer:1]      type = '!' or '?'
//! ack:      [0x06][unit:2][ack_code:M][footer:1]
//! response: ['@'][unit:2][value:K][footer:1]        reference commands only
//! ```
//!
//! There is no length prefix anywhere in the protocol.  The reader must know
//! how many bytes to expect before it reads, which is why every command is
//! paired with the exact ack it should produce (see [`expected_ack`]).
//!
//! Every function in this module is pure: no I/O, no clocks, no logging.

use thiserror::Error;

// ── Wire constants ────────────────────────────────────────────────────────────

/// Marks a fire-and-forget command that is answered with an ack only.
pub const OPERATION: u8 = b'!';

/// Marks a query command that is answered with an ack followed by a value.
pub const REFERENCE: u8 = b'?';

/// Marks the value frame that follows the ack of a reference command.
pub const RESPONSE: u8 = b'@';

/// First byte of every ack frame.
pub const ACK_PREFIX: u8 = 0x06;

/// Projector unit address.  JVC projectors always answer as unit `89 01`.
pub const UNIT_ADDRESS: [u8; 2] = [0x89, 0x01];

/// Terminates every frame.
pub const FOOTER: u8 = b'\n';

/// Sent by the projector as soon as a TCP connection is accepted.
pub const GREETING: &[u8] = b"PJ_OK";

/// Sent by the client in reply to [`GREETING`].
pub const REQUEST: &[u8] = b"PJREQ";

/// Sent by the projector once it accepts [`REQUEST`].
pub const HANDSHAKE_ACK: &[u8] = b"PJACK";

/// Smallest possible frame: type + unit address + footer with an empty body.
pub const MIN_FRAME_LEN: usize = 1 + UNIT_ADDRESS.len() + 1;

/// Every fixed marker sequence that can appear around a value.
const MARKERS: [&[u8]; 6] = [
    &[OPERATION],
    &[REFERENCE],
    &[RESPONSE],
    &[ACK_PREFIX],
    &UNIT_ADDRESS,
    &[FOOTER],
];

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The byte slice is shorter than the smallest valid frame.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    TooShort { needed: usize, available: usize },

    /// The first byte is neither the operation nor the reference marker.
    #[error("unknown command type: 0x{0:02X}")]
    UnknownCommandType(u8),

    /// The last byte is not the frame footer.
    #[error("missing footer: last byte is 0x{0:02X}")]
    MissingFooter(u8),
}

/// The two command classes.
///
/// The class decides the response shape: an operation is answered with an
/// ack only, a reference with an ack followed by a value frame.  The reader
/// must know the class before reading because nothing on the wire says which
/// shape is coming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Operation,
    Reference,
}

impl CommandKind {
    /// Returns the leading marker byte for this command class.
    pub fn marker(self) -> u8 {
        match self {
            CommandKind::Operation => OPERATION,
            CommandKind::Reference => REFERENCE,
        }
    }
}

impl TryFrom<u8> for CommandKind {
    type Error = FrameError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            OPERATION => Ok(CommandKind::Operation),
            REFERENCE => Ok(CommandKind::Reference),
            other => Err(FrameError::UnknownCommandType(other)),
        }
    }
}

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: CommandKind,
    pub unit_address: [u8; 2],
    pub body: Vec<u8>,
}

impl Frame {
    /// Creates a frame addressed to the standard projector unit.
    pub fn new(kind: CommandKind, body: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            unit_address: UNIT_ADDRESS,
            body: body.into(),
        }
    }

    /// Encodes this frame into wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        encode_command(self.kind.marker(), &self.unit_address, &self.body)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Builds a request frame: `command_type ++ unit_address ++ body ++ footer`.
///
/// The returned buffer is allocated once at its final size, so the caller
/// always has a complete frame before anything touches the socket.
///
/// # Examples
///
/// ```rust
/// use pjctl_core::protocol::frame::{encode_command, OPERATION, UNIT_ADDRESS};
///
/// let bytes = encode_command(OPERATION, &UNIT_ADDRESS, b"PW1");
/// assert_eq!(bytes, b"!\x89\x01PW1\n");
/// ```
pub fn encode_command(command_type: u8, unit_address: &[u8], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + unit_address.len() + body.len() + 1);
    buf.push(command_type);
    buf.extend_from_slice(unit_address);
    buf.extend_from_slice(body);
    buf.push(FOOTER);
    buf
}

/// Builds the ack frame the projector must echo for a command:
/// `ack_prefix ++ unit_address ++ ack_code ++ footer`.
///
/// # Examples
///
/// ```rust
/// use pjctl_core::protocol::frame::{expected_ack, ACK_PREFIX, UNIT_ADDRESS};
///
/// let ack = expected_ack(ACK_PREFIX, &UNIT_ADDRESS, b"PW");
/// assert_eq!(ack, b"\x06\x89\x01PW\n");
/// ```
pub fn expected_ack(ack_prefix: u8, unit_address: &[u8], ack_code: &[u8]) -> Vec<u8> {
    encode_command(ack_prefix, unit_address, ack_code)
}

/// Decodes a request frame produced by [`encode_command`].
///
/// # Errors
///
/// Returns [`FrameError`] if the slice is too short, starts with an unknown
/// command type, or does not end with the footer.
pub fn decode_command(bytes: &[u8]) -> Result<Frame, FrameError> {
    if bytes.len() < MIN_FRAME_LEN {
        return Err(FrameError::TooShort {
            needed: MIN_FRAME_LEN,
            available: bytes.len(),
        });
    }

    let kind = CommandKind::try_from(bytes[0])?;

    let last = bytes[bytes.len() - 1];
    if last != FOOTER {
        return Err(FrameError::MissingFooter(last));
    }

    Ok(Frame {
        kind,
        unit_address: [bytes[1], bytes[2]],
        body: bytes[3..bytes.len() - 1].to_vec(),
    })
}

/// Removes every known header and footer sequence from `buffer`.
///
/// Used to reduce a reference response such as `@\x89\x01PW1\n` to its
/// value `PW1`.  Removal repeats until no marker remains, so the result is a
/// fixpoint: stripping it again returns the same bytes.
pub fn strip_known_markers(buffer: &[u8]) -> Vec<u8> {
    let mut current = buffer.to_vec();
    loop {
        let before = current.len();
        for marker in MARKERS {
            current = remove_all(&current, marker);
        }
        if current.len() == before {
            return current;
        }
    }
}

/// Returns the handshake request token, suffixed with `_<credential>` when a
/// pre-shared credential is configured (NZ series models).
pub fn request_token(credential: Option<&str>) -> Vec<u8> {
    let mut token = REQUEST.to_vec();
    if let Some(credential) = credential {
        token.push(b'_');
        token.extend_from_slice(credential.as_bytes());
    }
    token
}

fn remove_all(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── encode_command ────────────────────────────────────────────────────────

    #[test]
    fn test_encode_power_on_matches_wire_bytes() {
        // Arrange / Act
        let bytes = encode_command(OPERATION, &UNIT_ADDRESS, b"PW1");

        // Assert
        assert_eq!(bytes, vec![0x21, 0x89, 0x01, b'P', b'W', b'1', 0x0A]);
    }

    #[test]
    fn test_encode_reference_query_has_question_mark_marker() {
        let bytes = Frame::new(CommandKind::Reference, b"PW".to_vec()).encode();
        assert_eq!(bytes, b"?\x89\x01PW\n");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode_command(OPERATION, &UNIT_ADDRESS, b"PMPM04");
        let b = encode_command(OPERATION, &UNIT_ADDRESS, b"PMPM04");
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_empty_body_is_min_frame_len() {
        let bytes = encode_command(OPERATION, &UNIT_ADDRESS, b"");
        assert_eq!(bytes.len(), MIN_FRAME_LEN);
    }

    // ── expected_ack ──────────────────────────────────────────────────────────

    #[test]
    fn test_expected_ack_for_picture_commands() {
        let ack = expected_ack(ACK_PREFIX, &UNIT_ADDRESS, b"PM");
        assert_eq!(ack, b"\x06\x89\x01PM\n");
    }

    // ── decode_command ────────────────────────────────────────────────────────

    #[test]
    fn test_decode_round_trips_operation() {
        // Arrange
        let original = Frame::new(CommandKind::Operation, b"PMLL1".to_vec());

        // Act
        let decoded = decode_command(&original.encode()).unwrap();

        // Assert
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_body_containing_footer_byte_round_trips() {
        let original = Frame::new(CommandKind::Reference, b"A\nB".to_vec());
        assert_eq!(decode_command(&original.encode()).unwrap(), original);
    }

    #[test]
    fn test_decode_empty_returns_too_short() {
        let result = decode_command(&[]);
        assert!(matches!(result, Err(FrameError::TooShort { needed: 4, available: 0 })));
    }

    #[test]
    fn test_decode_unknown_type_returns_error() {
        let result = decode_command(b"#\x89\x01PW\n");
        assert_eq!(result, Err(FrameError::UnknownCommandType(b'#')));
    }

    #[test]
    fn test_decode_ack_frame_is_not_a_command() {
        // Acks start with 0x06, which is not a command marker.
        let result = decode_command(b"\x06\x89\x01PW\n");
        assert_eq!(result, Err(FrameError::UnknownCommandType(ACK_PREFIX)));
    }

    #[test]
    fn test_decode_missing_footer_returns_error() {
        let result = decode_command(b"!\x89\x01PW1");
        assert_eq!(result, Err(FrameError::MissingFooter(b'1')));
    }

    // ── strip_known_markers ───────────────────────────────────────────────────

    #[test]
    fn test_strip_power_response_leaves_value() {
        // Arrange
        let response = b"@\x89\x01PW1\n";

        // Act
        let clean = strip_known_markers(response);

        // Assert
        assert_eq!(clean, b"PW1");
    }

    #[test]
    fn test_strip_ack_and_response_together() {
        let raw = b"\x06\x89\x01PM\n@\x89\x01PM0\n";
        assert_eq!(strip_known_markers(raw), b"PMPM0");
    }

    #[test]
    fn test_strip_removes_markers_exposed_by_earlier_removal() {
        // Removing the inner "89 01" joins the outer 0x89 and 0x01 into a new
        // unit address sequence, which must also go.
        let raw = [0x89, 0x89, 0x01, 0x01, b'X'];
        let once = strip_known_markers(&raw);
        assert_eq!(once, b"X");
        assert_eq!(strip_known_markers(&once), once);
    }

    #[test]
    fn test_strip_is_idempotent_on_plain_values() {
        let once = strip_known_markers(b"PMPM0B");
        assert_eq!(strip_known_markers(&once), once);
    }

    #[test]
    fn test_strip_empty_buffer_is_empty() {
        assert!(strip_known_markers(&[]).is_empty());
    }

    // ── request_token / CommandKind ───────────────────────────────────────────

    #[test]
    fn test_request_token_without_credential() {
        assert_eq!(request_token(None), b"PJREQ");
    }

    #[test]
    fn test_request_token_with_credential_appends_underscore_suffix() {
        assert_eq!(request_token(Some("secret99")), b"PJREQ_secret99");
    }

    #[test]
    fn test_command_kind_marker_round_trips_through_try_from() {
        for kind in [CommandKind::Operation, CommandKind::Reference] {
            assert_eq!(CommandKind::try_from(kind.marker()), Ok(kind));
        }
    }
}
