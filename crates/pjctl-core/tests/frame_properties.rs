//! Integration tests for the pjctl-core frame codec.
//!
//! These tests exercise the public API as the client crate uses it: resolve a
//! command through the registry, encode it, and check the properties the
//! transport relies on (round-trip stability and strip idempotence).

use pjctl_core::{
    decode_command, encode_command, strip_known_markers,
    protocol::frame::{ACK_PREFIX, FOOTER, RESPONSE, UNIT_ADDRESS},
    Command, CommandKind, CommandRegistry, Frame, JvcRegistry,
};
use proptest::prelude::*;

/// Byte strategy biased towards the protocol markers so adjacency cases
/// show up often.
fn marker_heavy_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    let alphabet = vec![b'!', b'?', b'@', ACK_PREFIX, 0x89, 0x01, FOOTER, b'P', b'W', b'1'];
    let byte = prop_oneof![
        4 => prop::sample::select(alphabet),
        1 => any::<u8>(),
    ];
    prop::collection::vec(byte, 0..=max_len)
}

fn command_kind() -> impl Strategy<Value = CommandKind> {
    prop_oneof![Just(CommandKind::Operation), Just(CommandKind::Reference)]
}

proptest! {
    /// Decoding an encoded frame yields the same kind, address and body.
    #[test]
    fn prop_frame_round_trips(body in marker_heavy_bytes(32), kind in command_kind()) {
        let bytes = encode_command(kind.marker(), &UNIT_ADDRESS, &body);
        let decoded = decode_command(&bytes);
        prop_assert_eq!(
            decoded,
            Ok(Frame { kind, unit_address: UNIT_ADDRESS, body })
        );
    }

    /// Stripping an already stripped buffer changes nothing.
    #[test]
    fn prop_strip_is_idempotent(buffer in marker_heavy_bytes(48)) {
        let once = strip_known_markers(&buffer);
        prop_assert_eq!(strip_known_markers(&once), once);
    }
}

#[test]
fn test_every_registered_command_encodes_a_decodable_frame() {
    let registry = JvcRegistry::new();
    for name in registry.command_names() {
        for value in registry.value_names(name).unwrap_or_default() {
            let spec = registry
                .lookup(&Command::operation(name, value))
                .expect("listed command must resolve");
            let frame = decode_command(&spec.frame()).expect("frame must decode");
            assert_eq!(frame.kind, CommandKind::Operation);
            assert_eq!(frame.body, spec.body());
        }
    }
}

#[test]
fn test_power_response_reduces_to_state_code() {
    let response = [&[RESPONSE][..], &UNIT_ADDRESS, b"PW1", &[FOOTER]].concat();
    let clean = strip_known_markers(&response);
    assert_eq!(clean.strip_prefix(b"PW".as_slice()), Some(&b"1"[..]));
}
