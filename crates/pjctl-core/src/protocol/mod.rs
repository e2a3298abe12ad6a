//! Protocol module containing the wire constants and the frame codec.

pub mod frame;

pub use frame::{
    decode_command, encode_command, expected_ack, request_token, strip_known_markers,
    CommandKind, Frame, FrameError,
};
