//! End-to-end tests against a fake projector on a loopback socket.
//!
//! # Purpose
//!
//! The unit tests drive `ProtocolClient` through the scripted in-memory
//! connector.  These tests use the production `TcpConnector` instead, so
//! they also cover socket timeouts, partial reads across real TCP segments,
//! and connection teardown.
//!
//! # The fake projector
//!
//! [`spawn_projector`] binds `127.0.0.1:0` and serves one [`Script`] per
//! accepted connection on a background thread:
//!
//! ```text
//! Client                                Fake projector
//! ──────                                ──────────────
//! connect ───────────────────────────▶ accept
//!              ◀─────────────────────── script.greeting
//! "PJREQ[_credential]" ──────────────▶ recorded
//!              ◀─────────────────────── "PJACK"
//! frame ─────────────────────────────▶ recorded (read up to '\n')
//!              ◀─────────────────────── script.replies[i] (empty = stay silent)
//! close ─────────────────────────────▶ EOF
//! ```
//!
//! The thread returns everything it received so tests can assert on the
//! exact bytes that went over the wire.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pjctl_client::infrastructure::network::transport::TransportError;
use pjctl_client::{ClientError, PowerState, Preset, ProtocolClient, SessionConfig, Stage};
use pjctl_core::protocol::frame::{GREETING, HANDSHAKE_ACK};

const PW_ACK: &[u8] = b"\x06\x89\x01PW\n";
const PM_ACK: &[u8] = b"\x06\x89\x01PM\n";

struct Script {
    greeting: &'static [u8],
    replies: Vec<Vec<u8>>,
}

impl Script {
    fn replying(replies: &[&[u8]]) -> Self {
        Self {
            greeting: GREETING,
            replies: replies.iter().map(|r| r.to_vec()).collect(),
        }
    }
}

fn spawn_projector(sessions: Vec<Script>) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();

    let handle = thread::spawn(move || {
        let mut received = Vec::new();
        for script in sessions {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("set timeout");
            stream.write_all(script.greeting).expect("write greeting");

            if script.greeting == GREETING {
                let mut buf = [0u8; 64];
                let n = stream.read(&mut buf).expect("read request");
                received.push(buf[..n].to_vec());
                stream.write_all(HANDSHAKE_ACK).expect("write PJACK");

                for reply in &script.replies {
                    let Some(frame) = read_line(&mut stream) else {
                        break;
                    };
                    received.push(frame);
                    if !reply.is_empty() {
                        stream.write_all(reply).expect("write reply");
                    }
                }
            }
            drain_until_closed(&mut stream);
        }
        received
    });

    (port, handle)
}

/// Reads one `\n`-terminated frame, or `None` if the client hung up.
fn read_line(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut frame = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {
                frame.push(byte[0]);
                if byte[0] == b'\n' {
                    return Some(frame);
                }
            }
        }
    }
}

fn drain_until_closed(stream: &mut TcpStream) {
    let mut sink = [0u8; 64];
    while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
}

fn client_for(port: u16) -> ProtocolClient {
    ProtocolClient::new(SessionConfig {
        host: "127.0.0.1".to_string(),
        port,
        connect_timeout: Duration::from_secs(5),
        command_timeout: Duration::from_secs(2),
        command_delay: Duration::ZERO,
        ..SessionConfig::default()
    })
}

// ── Happy paths ───────────────────────────────────────────────────────────────

#[test]
fn test_power_on_over_tcp() {
    // Arrange
    let (port, projector) = spawn_projector(vec![Script::replying(&[PW_ACK])]);
    let mut client = client_for(port);

    // Act
    client.power_on().expect("power on");
    drop(client);
    let received = projector.join().expect("projector thread");

    // Assert
    assert_eq!(
        received,
        vec![b"PJREQ".to_vec(), b"!\x89\x01PW1\n".to_vec()]
    );
}

#[test]
fn test_power_status_reads_value_frame() {
    let (port, projector) = spawn_projector(vec![Script::replying(&[
        b"\x06\x89\x01PW\n@\x89\x01PW1\n",
    ])]);
    let mut client = client_for(port);

    let state = client.power_state();

    assert_eq!(state, PowerState::On);
    assert_eq!(projector.join().unwrap()[1], b"?\x89\x01PW\n");
}

#[test]
fn test_credential_is_appended_to_request() {
    let (port, projector) = spawn_projector(vec![Script::replying(&[PW_ACK])]);
    let mut client = ProtocolClient::new(SessionConfig {
        credential: Some("hunter22".to_string()),
        ..client_for(port).config().clone()
    });

    client.power_off().expect("power off");

    assert_eq!(projector.join().unwrap()[0], b"PJREQ_hunter22");
}

#[test]
fn test_preset_reads_state_then_sends_sequence_on_one_connection() {
    // Arrange – low latency is off, so the list without the toggle is sent.
    let commands = Preset::SdrPicture.commands(false);
    let acks: Vec<&[u8]> = vec![PM_ACK; commands.len()];
    let (port, projector) = spawn_projector(vec![
        Script::replying(&[b"\x06\x89\x01PM\n@\x89\x01PMLL0\n"]),
        Script::replying(&acks),
    ]);
    let mut client = client_for(port);

    // Act
    client.apply_preset(Preset::SdrPicture).expect("apply preset");
    drop(client);
    let received = projector.join().unwrap();

    // Assert – query session (2 entries) + request + one frame per command.
    assert_eq!(received.len(), 2 + 1 + commands.len());
    assert_eq!(received[1], b"?\x89\x01PMLL\n");
    assert_eq!(received[3], b"!\x89\x01PMDC1\n");
}

// ── Failure paths ─────────────────────────────────────────────────────────────

#[test]
fn test_bad_greeting_fails_at_handshake_stage() {
    let (port, projector) = spawn_projector(vec![Script {
        greeting: b"PJ_NG",
        replies: Vec::new(),
    }]);
    let mut client = client_for(port);

    let err = client.power_on().unwrap_err();
    drop(client);

    assert_eq!(err.stage(), Stage::Handshake);
    assert!(projector.join().unwrap().is_empty(), "nothing may be sent");
}

#[test]
fn test_closed_port_fails_at_connect_stage() {
    // Arrange – grab a free port, then release it so nothing listens.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut client = client_for(port);

    // Act
    let err = client.power_on().unwrap_err();

    // Assert
    assert_eq!(err.stage(), Stage::Connect);
    assert!(err.is_refused());
}

#[test]
fn test_silent_projector_times_out_as_not_permitted() {
    let (port, projector) = spawn_projector(vec![Script::replying(&[b""])]);
    let mut client = client_for(port);

    let err = client.power_on().unwrap_err();
    drop(client);

    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Timeout)
    ));
    assert_eq!(projector.join().unwrap().len(), 2);
}

#[test]
fn test_wrong_ack_is_rejected() {
    let (port, _projector) = spawn_projector(vec![Script::replying(&[PM_ACK])]);
    let mut client = client_for(port);

    let err = client.power_on().unwrap_err();

    assert!(matches!(
        err,
        ClientError::Transport(TransportError::UnexpectedAck { .. })
    ));
}
