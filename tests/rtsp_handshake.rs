//! Black-box RTSP handshake coverage: a real `RtspSession` driven over a
//! loopback TCP connection, exercising OPTIONS -> DESCRIBE -> SETUP without
//! touching the replay engine (PLAY needs a real CAN interface; covered
//! separately in `replay_pacing.rs`).

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use logplayer::emitter::FrameType;
use logplayer::rtsp::{RtspSession, SessionConfig};

fn test_config() -> SessionConfig {
    SessionConfig {
        bind_addr: "127.0.0.1".into(),
        rtp_log_path: PathBuf::from("unused.bin"),
        can_log_path: PathBuf::from("unused.txt"),
        can_device: "vcan0".into(),
        can_frame_type: FrameType::Std,
        rewind: false,
    }
}

fn read_response(stream: &mut TcpStream) -> String {
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf).unwrap();
    String::from_utf8_lossy(&buf[..n]).into_owned()
}

#[test]
fn options_describe_setup_round_trip_over_loopback_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server_thread = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut session = RtspSession::new(stream, "127.0.0.1".into(), test_config());
        session.run();
    });

    let mut client = TcpStream::connect(addr).unwrap();

    client.write_all(b"OPTIONS rtsp://127.0.0.1/ RTSP/1.0\r\nCSeq: 1\r\n\r\n").unwrap();
    let resp = read_response(&mut client);
    assert!(resp.starts_with("RTSP/1.0 200 OK"));
    assert!(resp.contains("CSeq: 1"));
    assert!(resp.contains("SETUP"));

    client.write_all(b"DESCRIBE rtsp://127.0.0.1/ RTSP/1.0\r\nCSeq: 2\r\n\r\n").unwrap();
    let resp = read_response(&mut client);
    assert!(resp.starts_with("RTSP/1.0 200 OK"));
    assert!(resp.contains("CSeq: 2"));
    assert!(resp.contains("application/sdp"));
    assert!(resp.contains("m=video 0 RTP/AVP 98"));

    client
        .write_all(
            b"SETUP rtsp://127.0.0.1/trackID=1 RTSP/1.0\r\nCSeq: 3\r\n\
              Transport: RTP/AVP;unicast;client_port=7000-7001\r\n\r\n",
        )
        .unwrap();
    let resp = read_response(&mut client);
    assert!(resp.starts_with("RTSP/1.0 200 OK"));
    assert!(resp.contains("CSeq: 3"));
    assert!(resp.contains("Session:"));
    assert!(resp.contains("client_port=7000-7001"));

    drop(client);
    server_thread.join().unwrap();
}
