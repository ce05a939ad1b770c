//! Black-box coverage of the replay scheduler: a real `ReplayEngine` reading
//! temp log files and emitting RTP over a loopback UDP socket, timed against
//! the recorded inter-arrival gaps.
//!
//! The CAN side of the engine always opens a real CAN socket, so these tests
//! skip (rather than fail) when `vcan0` isn't present in the environment —
//! the RTSP handshake and merge reader tests cover the rest of the stack
//! without that dependency.

use std::fs::File;
use std::io::Write;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

use logplayer::emitter::FrameType;
use logplayer::replay::{ReplayConfig, ReplayEngine};

fn write_binary_log(path: &std::path::Path, packets: &[(u64, u64, u16, &[u8])]) {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"ELOG");
    buf.extend_from_slice(&1u32.to_le_bytes());
    for (sec, usec, kind, payload) in packets {
        buf.extend_from_slice(&sec.to_le_bytes());
        buf.extend_from_slice(&usec.to_le_bytes());
        buf.extend_from_slice(&kind.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        buf.extend_from_slice(payload);
    }
    File::create(path).unwrap().write_all(&buf).unwrap();
}

fn write_empty_can_log(path: &std::path::Path) {
    let mut f = File::create(path).unwrap();
    writeln!(f, "rts: 0  ts: 0").unwrap();
}

#[test]
fn paces_rtp_events_out_at_their_recorded_gap() {
    let dir = tempfile::tempdir().unwrap();
    let rtp_path = dir.path().join("mixed.bin");
    let can_path = dir.path().join("can.txt");

    // Twelve-byte RTP headers (enough to carry the rewritten SSRC), 40ms apart.
    let header = [0x80u8, 98, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0];
    write_binary_log(&rtp_path, &[(0, 0, 1, &header), (0, 40_000, 1, &header)]);
    write_empty_can_log(&can_path);

    let recv = UdpSocket::bind("127.0.0.1:0").unwrap();
    recv.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let port = recv.local_addr().unwrap().port();

    let engine = ReplayEngine::start(ReplayConfig {
        rtp_log_path: rtp_path,
        can_log_path: can_path,
        client_addr: "127.0.0.1".into(),
        client_rtp_port: port,
        ssrc: 0x11223344,
        can_device: "vcan0".into(),
        can_frame_type: FrameType::Std,
        rewind: false,
    });
    let mut engine = match engine {
        Ok(e) => e,
        Err(e) => {
            eprintln!("skipping: no CAN interface available in this environment: {e}");
            return;
        }
    };

    let mut buf = [0u8; 64];
    let (n1, _) = recv.recv_from(&mut buf).unwrap();
    let t1 = Instant::now();
    assert_eq!(&buf[8..12], &[0x11, 0x22, 0x33, 0x44]);
    let _ = n1;

    let (n2, _) = recv.recv_from(&mut buf).unwrap();
    let gap = t1.elapsed();
    assert_eq!(&buf[8..12], &[0x11, 0x22, 0x33, 0x44]);
    let _ = n2;

    // Allow generous slack for scheduling jitter; the recorded gap is 40ms.
    assert!(gap >= Duration::from_millis(20), "gap too short: {gap:?}");
    assert!(gap <= Duration::from_millis(500), "gap too long: {gap:?}");

    engine.stop();
}
