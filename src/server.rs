//! TCP accept loop: one RTSP session handled at a time, plus a debug bypass
//! that starts a replay engine directly without RTSP negotiation.

use std::net::TcpListener;
use std::path::PathBuf;

use log::{error, info};

use crate::emitter::FrameType;
use crate::error::Result;
use crate::replay::{ReplayConfig, ReplayEngine};
use crate::rtsp::{RtspSession, SessionConfig};

pub struct Server {
    bind_addr: String,
    port: u16,
    session_config: SessionConfig,
}

impl Server {
    pub fn new(
        bind_addr: String,
        port: u16,
        rtp_log_path: PathBuf,
        can_log_path: PathBuf,
        can_device: String,
        can_frame_type: FrameType,
        rewind: bool,
    ) -> Self {
        Server {
            session_config: SessionConfig {
                bind_addr: bind_addr.clone(),
                rtp_log_path,
                can_log_path,
                can_device,
                can_frame_type,
                rewind,
            },
            bind_addr,
            port,
        }
    }

    /// Accepts connections serially: one RTSP session runs to completion
    /// before the next connection is accepted.
    pub fn run(&self) -> Result<()> {
        let listener = TcpListener::bind((self.bind_addr.as_str(), self.port))?;
        info!("listening on {}:{}", self.bind_addr, self.port);

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    error!("accept() failed: {e}");
                    continue;
                }
            };
            let client_ip = stream
                .peer_addr()
                .map(|a| a.ip().to_string())
                .unwrap_or_else(|_| "unknown".into());

            let mut session = RtspSession::new(stream, client_ip, self.session_config.clone());
            session.run();
        }
        Ok(())
    }

    /// Bypasses RTSP negotiation entirely: starts replaying straight to the
    /// configured `-i`/`-p` address, reusing them as the forced destination
    /// the way the reference implementation does, and blocks until stopped.
    pub fn run_force_playback(&self) -> Result<()> {
        info!("debug force-playback to {}:{}", self.bind_addr, self.port);

        let mut engine = ReplayEngine::start(ReplayConfig {
            rtp_log_path: self.session_config.rtp_log_path.clone(),
            can_log_path: self.session_config.can_log_path.clone(),
            client_addr: self.bind_addr.clone(),
            client_rtp_port: self.port,
            ssrc: rand::random(),
            can_device: self.session_config.can_device.clone(),
            can_frame_type: self.session_config.can_frame_type,
            rewind: self.session_config.rewind,
        })?;

        // Block until Ctrl-C; the worker thread owns the actual replay loop.
        ctrlc_wait();
        engine.stop();
        Ok(())
    }
}

/// Parks the calling thread indefinitely; `run_force_playback` relies on the
/// process being killed (Ctrl-C) to end the debug session, matching the
/// reference tool's blocking foreground behavior.
fn ctrlc_wait() {
    loop {
        std::thread::park();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stores_bind_addr_and_port_for_force_playback() {
        let server = Server::new(
            "192.168.1.10".into(),
            5540,
            "rtp.bin".into(),
            "can.txt".into(),
            "can0".into(),
            FrameType::Std,
            false,
        );
        assert_eq!(server.bind_addr, "192.168.1.10");
        assert_eq!(server.port, 5540);
    }
}
