//! The RTSP session state machine: one TCP connection, ASCII request/response
//! framing, and a small dispatch table mediating the replay engine's
//! lifecycle.

mod parse;
mod sdp;

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;

use log::{debug, info, warn};
use rand::Rng;

use crate::emitter::FrameType;
use crate::error::{Error, Result};
use crate::replay::{ReplayConfig, ReplayEngine};

const SUPPORTED_METHODS: &str =
    "OPTIONS, DESCRIBE, SETUP, PLAY, PAUSE, GET_PARAMETER, TEARDOWN, SET_PARAMETER";

/// Static configuration an `RtspSession` needs to start a play session: the
/// two source log files and the CAN device/frame type/rewind knobs, all
/// fixed for the server's lifetime.
#[derive(Clone)]
pub struct SessionConfig {
    pub bind_addr: String,
    pub rtp_log_path: PathBuf,
    pub can_log_path: PathBuf,
    pub can_device: String,
    pub can_frame_type: FrameType,
    pub rewind: bool,
}

/// Per-connection session state: `{session_id, ssrc, client_addr,
/// client_rtp_port, client_rtcp_port, engine_handle}`.
pub struct RtspSession {
    stream: TcpStream,
    client_ip: String,
    config: SessionConfig,
    session_id: Option<u32>,
    ssrc: Option<u32>,
    client_rtp_port: Option<u16>,
    client_rtcp_port: Option<u16>,
    engine: Option<ReplayEngine>,
}

impl RtspSession {
    pub fn new(stream: TcpStream, client_ip: String, config: SessionConfig) -> Self {
        RtspSession {
            stream,
            client_ip,
            config,
            session_id: None,
            ssrc: None,
            client_rtp_port: None,
            client_rtcp_port: None,
            engine: None,
        }
    }

    /// Reads and dispatches requests until the client closes the connection,
    /// then tears down any active replay engine.
    pub fn run(&mut self) {
        info!("client {} connected", self.client_ip);
        let mut buf = [0u8; 4096];
        loop {
            let n = match self.stream.read(&mut buf) {
                Ok(0) => {
                    info!("connection with {} closed", self.client_ip);
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!("read() from {} failed: {e}", self.client_ip);
                    break;
                }
            };
            let request = String::from_utf8_lossy(&buf[..n]);
            if let Err(e) = self.dispatch(&request) {
                debug!("request from {} not handled: {e}", self.client_ip);
            }
        }
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
    }

    fn dispatch(&mut self, request: &str) -> Result<()> {
        let Some(method) = parse::parse_method(request) else {
            return Ok(());
        };
        match method {
            "OPTIONS" => self.handle_options(request),
            "DESCRIBE" => self.handle_describe(request),
            "SETUP" => self.handle_setup(request),
            "PLAY" => self.handle_play(request),
            "PAUSE" => self.handle_pause(request),
            "GET_PARAMETER" => self.handle_get_parameter(request),
            "TEARDOWN" => self.handle_teardown(request),
            "SET_PARAMETER" => self.handle_options(request), // same response shape
            _ => Ok(()), // unknown methods are silently ignored
        }
    }

    fn write(&mut self, response: &str) -> Result<()> {
        self.stream.write_all(response.as_bytes())?;
        Ok(())
    }

    fn handle_options(&mut self, request: &str) -> Result<()> {
        let cseq = parse::parse_cseq(request)?;
        let response = format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: {cseq}\r\n\
             Connection: Keep-Alive\r\n\
             Public: {SUPPORTED_METHODS}\r\n\
             \r\n"
        );
        self.write(&response)
    }

    fn handle_get_parameter(&mut self, request: &str) -> Result<()> {
        let cseq = parse::parse_cseq(request)?;
        let response = format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: {cseq}\r\n\
             Connection: Keep-Alive\r\n\
             Content-Length: 0\r\n\
             \r\n"
        );
        self.write(&response)
    }

    fn handle_describe(&mut self, request: &str) -> Result<()> {
        let cseq = parse::parse_cseq(request)?;
        let body = sdp::render(&self.config.bind_addr);
        let response = format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: {cseq}\r\n\
             Content-Base: rtsp://{bind_addr}\r\n\
             Content-type: application/sdp\r\n\
             Content-length: {len}\r\n\
             \r\n\
             {body}",
            bind_addr = self.config.bind_addr,
            len = body.len(),
        );
        self.write(&response)
    }

    fn handle_setup(&mut self, request: &str) -> Result<()> {
        let cseq = parse::parse_cseq(request)?;
        let (p1, p2) = parse::parse_client_port(request)?;

        let mut rng = rand::thread_rng();
        let session_id: u32 = rng.gen();
        let ssrc: u32 = rng.gen();

        self.session_id = Some(session_id);
        self.ssrc = Some(ssrc);
        self.client_rtp_port = Some(p1);
        self.client_rtcp_port = Some(p2);

        let response = format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: {cseq}\r\n\
             Session: {session_id};timeout=120\r\n\
             Transport: RTP/AVP/UDP;unicast;client_port={p1}-{p2};server_port={p1}-{p2};ssrc={ssrc:x}\r\n\
             \r\n"
        );
        self.write(&response)
    }

    fn handle_play(&mut self, request: &str) -> Result<()> {
        let cseq = parse::parse_cseq(request)?;
        let session_id = self
            .session_id
            .ok_or_else(|| Error::ProtocolError { detail: "PLAY before SETUP".into() })?;

        let response = format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: {cseq}\r\n\
             Session: {session_id}\r\n\
             RTP-Info: url=trackID=1;seq=57746;rtptime=1212438488\r\n\
             \r\n"
        );
        self.write(&response)?;

        let ssrc = self.ssrc.expect("SETUP always sets ssrc alongside session_id");
        let client_rtp_port =
            self.client_rtp_port.expect("SETUP always sets client_rtp_port alongside session_id");

        let engine = ReplayEngine::start(ReplayConfig {
            rtp_log_path: self.config.rtp_log_path.clone(),
            can_log_path: self.config.can_log_path.clone(),
            client_addr: self.client_ip.clone(),
            client_rtp_port,
            ssrc,
            can_device: self.config.can_device.clone(),
            can_frame_type: self.config.can_frame_type,
            rewind: self.config.rewind,
        })?;
        if let Some(mut old) = self.engine.replace(engine) {
            old.stop();
        }
        Ok(())
    }

    fn handle_pause(&mut self, request: &str) -> Result<()> {
        let cseq = parse::parse_cseq(request)?;
        let session_id = self.session_id.unwrap_or(0);
        let response = format!(
            "RTSP/1.0 200 OK\r\n\
             CSeq: {cseq}\r\n\
             Session: {session_id}\r\n\
             \r\n"
        );
        self.write(&response)
    }

    fn handle_teardown(&mut self, request: &str) -> Result<()> {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        self.handle_options(request)
    }
}
