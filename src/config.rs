//! Command-line configuration, parsed with `clap`'s derive API.

use std::path::PathBuf;

use clap::Parser;

use crate::emitter::FrameType;

#[derive(Debug, Parser)]
#[command(name = "logplayer", about = "Replays a recorded RTP/CAN log pair over RTSP")]
pub struct Args {
    /// Increase log verbosity (can be repeated: -v, -vv, -vvv).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Rewind and replay from the start when the logs reach EOF.
    #[arg(short = 'r')]
    pub rewind: bool,

    /// CAN interface to emit CAN frames on.
    #[arg(short = 'd', default_value = "can0")]
    pub can_device: String,

    /// CAN frame identifier width.
    #[arg(short = 't', value_enum, default_value_t = FrameType::Std)]
    pub can_frame_type: FrameType,

    /// RTSP listen port.
    #[arg(short = 'p', default_value_t = 554)]
    pub port: u16,

    /// RTSP listen address.
    #[arg(short = 'i', default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// Debug mode: skip RTSP negotiation and replay straight to `-i`/`-p`,
    /// bypassing SETUP/PLAY entirely.
    #[arg(short = 'f', action = clap::ArgAction::SetTrue)]
    pub force_playback: bool,

    /// Binary RTP/video log file.
    pub rtp_log: PathBuf,

    /// Text CAN log file.
    pub can_log: PathBuf,
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameType::Std => write!(f, "std"),
            FrameType::Ext => write!(f, "ext"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_args() {
        let args = Args::parse_from(["logplayer", "rtp.bin", "can.txt"]);
        assert_eq!(args.port, 554);
        assert_eq!(args.bind_addr, "0.0.0.0");
        assert_eq!(args.can_device, "can0");
        assert_eq!(args.can_frame_type, FrameType::Std);
        assert!(!args.rewind);
        assert_eq!(args.rtp_log, PathBuf::from("rtp.bin"));
        assert_eq!(args.can_log, PathBuf::from("can.txt"));
    }

    #[test]
    fn parses_full_flag_set() {
        let args = Args::parse_from([
            "logplayer", "-vv", "-r", "-d", "can1", "-t", "ext", "-p", "5540", "-i",
            "192.168.1.10", "rtp.bin", "can.txt",
        ]);
        assert_eq!(args.verbose, 2);
        assert!(args.rewind);
        assert_eq!(args.can_device, "can1");
        assert_eq!(args.can_frame_type, FrameType::Ext);
        assert_eq!(args.port, 5540);
        assert_eq!(args.bind_addr, "192.168.1.10");
    }

    #[test]
    fn force_playback_is_a_bare_flag() {
        let args = Args::parse_from(["logplayer", "rtp.bin", "can.txt"]);
        assert!(!args.force_playback);
        let args = Args::parse_from(["logplayer", "-f", "rtp.bin", "can.txt"]);
        assert!(args.force_playback);
        assert_eq!(args.rtp_log, PathBuf::from("rtp.bin"));
        assert_eq!(args.can_log, PathBuf::from("can.txt"));
    }
}
