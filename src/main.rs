use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use logplayer::config::Args;
use logplayer::server::Server;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let server = Server::new(
        args.bind_addr,
        args.port,
        args.rtp_log,
        args.can_log,
        args.can_device,
        args.can_frame_type,
        args.rewind,
    );

    if args.force_playback {
        server.run_force_playback().context("debug force-playback session failed")
    } else {
        server.run().context("RTSP server failed")
    }
}
