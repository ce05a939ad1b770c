//! The replay scheduler: paces events out of the `MergeReader` at their
//! recorded inter-arrival timing, compensating for the processing time of
//! the current step, on a single dedicated worker thread.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::emitter::{CanEmitter, FrameType};
use crate::error::Result;
use crate::event::{EventKind, ReadOutcome, MAX_PAYLOAD};
use crate::log_source::{AnySource, BinaryMixedLog, LogSource, TextCanLog};

/// Skip sleeps below this threshold; matches the reference's `1 < time2sleep` guard.
const MIN_SLEEP: Duration = Duration::from_micros(2);

pub struct ReplayConfig {
    pub rtp_log_path: std::path::PathBuf,
    pub can_log_path: std::path::PathBuf,
    pub client_addr: String,
    pub client_rtp_port: u16,
    pub ssrc: u32,
    pub can_device: String,
    pub can_frame_type: FrameType,
    pub rewind: bool,
}

/// Owns the merge reader's sources, the two emitters, and the worker thread
/// for the lifetime of a single play session.
pub struct ReplayEngine {
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplayEngine {
    /// Opens both log sources and both emitters, rolling back whatever was
    /// already opened if a later step fails.
    pub fn start(cfg: ReplayConfig) -> Result<Self> {
        let can_log = TextCanLog::open(&cfg.can_log_path)?;
        let rtp_log = match BinaryMixedLog::open(&cfg.rtp_log_path) {
            Ok(l) => l,
            Err(e) => {
                let mut can_log = can_log;
                can_log.close();
                return Err(e);
            }
        };

        let rtp = crate::emitter::RtpEmitter::new(&cfg.client_addr, cfg.client_rtp_port, cfg.ssrc);
        let rtp = match rtp {
            Ok(r) => r,
            Err(e) => {
                let mut can_log = can_log;
                let mut rtp_log = rtp_log;
                can_log.close();
                rtp_log.close();
                return Err(e);
            }
        };

        let can = CanEmitter::new(&cfg.can_device, cfg.can_frame_type);
        let can = match can {
            Ok(c) => c,
            Err(e) => {
                let mut can_log = can_log;
                let mut rtp_log = rtp_log;
                can_log.close();
                rtp_log.close();
                // `rtp` (the RtpEmitter) is dropped here, closing its socket.
                return Err(e);
            }
        };

        let cancel = Arc::new(AtomicBool::new(true));
        let worker_cancel = Arc::clone(&cancel);
        let rewind = cfg.rewind;

        let worker = thread::spawn(move || {
            let mut sources = vec![AnySource::Text(can_log), AnySource::Binary(rtp_log)];
            // `rtp`/`can` are moved into the worker here; it exclusively owns
            // the merge reader's sources and both emitters for its lifetime.
            run_pacing_loop(&mut sources, &rtp, &can, rewind, &worker_cancel);
        });

        Ok(ReplayEngine { cancel, worker: Some(worker) })
    }

    /// Signals the worker to stop and joins it. Idempotent: calling this
    /// twice, or on an engine whose worker already exited, is a no-op.
    pub fn stop(&mut self) {
        self.cancel.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("replay worker thread panicked");
            }
        }
    }
}

impl Drop for ReplayEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_pacing_loop(
    sources: &mut [AnySource],
    rtp: &crate::emitter::RtpEmitter,
    can: &CanEmitter,
    rewind: bool,
    cancel: &AtomicBool,
) {
    let mut merge = crate::merge::MergeReader::new(sources);
    let mut buf = [0u8; MAX_PAYLOAD];
    let mut prev_ts: Option<u64> = None;

    while cancel.load(Ordering::SeqCst) {
        let t_start = Instant::now();

        let outcome = match merge.read(&mut buf) {
            Ok(o) => o,
            Err(e) => {
                error!("replay source error, stopping session: {e}");
                return;
            }
        };

        let (len, kind, ts) = match outcome {
            ReadOutcome::Eof => {
                if rewind {
                    info!("replay reached end of stream, rewinding");
                    if let Err(e) = merge.rewind() {
                        error!("rewind failed, stopping session: {e}");
                        return;
                    }
                    prev_ts = None;
                    continue;
                }
                info!("replay reached end of stream, stopping session");
                return;
            }
            ReadOutcome::Event { len, kind, timestamp_us } => (len, kind, timestamp_us),
        };

        let send_result = match kind {
            EventKind::Rtp => rtp.send(&mut buf[..len]),
            EventKind::Can => can.send(&buf[..len]),
        };
        if let Err(e) = send_result {
            error!("send failed, stopping session: {e}");
            return;
        }

        let t_end = Instant::now();
        if let Some(prev) = prev_ts {
            let target_gap = Duration::from_micros(ts.saturating_sub(prev));
            let actual = t_end.saturating_duration_since(t_start);
            if let Some(remaining) = target_gap.checked_sub(actual) {
                if remaining >= MIN_SLEEP {
                    thread::sleep(remaining);
                }
            } else {
                warn!(
                    "replay fell behind schedule by {:?}; not compensating later gaps",
                    actual - target_gap
                );
            }
        }
        prev_ts = Some(ts);
    }
}

/// Resolves the bind address used by the debug force-playback CLI path;
/// kept separate so it can be unit tested without a live socket.
pub fn parse_debug_addr(addr: &str) -> Option<Ipv4Addr> {
    addr.parse().ok()
}
