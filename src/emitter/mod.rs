mod can;
mod rtp;

pub use can::{CanEmitter, FrameType};
pub use rtp::RtpEmitter;
