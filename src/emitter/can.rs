use std::thread;
use std::time::Duration;

use socketcan::{CanFrame, CanSocket, ExtendedId, Frame, Socket, StandardId};

use crate::error::{Error, Result};
use crate::event::{CanRecord, CAN_RECORD_LEN};

const MAX_RETRIES: u32 = 1000;
const RETRY_BACKOFF: Duration = Duration::from_micros(10);

/// Frame-type configuration selecting identifier interpretation at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FrameType {
    Std,
    Ext,
}

/// Owns a raw CAN socket bound to a named interface, retrying transient
/// buffer-full sends.
pub struct CanEmitter {
    socket: CanSocket,
    frame_type: FrameType,
}

impl CanEmitter {
    pub fn new(ifname: &str, frame_type: FrameType) -> Result<Self> {
        let socket = CanSocket::open(ifname).map_err(|e| Error::BusError {
            detail: format!("opening CAN interface {ifname:?}: {e}"),
        })?;
        Ok(CanEmitter { socket, frame_type })
    }

    /// Sends a 16-byte CAN frame record, retrying up to 1000 times on `ENOBUFS`.
    pub fn send(&self, buf: &[u8]) -> Result<()> {
        if buf.len() != CAN_RECORD_LEN {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("CAN payload must be exactly {CAN_RECORD_LEN} bytes, got {}", buf.len()),
            )));
        }
        let record = CanRecord::decode(buf)?;
        let frame = self.build_frame(&record)?;

        let mut retries_left = MAX_RETRIES;
        loop {
            match self.socket.write_frame(&frame) {
                Ok(()) => return Ok(()),
                Err(e) if e.raw_os_error() == Some(libc::ENOBUFS) && retries_left > 0 => {
                    retries_left -= 1;
                    thread::sleep(RETRY_BACKOFF);
                }
                Err(e) => {
                    return Err(Error::BusError { detail: format!("CAN write failed: {e}") });
                }
            }
        }
    }

    fn build_frame(&self, record: &CanRecord) -> Result<CanFrame> {
        let len = record.len.min(8) as usize;
        let data = &record.data[..len];
        let frame = match self.frame_type {
            FrameType::Std => {
                let id = StandardId::new(record.id as u16).ok_or_else(|| Error::BusError {
                    detail: format!("CAN id {:#x} does not fit in an 11-bit standard id", record.id),
                })?;
                CanFrame::new(id, data)
            }
            FrameType::Ext => {
                let id = ExtendedId::new(record.id).ok_or_else(|| Error::BusError {
                    detail: format!("CAN id {:#x} does not fit in a 29-bit extended id", record.id),
                })?;
                CanFrame::new(id, data)
            }
        };
        frame.ok_or_else(|| Error::BusError { detail: "CAN data payload exceeds 8 bytes".into() })
    }
}
