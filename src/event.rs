//! Wire-level event types shared by log sources, the merge reader, and the emitters.
//!
//! Every on-disk or on-wire record here is decoded and encoded field-by-field.
//! None of these are ever punned from a `#[repr(C)]` struct overlay, since the
//! packed, little-endian on-disk layout and the big-endian RTP header field
//! are source-language conveniences that don't carry over safely to Rust.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Maximum payload size a caller-provided read buffer is expected to hold.
pub const MAX_PAYLOAD: usize = 2000;

/// Discriminant matching `eventLogPacket.type` in the binary log header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Can = 0,
    Rtp = 1,
}

impl EventKind {
    pub fn from_u16(v: u16) -> Result<Self> {
        match v {
            0 => Ok(EventKind::Can),
            1 => Ok(EventKind::Rtp),
            other => Err(Error::InvalidFormat {
                detail: format!("unknown packet type {other}"),
            }),
        }
    }
}

/// Outcome of a single `LogSource::read` / `MergeReader::read` call.
#[derive(Debug)]
pub enum ReadOutcome {
    Eof,
    Event { len: usize, kind: EventKind, timestamp_us: u64 },
}

/// Fixed 16-byte CAN frame record: `id:u32, len:u32 (0..8), data:[u8;8]`.
pub const CAN_RECORD_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanRecord {
    pub id: u32,
    pub len: u8,
    pub data: [u8; 8],
}

impl CanRecord {
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        if out.len() < CAN_RECORD_LEN {
            return Err(Error::OutOfSpace { needed: CAN_RECORD_LEN, cap: out.len() });
        }
        LittleEndian::write_u32(&mut out[0..4], self.id);
        LittleEndian::write_u32(&mut out[4..8], self.len as u32);
        out[8..16].copy_from_slice(&self.data);
        Ok(())
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < CAN_RECORD_LEN {
            return Err(Error::InvalidFormat {
                detail: format!("CAN record too short: {} bytes", buf.len()),
            });
        }
        let id = LittleEndian::read_u32(&buf[0..4]);
        let len = LittleEndian::read_u32(&buf[4..8]) as u8;
        let mut data = [0u8; 8];
        data.copy_from_slice(&buf[8..16]);
        Ok(CanRecord { id, len, data })
    }
}

/// Minimum length of an RTP packet for its SSRC field (bytes 8..12) to exist.
pub const RTP_HEADER_LEN: usize = 12;

/// Overwrites bytes 8..12 of an RTP packet (the SSRC field) with `ssrc`, big-endian.
///
/// Callers must check `payload.len() >= RTP_HEADER_LEN` first; this function
/// panics on a short slice rather than silently skipping the rewrite.
pub fn rewrite_rtp_ssrc(payload: &mut [u8], ssrc: u32) {
    BigEndian::write_u32(&mut payload[8..12], ssrc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_record_round_trips() {
        let rec = CanRecord { id: 0x123, len: 4, data: [1, 2, 3, 4, 0, 0, 0, 0] };
        let mut buf = [0u8; CAN_RECORD_LEN];
        rec.encode(&mut buf).unwrap();
        let back = CanRecord::decode(&buf).unwrap();
        assert_eq!(rec, back);
    }

    #[test]
    fn can_record_decode_rejects_short_buffer() {
        let buf = [0u8; 4];
        assert!(CanRecord::decode(&buf).is_err());
    }

    #[test]
    fn rtp_ssrc_rewrite_is_big_endian() {
        let mut payload = vec![0u8; 20];
        rewrite_rtp_ssrc(&mut payload, 0xDEADBEEF);
        assert_eq!(&payload[8..12], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn event_kind_rejects_unknown_discriminant() {
        assert!(EventKind::from_u16(2).is_err());
        assert_eq!(EventKind::from_u16(0).unwrap(), EventKind::Can);
        assert_eq!(EventKind::from_u16(1).unwrap(), EventKind::Rtp);
    }
}
