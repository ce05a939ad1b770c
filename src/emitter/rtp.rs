use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::event::{rewrite_rtp_ssrc, RTP_HEADER_LEN};

/// Owns a connectionless UDP socket and sends RTP datagrams to a fixed
/// destination, rewriting the SSRC field of every packet before it goes out.
pub struct RtpEmitter {
    socket: UdpSocket,
    dest: SocketAddrV4,
    ssrc: u32,
}

impl RtpEmitter {
    pub fn new(addr: &str, port: u16, ssrc: u32) -> Result<Self> {
        let ip = Ipv4Addr::from_str(addr).map_err(|_| Error::AddressError { addr: addr.to_string() })?;
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(RtpEmitter { socket, dest: SocketAddrV4::new(ip, port), ssrc })
    }

    /// Rewrites the SSRC field and sends `payload` as a single UDP datagram.
    pub fn send(&self, payload: &mut [u8]) -> Result<()> {
        if payload.len() < RTP_HEADER_LEN {
            return Err(Error::InvalidFormat {
                detail: format!(
                    "RTP record too short to carry an SSRC field: {} bytes",
                    payload.len()
                ),
            });
        }
        rewrite_rtp_ssrc(payload, self.ssrc);
        self.socket.send_to(payload, self.dest)?;
        Ok(())
    }
}
