//! The pre-baked SDP body served by DESCRIBE, captured from the original device.

/// `sprop-parameter-sets` value captured from the original camera's SPS/PPS.
const SPROP_PARAMETER_SETS: &str = "Z2QAKK3FTYY4jFRWKmwxxGKisVNhjiMVFRBIjEc2SSIJEYjmySRBIjEc2SQtAKAPP+A1SAAAXdgACvyHsQPoAAYahf//HYgfQAAw1C//+FA=,aM44MA==";

/// Renders the SDP body for DESCRIBE. `bind_addr` fills the `o=` line.
pub fn render(bind_addr: &str) -> String {
    format!(
        "v=0\r\n\
         o=- 1 1 IN IP4 {bind_addr}\r\n\
         c=IN IP4 0.0.0.0\r\n\
         b=AS:9216\r\n\
         t=0 0\r\n\
         a=control:*\r\n\
         a=range:npt=now-\r\n\
         m=video 0 RTP/AVP 98\r\n\
         b=AS:9216\r\n\
         a=framerate:30.0\r\n\
         a=control:trackID=1\r\n\
         a=rtpmap:98 H264/90000\r\n\
         a=fmtp:98 packetization-mode=1; profile-level-id=640028; sprop-parameter-sets={SPROP_PARAMETER_SETS}\r\n\
         a=h264-esid:201\r\n\
         \r\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_expected_track() {
        let sdp = render("192.168.1.1");
        assert!(sdp.contains("o=- 1 1 IN IP4 192.168.1.1"));
        assert!(sdp.contains("a=rtpmap:98 H264/90000"));
        assert!(sdp.contains("m=video 0 RTP/AVP 98"));
    }
}
