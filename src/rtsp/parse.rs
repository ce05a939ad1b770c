//! RTSP request parsing: pulling `CSeq:` and `client_port=` out of a request
//! by scanning CRLF-separated header lines, the way the reference
//! implementation's `strtok`-based scanners do, but without representing
//! empty matches as a bare sentinel value.

use crate::error::{Error, Result};

/// The first whitespace-delimited token of the request line, e.g. `"PLAY"`.
pub fn parse_method(request: &str) -> Option<&str> {
    request.split_whitespace().next()
}

/// Extracts the `CSeq:` header value.
pub fn parse_cseq(request: &str) -> Result<u32> {
    for line in request.split("\r\n") {
        if let Some(rest) = line.strip_prefix("CSeq:") {
            if let Ok(n) = rest.trim().parse() {
                return Ok(n);
            }
        }
    }
    Err(Error::ProtocolError { detail: "missing or malformed CSeq: header".into() })
}

/// Extracts `p1`/`p2` from a `Transport:` header's `client_port=p1-p2` field.
pub fn parse_client_port(request: &str) -> Result<(u16, u16)> {
    for line in request.split("\r\n") {
        if let Some(idx) = line.find("client_port=") {
            let rest = &line[idx + "client_port=".len()..];
            let mut parts = rest.split(['-', ';']);
            if let (Some(p1), Some(p2)) = (parts.next(), parts.next()) {
                if let (Ok(p1), Ok(p2)) = (p1.trim().parse(), p2.trim().parse()) {
                    return Ok((p1, p2));
                }
            }
        }
    }
    Err(Error::ProtocolError { detail: "missing or malformed client_port= in Transport header".into() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_method() {
        assert_eq!(parse_method("PLAY rtsp://host/ RTSP/1.0\r\nCSeq: 3\r\n\r\n"), Some("PLAY"));
    }

    #[test]
    fn extracts_cseq() {
        let req = "OPTIONS rtsp://host/ RTSP/1.0\r\nCSeq: 42\r\n\r\n";
        assert_eq!(parse_cseq(req).unwrap(), 42);
    }

    #[test]
    fn missing_cseq_is_protocol_error() {
        let req = "OPTIONS rtsp://host/ RTSP/1.0\r\n\r\n";
        assert!(parse_cseq(req).is_err());
    }

    #[test]
    fn extracts_client_port() {
        let req = "SETUP rtsp://host/trackID=1 RTSP/1.0\r\nCSeq: 1\r\n\
                   Transport: RTP/AVP;unicast;client_port=7000-7001\r\n\r\n";
        assert_eq!(parse_client_port(req).unwrap(), (7000, 7001));
    }

    #[test]
    fn missing_client_port_is_protocol_error() {
        let req = "SETUP rtsp://host/trackID=1 RTSP/1.0\r\nCSeq: 1\r\n\r\n";
        assert!(parse_client_port(req).is_err());
    }
}
