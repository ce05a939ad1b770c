use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::event::{CanRecord, EventKind, ReadOutcome, CAN_RECORD_LEN};

use super::LogSource;

/// `LogSource` over a line-oriented CAN capture:
///
/// ```text
/// rts: 1458726428015650  ts: 2659501121
/// ts: 000000007938   084  [8]  66 D2 66 AE 04 50 71 E9
/// ```
pub struct TextCanLog {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    time_base_us: u64,
    terminal: bool,
}

impl TextCanLog {
    pub fn reopen(&mut self) -> Result<()> {
        let path = self.path.clone();
        *self = TextCanLog::open(&path)?;
        Ok(())
    }

    fn next_line(reader: &mut BufReader<File>) -> Result<Option<String>> {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    /// Parses `"ts: <u64> <hex_id> [<u32_len>] <8x hex_byte>"` (11 whitespace-separated fields).
    fn parse_event_line(line: &str) -> Option<(u64, CanRecord)> {
        let rest = line.strip_prefix("ts: ")?;
        let mut fields = rest.split_whitespace();

        let pktts: u64 = fields.next()?.parse().ok()?;
        let id = u32::from_str_radix(fields.next()?, 16).ok()?;
        let len_field = fields.next()?;
        let len_field = len_field.strip_prefix('[')?.strip_suffix(']')?;
        let len: u32 = len_field.parse().ok()?;

        let mut data = [0u8; 8];
        for slot in data.iter_mut() {
            *slot = u8::from_str_radix(fields.next()?, 16).ok()?;
        }
        if fields.next().is_some() {
            // More than 8 data fields: not the expected 11-field line.
            return None;
        }

        Some((pktts, CanRecord { id, len: len as u8, data }))
    }
}

impl LogSource for TextCanLog {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound { path: path.to_path_buf() }
            } else {
                Error::Io(e)
            }
        })?;
        let mut reader = BufReader::new(file);

        let mut time_base_us = None;
        loop {
            let line = match Self::next_line(&mut reader)? {
                Some(l) => l,
                None => break,
            };
            if let Some(rest) = line.strip_prefix("rts: ") {
                let mut parts = rest.split_whitespace();
                let rts: Option<u64> = parts.next().and_then(|s| s.parse().ok());
                // The trailing "ts: <u64>" field is the recorder's own base offset; discarded,
                // but its presence is still required to consider the line well-formed.
                let has_trailing_ts = parts.next().is_some();
                let rts = rts.filter(|_| has_trailing_ts).ok_or_else(|| Error::InvalidFormat {
                    detail: format!("malformed rts line: {line:?}"),
                })?;
                time_base_us = Some(rts);
                break;
            }
        }

        let time_base_us = time_base_us.ok_or_else(|| {
            Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "no rts: time base line found"))
        })?;

        Ok(TextCanLog { path: path.to_path_buf(), reader: Some(reader), time_base_us, terminal: false })
    }

    fn read(&mut self, out: &mut [u8]) -> Result<ReadOutcome> {
        if self.terminal {
            return Ok(ReadOutcome::Eof);
        }
        if CAN_RECORD_LEN > out.len() {
            return Err(Error::OutOfSpace { needed: CAN_RECORD_LEN, cap: out.len() });
        }
        let reader = self.reader.as_mut().expect("open() always sets reader");

        loop {
            let line = match Self::next_line(reader) {
                Ok(Some(l)) => l,
                Ok(None) => {
                    self.terminal = true;
                    return Ok(ReadOutcome::Eof);
                }
                Err(e) => {
                    self.terminal = true;
                    return Err(e);
                }
            };

            if !line.starts_with("ts: ") {
                continue;
            }

            match Self::parse_event_line(&line) {
                Some((pktts, record)) => {
                    record.encode(&mut out[..CAN_RECORD_LEN])?;
                    let timestamp_us = self.time_base_us.saturating_add(pktts);
                    return Ok(ReadOutcome::Event {
                        len: CAN_RECORD_LEN,
                        kind: EventKind::Can,
                        timestamp_us,
                    });
                }
                None => {
                    log::warn!("skipping unparseable CAN log line: {}", line.trim_end());
                    continue;
                }
            }
        }
    }

    fn close(&mut self) {
        self.reader = None;
        self.terminal = true;
    }
}
