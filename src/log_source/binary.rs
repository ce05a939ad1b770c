use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::event::{EventKind, ReadOutcome};

use super::LogSource;

const MAGIC: &[u8; 4] = b"ELOG";
const VERSION: u32 = 1;

/// `LogSource` over a framed binary "mixed" log: an 8-byte file header
/// followed by a sequence of `{sec:u64, usec:u64, type:u16, len:u16}`
/// packet headers, each followed by `len` raw payload bytes.
pub struct BinaryMixedLog {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    terminal: bool,
}

impl BinaryMixedLog {
    pub fn reopen(&mut self) -> Result<()> {
        let path = self.path.clone();
        *self = BinaryMixedLog::open(&path)?;
        Ok(())
    }

    fn read_header_field(reader: &mut BufReader<File>) -> Result<Option<(u64, u64, u16, u16)>> {
        let mut first = [0u8; 8];
        match read_exact_or_eof(reader, &mut first)? {
            None => return Ok(None),
            Some(n) if n < first.len() => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "short read of packet header",
                )))
            }
            _ => {}
        }
        let sec = LittleEndian::read_u64(&first);
        let usec = reader.read_u64::<LittleEndian>()?;
        let typ = reader.read_u16::<LittleEndian>()?;
        let len = reader.read_u16::<LittleEndian>()?;
        Ok(Some((sec, usec, typ, len)))
    }
}

/// Reads into `buf` up to `buf.len()` bytes, returning:
/// - `Ok(None)` if EOF was reached before any byte was read,
/// - `Ok(Some(n))` with `n < buf.len()` on a short read past EOF,
/// - `Ok(Some(buf.len()))` on a full read,
/// - `Err` on any other I/O error.
fn read_exact_or_eof(r: &mut impl Read, buf: &mut [u8]) -> Result<Option<usize>> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    if total == 0 {
        Ok(None)
    } else {
        Ok(Some(total))
    }
}

impl LogSource for BinaryMixedLog {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound { path: path.to_path_buf() }
            } else {
                Error::Io(e)
            }
        })?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        if &header[0..4] != MAGIC {
            return Err(Error::InvalidFormat {
                detail: "bad binary log magic, expected \"ELOG\"".into(),
            });
        }
        let version = LittleEndian::read_u32(&header[4..8]);
        if version != VERSION {
            return Err(Error::InvalidFormat {
                detail: format!("unsupported binary log version {version}"),
            });
        }

        Ok(BinaryMixedLog { path: path.to_path_buf(), reader: Some(reader), terminal: false })
    }

    fn read(&mut self, out: &mut [u8]) -> Result<ReadOutcome> {
        if self.terminal {
            return Ok(ReadOutcome::Eof);
        }
        let reader = self.reader.as_mut().expect("open() always sets reader");

        let header = match Self::read_header_field(reader) {
            Ok(Some(h)) => h,
            Ok(None) => return Ok(ReadOutcome::Eof),
            Err(e) => {
                self.terminal = true;
                return Err(e);
            }
        };
        let (sec, usec, typ, len) = header;
        let len = len as usize;

        if len > out.len() {
            self.terminal = true;
            return Err(Error::OutOfSpace { needed: len, cap: out.len() });
        }

        if let Err(e) = reader.read_exact(&mut out[..len]) {
            self.terminal = true;
            return Err(Error::Io(e));
        }

        let kind = match EventKind::from_u16(typ) {
            Ok(k) => k,
            Err(e) => {
                self.terminal = true;
                return Err(e);
            }
        };

        let timestamp_us = sec.saturating_mul(1_000_000).saturating_add(usec);
        Ok(ReadOutcome::Event { len, kind, timestamp_us })
    }

    fn close(&mut self) {
        self.reader = None;
        self.terminal = true;
    }
}
