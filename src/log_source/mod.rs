//! `LogSource` is the capability contract every heterogeneous log input
//! implements: open a path, read one event at a time, close.
//!
//! The `MergeReader` needs only `read`/`close`; it does not care which kind
//! of source it's pulling from. Rather than boxing each source as
//! `Box<dyn LogSource>`, sources are wrapped in the `AnySource` sum type so
//! the merge reader's hot loop avoids dynamic dispatch (Design Note 9.1).

mod binary;
mod text_can;

pub use binary::BinaryMixedLog;
pub use text_can::TextCanLog;

use std::path::Path;

use crate::event::ReadOutcome;
use crate::error::Result;

/// Shared contract for a single heterogeneous event source.
///
/// `read` never blocks beyond the underlying file I/O, returns
/// `ReadOutcome::Eof` once the source is exhausted (and keeps returning it on
/// every subsequent call), and leaves the source in a terminal state after
/// any unrecoverable parse error.
pub trait LogSource: Sized {
    fn open(path: &Path) -> Result<Self>;
    fn read(&mut self, out: &mut [u8]) -> Result<ReadOutcome>;
    fn close(&mut self);
}

/// Concrete sum type over the two log source kinds this system reads.
pub enum AnySource {
    Binary(BinaryMixedLog),
    Text(TextCanLog),
}

impl AnySource {
    pub fn read(&mut self, out: &mut [u8]) -> Result<ReadOutcome> {
        match self {
            AnySource::Binary(s) => s.read(out),
            AnySource::Text(s) => s.read(out),
        }
    }

    pub fn close(&mut self) {
        match self {
            AnySource::Binary(s) => s.close(),
            AnySource::Text(s) => s.close(),
        }
    }

    /// Re-opens the underlying source from its original path, for rewind.
    pub fn reopen(&mut self) -> Result<()> {
        match self {
            AnySource::Binary(s) => s.reopen(),
            AnySource::Text(s) => s.reopen(),
        }
    }
}
