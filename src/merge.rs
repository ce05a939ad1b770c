//! K-way timestamp merge across an ordered list of log sources.
//!
//! This is the direct descendant of the teacher repo's `LogInput` ordering
//! (sort-by-timestamp over two heterogeneous inputs), generalized from a
//! batch sort over an in-memory `Vec` to a streaming one-event-at-a-time
//! reader with a lookahead slot per source.

use crate::error::Result;
use crate::event::{EventKind, ReadOutcome, MAX_PAYLOAD};
use crate::log_source::AnySource;

struct Slot {
    valid: bool,
    eof: bool,
    kind: EventKind,
    ts: u64,
    len: usize,
    payload: [u8; MAX_PAYLOAD],
}

impl Slot {
    fn empty() -> Self {
        Slot { valid: false, eof: false, kind: EventKind::Can, ts: 0, len: 0, payload: [0u8; MAX_PAYLOAD] }
    }
}

/// Merges an ordered vector of `AnySource`s into a single chronological event
/// stream. Borrows the sources; owns no file handles itself.
pub struct MergeReader<'a> {
    sources: &'a mut [AnySource],
    slots: Vec<Slot>,
}

impl<'a> MergeReader<'a> {
    pub fn new(sources: &'a mut [AnySource]) -> Self {
        let slots = sources.iter().map(|_| Slot::empty()).collect();
        MergeReader { sources, slots }
    }

    /// Reads the next event in timestamp order, or `Eof` once every source is exhausted.
    ///
    /// Ties between sources with equal timestamps are broken by source index:
    /// the earlier-registered source wins, diverging intentionally from the
    /// reference implementation's last-registered-wins bug.
    pub fn read(&mut self, out: &mut [u8]) -> Result<ReadOutcome> {
        for (source, slot) in self.sources.iter_mut().zip(self.slots.iter_mut()) {
            if slot.valid || slot.eof {
                continue;
            }
            match source.read(&mut slot.payload)? {
                ReadOutcome::Eof => slot.eof = true,
                ReadOutcome::Event { len, kind, timestamp_us } => {
                    slot.valid = true;
                    slot.kind = kind;
                    slot.ts = timestamp_us;
                    slot.len = len;
                }
            }
        }

        let mut best: Option<usize> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if !slot.valid {
                continue;
            }
            match best {
                None => best = Some(i),
                Some(b) if slot.ts < self.slots[b].ts => best = Some(i),
                _ => {}
            }
        }

        let Some(i) = best else {
            return Ok(ReadOutcome::Eof);
        };

        let slot = &mut self.slots[i];
        let len = slot.len;
        out[..len].copy_from_slice(&slot.payload[..len]);
        let kind = slot.kind;
        let ts = slot.ts;
        slot.valid = false;

        Ok(ReadOutcome::Event { len, kind, timestamp_us: ts })
    }

    /// Re-opens every underlying source and clears all lookahead state, for rewind.
    pub fn rewind(&mut self) -> Result<()> {
        for source in self.sources.iter_mut() {
            source.reopen()?;
        }
        for slot in self.slots.iter_mut() {
            *slot = Slot::empty();
        }
        Ok(())
    }
}
