//! Fast channel: overwrite-on-overrun ring of fixed-width records.
//!
//! The writer never blocks and never fails. Readers keep their own
//! monotonically increasing cursor and replay everything between it and
//! the write cursor. A reader more than one capacity behind is moved forward
//! to exactly one capacity behind; the records it skipped are gone.

use tracing::trace;

use rampart_core::events::FastEvent;
use rampart_core::{EcsError, EcsResult};

#[derive(Debug, Clone)]
pub struct FastRing {
    records: Box<[FastEvent]>,
    mask: u64,
    /// Total records ever written.
    write: u64,
}

impl FastRing {
    /// `capacity` must be a power of two.
    pub fn new(capacity: usize) -> EcsResult<Self> {
        if !capacity.is_power_of_two() {
            return Err(EcsError::NotPowerOfTwo {
                what: "fast channel capacity",
                value: capacity,
            });
        }
        Ok(Self {
            records: vec![FastEvent::default(); capacity].into_boxed_slice(),
            mask: capacity as u64 - 1,
            write: 0,
        })
    }

    /// Write a record, overwriting the oldest once the ring is full.
    pub fn emit(&mut self, event: FastEvent) {
        self.records[(self.write & self.mask) as usize] = event;
        self.write += 1;
    }

    /// Call `handler` for every record from `cursor` up to the latest, in
    /// write order, and return the cursor to pass next time. The returned
    /// cursor is never behind the one passed in.
    pub fn read_events(&self, cursor: u64, mut handler: impl FnMut(&FastEvent)) -> u64 {
        let oldest = self.write.saturating_sub(self.capacity() as u64);
        let start = if cursor < oldest {
            trace!(
                skipped = oldest - cursor,
                "fast channel reader overrun, skipping forward"
            );
            oldest
        } else {
            cursor.min(self.write)
        };
        for seq in start..self.write {
            handler(&self.records[(seq & self.mask) as usize]);
        }
        cursor.max(self.write)
    }

    /// Cursor a new reader should start from to see only future records.
    pub fn cursor(&self) -> u64 {
        self.write
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }
}
