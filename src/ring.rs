//! Fixed-capacity FIFO of events with overwrite-oldest-on-full semantics.
//!
//! Unlike `crates/ringmpsc`'s lock-free SPSC ring, every operation here runs
//! under the single mutex `Buffer` holds (see `buffer.rs`) — there is no
//! producer/consumer split to synchronize, so no atomics are needed. The
//! point of this ring is overwrite-oldest storage for `Events()` snapshots,
//! not a concurrency primitive in its own right.

use crate::invariants::{debug_assert_bounded_size, debug_assert_sentinel_consistent};
use crate::Event;

/// Fixed-capacity circular store of [`Event`]s.
///
/// `start`/`end` are `None` exactly when `size == 0` — the idiomatic Rust
/// form of the `-1` sentinel SPEC_FULL.md's data model describes.
pub(crate) struct Ring {
    events: Vec<Option<Event>>,
    start: Option<usize>,
    end: Option<usize>,
    size: usize,
}

impl Ring {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            events: (0..capacity).map(|_| None).collect(),
            start: None,
            end: None,
            size: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Appends `event`, overwriting the oldest slot when full.
    pub(crate) fn push(&mut self, event: Event) {
        let capacity = self.capacity();

        match (self.start, self.end) {
            (None, None) => {
                self.start = Some(0);
                self.end = Some(0);
                self.size = 1;
                self.events[0] = Some(event);
            }
            (Some(start), Some(end)) if self.size < capacity {
                let new_end = (end + 1) % capacity;
                self.end = Some(new_end);
                self.size += 1;
                self.events[new_end] = Some(event);
                let _ = start;
            }
            (Some(start), Some(end)) => {
                // Full: advance end first, then start — the overwritten
                // slot is the oldest, the new event becomes the newest.
                let new_end = (end + 1) % capacity;
                let new_start = (start + 1) % capacity;
                self.end = Some(new_end);
                self.start = Some(new_start);
                self.events[new_end] = Some(event);
            }
            (None, Some(_)) | (Some(_), None) => unreachable!("start/end sentinel desync"),
        }

        debug_assert_bounded_size!(self.size, capacity);
        debug_assert_sentinel_consistent!(self.start, self.end, self.size);
    }

    /// Returns an oldest-to-newest snapshot. Empty when the ring is empty.
    pub(crate) fn snapshot(&self) -> Vec<Event> {
        let Some(start) = self.start else {
            return Vec::new();
        };

        let capacity = self.capacity();
        (0..self.size)
            .map(|i| {
                let idx = (start + i) % capacity;
                self.events[idx]
                    .clone()
                    .expect("valid ring position must hold an event")
            })
            .collect()
    }

    /// Clears the ring back to its empty sentinel state, dropping payloads.
    pub(crate) fn reset(&mut self) {
        self.start = None;
        self.end = None;
        self.size = 0;
        for slot in &mut self.events {
            *slot = None;
        }
        debug_assert_sentinel_consistent!(self.start, self.end, self.size);
    }
}
