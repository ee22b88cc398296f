//! Latest/current frame double buffer
//!
//! The network side stores every successfully decoded frame as "latest"; the
//! consumer promotes "latest" to "current" with an explicit capture and only
//! ever reads "current". Both live in two fixed slots: the writer always fills
//! the slot that is not current, and a capture is an index swap. Neither side
//! copies pixels while holding the relay lock.
//!
//! [`FrameBuffer`] itself is not synchronized; the relay keeps it behind the
//! same lock as the connection reference.

use std::sync::Arc;

use crate::types::DecodedImage;

/// A stored frame with its arrival sequence number.
#[derive(Debug)]
pub struct FrameRecord {
    /// Monotonic counter, starting at 1 for the first stored frame
    pub sequence: u64,
    pub image: DecodedImage,
}

/// Two-slot frame store.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    slots: [Option<Arc<FrameRecord>>; 2],
    current: usize,
    /// The non-current slot holds a frame newer than current
    fresh: bool,
    last_sequence: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn back(&self) -> usize {
        1 - self.current
    }

    /// Store a decoded frame as "latest".
    ///
    /// Returns the frame evicted from the back slot so the caller can drop it
    /// after releasing its lock.
    pub fn store_latest(&mut self, image: DecodedImage) -> Option<Arc<FrameRecord>> {
        self.last_sequence += 1;
        let record = Arc::new(FrameRecord { sequence: self.last_sequence, image });
        let back = self.back();
        self.fresh = true;
        self.slots[back].replace(record)
    }

    /// Promote "latest" to "current" if a newer frame is waiting.
    ///
    /// Returns `true` when "current" changed.
    pub fn capture(&mut self) -> bool {
        if !self.fresh {
            return false;
        }
        self.current = self.back();
        self.fresh = false;
        true
    }

    /// The most recently stored frame, whether or not it has been captured.
    pub fn latest(&self) -> Option<&Arc<FrameRecord>> {
        if self.fresh { self.slots[self.back()].as_ref() } else { self.slots[self.current].as_ref() }
    }

    /// The frame visible to the consumer.
    pub fn current(&self) -> Option<&Arc<FrameRecord>> {
        self.slots[self.current].as_ref()
    }

    /// Whether a stored frame is waiting to be captured.
    pub fn has_fresh(&self) -> bool {
        self.fresh
    }

    /// Sequence number of the last stored frame (0 before any frame).
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }
}
