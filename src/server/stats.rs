//! Relay counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the relay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Client sessions accepted
    pub connections: u64,
    /// Binary frames received
    pub frames_received: u64,
    /// Binary frames decoded and stored as latest
    pub frames_decoded: u64,
    /// Binary frames that failed to decode
    pub frames_dropped: u64,
    /// Text frames received from clients
    pub texts_received: u64,
    /// Captures that promoted a new frame to current
    pub captures: u64,
    /// Text frames handed to a live session
    pub texts_sent: u64,
    /// Text frames discarded because the session's queue was full
    pub texts_dropped: u64,
}

impl RelayStats {
    /// Frames stored but never captured because a newer one replaced them.
    ///
    /// Only meaningful when the consumer has caught up with the producer.
    pub fn coalesced(&self) -> u64 {
        self.frames_decoded.saturating_sub(self.captures)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub connections: AtomicU64,
    pub frames_received: AtomicU64,
    pub frames_decoded: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub texts_received: AtomicU64,
    pub captures: AtomicU64,
    pub texts_sent: AtomicU64,
    pub texts_dropped: AtomicU64,
}

impl StatsCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStats {
        RelayStats {
            connections: self.connections.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            texts_received: self.texts_received.load(Ordering::Relaxed),
            captures: self.captures.load(Ordering::Relaxed),
            texts_sent: self.texts_sent.load(Ordering::Relaxed),
            texts_dropped: self.texts_dropped.load(Ordering::Relaxed),
        }
    }
}
