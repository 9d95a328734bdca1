//! Lock-free receive path counters.
//!
//! Every `inc_*` method is a single relaxed atomic add, so it is safe to
//! call from the interrupt side. Values are only eventually consistent with
//! each other; read them together through [`BusCounters::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Raw frames offered by the driver
    pub received: u64,
    /// Frames refused at validation
    pub invalid: u64,
    /// Valid frames dropped (ring full or reset in progress)
    pub dropped: u64,
    /// Producer retries after `BufferFull`
    pub retries: u64,
    /// Frames handed to the consumer
    pub delivered: u64,
    /// Frames discarded by a bus reset
    pub flushed: u64,
    /// Completed bus resets
    pub resets: u64,
}

/// Atomic counters shared by both sides of the bus
#[derive(Debug, Default)]
pub struct BusCounters {
    received: AtomicU64,
    invalid: AtomicU64,
    dropped: AtomicU64,
    retries: AtomicU64,
    delivered: AtomicU64,
    flushed: AtomicU64,
    resets: AtomicU64,
}

impl BusCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_retries(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_flushed(&self, n: u64) {
        self.flushed.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_resets(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            received: self.received.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            flushed: self.flushed.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}
