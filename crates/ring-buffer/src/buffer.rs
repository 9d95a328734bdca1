//! Lock-Free Ring Buffer Implementation

use crate::error::BufferFull;
use can_frame::Frame;
use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default buffer capacity (16 frames, the usual CAN controller RX FIFO depth)
pub const DEFAULT_CAPACITY: usize = 16;

/// Lock-free SPSC ring buffer for CAN frames.
///
/// All `N` slots are usable. `head` is only touched by the consumer and
/// `tail` only by the producer; `count` is the one variable both sides
/// update, and it is what publishes a slot from one side to the other.
pub struct FrameRing<const N: usize = DEFAULT_CAPACITY> {
    /// Inline storage, no heap allocation
    storage: [UnsafeCell<Frame>; N],
    /// Read position (consumer-owned)
    head: AtomicUsize,
    /// Write position (producer-owned)
    tail: AtomicUsize,
    /// Occupied slots
    count: AtomicUsize,
    /// Total frames accepted (for statistics)
    total_written: AtomicUsize,
    /// Total pushes refused with `BufferFull`
    total_rejected: AtomicUsize,
}

impl<const N: usize> FrameRing<N> {
    const NON_ZERO_CAPACITY: () = assert!(N > 0, "FrameRing capacity must be non-zero");

    /// Create an empty ring
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO_CAPACITY;
        Self {
            storage: std::array::from_fn(|_| UnsafeCell::new(Frame::default())),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
            total_written: AtomicUsize::new(0),
            total_rejected: AtomicUsize::new(0),
        }
    }

    /// Split into the producer and consumer handles.
    ///
    /// The ring stays mutably borrowed while either handle is alive, so
    /// there is never more than one producer or one consumer.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    /// Push a frame (single-context use)
    pub fn push(&mut self, frame: Frame) -> Result<(), BufferFull> {
        // SAFETY: &mut self excludes any live Producer.
        unsafe { self.enqueue(frame) }
    }

    /// Pop the oldest frame (single-context use)
    pub fn pop(&mut self) -> Option<Frame> {
        // SAFETY: &mut self excludes any live Consumer.
        unsafe { self.dequeue() }
    }

    /// Copy of the oldest frame without consuming it
    pub fn peek(&self) -> Option<Frame> {
        // SAFETY: a shared borrow of the ring means no handle is alive, so
        // no one can be writing a slot.
        unsafe { self.front() }
    }

    /// Number of frames currently in the buffer
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        N
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len() as f64 / N as f64
    }

    /// Get total frames written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written.load(Ordering::Relaxed)
    }

    /// Get total pushes refused because the buffer was full
    pub fn total_rejected(&self) -> usize {
        self.total_rejected.load(Ordering::Relaxed)
    }

    /// Discard every queued frame
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    /// # Safety
    ///
    /// Only one context may call this at a time (the producer).
    unsafe fn enqueue(&self, frame: Frame) -> Result<(), BufferFull> {
        // Acquire pairs with the consumer's release in `dequeue`: the slot we
        // are about to overwrite has been fully read.
        if self.count.load(Ordering::Acquire) == N {
            self.total_rejected.fetch_add(1, Ordering::Relaxed);
            return Err(BufferFull {
                frame,
                capacity: N,
            });
        }

        let tail = self.tail.load(Ordering::Relaxed);
        // SAFETY: count < N so the tail slot is free and the consumer will
        // not read it until the release below.
        unsafe { *self.storage[tail].get() = frame };
        self.tail.store((tail + 1) % N, Ordering::Relaxed);

        self.count.fetch_add(1, Ordering::Release);
        self.total_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// # Safety
    ///
    /// Only one context may call this at a time (the consumer).
    unsafe fn dequeue(&self) -> Option<Frame> {
        // SAFETY: forwarded to the caller.
        let frame = unsafe { self.front() }?;
        let head = self.head.load(Ordering::Relaxed);
        self.head.store((head + 1) % N, Ordering::Relaxed);
        self.count.fetch_sub(1, Ordering::Release);
        Some(frame)
    }

    /// # Safety
    ///
    /// Caller must be the consumer or hold the ring exclusively.
    unsafe fn front(&self) -> Option<Frame> {
        // Acquire pairs with the producer's release in `enqueue`.
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }
        let head = self.head.load(Ordering::Relaxed);
        // SAFETY: count > 0 so the head slot is published and the producer
        // will not touch it until we release it.
        Some(unsafe { *self.storage[head].get() })
    }
}

impl<const N: usize> Default for FrameRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for FrameRing<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRing")
            .field("capacity", &N)
            .field("len", &self.len())
            .field("total_written", &self.total_written())
            .field("total_rejected", &self.total_rejected())
            .finish()
    }
}

// SAFETY: slots are only written through the unique producer path and only
// read through the unique consumer path; `count` orders the two.
unsafe impl<const N: usize> Sync for FrameRing<N> {}

/// Write half of a split [`FrameRing`]
#[derive(Debug)]
pub struct Producer<'a, const N: usize> {
    ring: &'a FrameRing<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Push a frame; never blocks, never overwrites
    pub fn push(&mut self, frame: Frame) -> Result<(), BufferFull> {
        // SAFETY: Producer is unique and &mut self serialises calls.
        unsafe { self.ring.enqueue(frame) }
    }

    /// Frames currently queued
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        N
    }
}

/// Read half of a split [`FrameRing`]
#[derive(Debug)]
pub struct Consumer<'a, const N: usize> {
    ring: &'a FrameRing<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    /// Pop the oldest frame; `None` when empty
    pub fn pop(&mut self) -> Option<Frame> {
        // SAFETY: Consumer is unique and &mut self serialises calls.
        unsafe { self.ring.dequeue() }
    }

    /// Copy of the oldest frame without consuming it
    pub fn peek(&self) -> Option<Frame> {
        // SAFETY: only the consumer reads slots; the producer never writes
        // an occupied one.
        unsafe { self.ring.front() }
    }

    /// Pop until empty
    pub fn drain<'c>(&'c mut self) -> Drain<'c, 'a, N> {
        Drain { consumer: self }
    }

    /// Frames currently queued
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        N
    }
}

/// Iterator returned by [`Consumer::drain`]
#[derive(Debug)]
pub struct Drain<'c, 'a, const N: usize> {
    consumer: &'c mut Consumer<'a, N>,
}

impl<const N: usize> Iterator for Drain<'_, '_, N> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.consumer.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // The producer may add frames while draining
        (self.consumer.len(), None)
    }
}
