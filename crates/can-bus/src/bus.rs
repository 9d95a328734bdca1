//! Receive path: interrupt-side producer and task-side consumer

use crate::config::{BusConfig, OverflowPolicy};
use crate::counters::{BusCounters, CounterSnapshot};
use crate::error::{BusError, ResetError};
use crate::reset::{BusState, ResetController, ResetGuard};
use can_frame::{make_frame, Frame};
use ring_buffer::{Consumer, FrameRing, Producer, DEFAULT_CAPACITY};
use tracing::{debug, info, warn};

/// A CAN receive path owning its ring buffer.
///
/// Create one per bus at startup and [`split`](CanBus::split) it into the
/// producer handle for the receive interrupt and the consumer handle for
/// the processing task.
#[derive(Debug)]
pub struct CanBus<const N: usize = DEFAULT_CAPACITY> {
    ring: FrameRing<N>,
    reset: ResetController,
    counters: BusCounters,
    config: BusConfig,
}

impl<const N: usize> CanBus<N> {
    pub fn new(config: BusConfig) -> Self {
        Self {
            ring: FrameRing::new(),
            reset: ResetController::new(),
            counters: BusCounters::new(),
            config,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    pub fn state(&self) -> BusState {
        self.reset.state()
    }

    /// Frames waiting for the consumer
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let (tx, rx) = self.ring.split();
        (
            RxProducer {
                tx,
                reset: &self.reset,
                counters: &self.counters,
                config: &self.config,
            },
            RxConsumer {
                rx,
                reset: &self.reset,
                counters: &self.counters,
            },
        )
    }
}

impl<const N: usize> Default for CanBus<N> {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

/// Interrupt-side handle. Never blocks.
#[derive(Debug)]
pub struct RxProducer<'a, const N: usize> {
    tx: Producer<'a, N>,
    reset: &'a ResetController,
    counters: &'a BusCounters,
    config: &'a BusConfig,
}

impl<const N: usize> RxProducer<'_, N> {
    /// Validate a frame straight from the controller registers and queue it
    pub fn receive_raw(
        &mut self,
        id: u32,
        data: &[u8],
        len: usize,
        extended: bool,
    ) -> Result<(), BusError> {
        self.counters.inc_received();
        let frame = make_frame(id, data, len, extended).map_err(|e| {
            self.counters.inc_invalid();
            warn!("Rejected frame {:#X}: {}", id, e);
            e
        })?;
        self.enqueue(frame)
    }

    /// Queue an already validated frame
    pub fn submit(&mut self, frame: Frame) -> Result<(), BusError> {
        self.counters.inc_received();
        self.enqueue(frame)
    }

    fn enqueue(&mut self, frame: Frame) -> Result<(), BusError> {
        if frame.is_extended() && !self.config.accept_extended {
            self.counters.inc_invalid();
            warn!("Extended frame {:#X} on standard-only bus", frame.id());
            return Err(BusError::ExtendedNotAccepted(frame.id()));
        }
        if self.reset.is_resetting() {
            self.counters.inc_dropped();
            return Err(ResetError::AlreadyInProgress.into());
        }

        let attempts = match self.config.overflow {
            OverflowPolicy::Drop => 0,
            OverflowPolicy::Retry { attempts } => attempts,
        };

        let mut pending = frame;
        let mut retried: u8 = 0;
        loop {
            match self.tx.push(pending) {
                Ok(()) => return Ok(()),
                Err(full) if retried < attempts => {
                    retried += 1;
                    self.counters.inc_retries();
                    pending = full.into_frame();
                    std::hint::spin_loop();
                }
                Err(full) => {
                    self.counters.inc_dropped();
                    if self.config.log_drops {
                        debug!(
                            "Dropped frame {:#X} after {} retries, ring full ({} slots)",
                            pending.id(),
                            retried,
                            full.capacity
                        );
                    }
                    return Err(full.into());
                }
            }
        }
    }

    /// Frames waiting for the consumer
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    pub fn state(&self) -> BusState {
        self.reset.state()
    }
}

/// Task-side handle
#[derive(Debug)]
pub struct RxConsumer<'a, const N: usize> {
    rx: Consumer<'a, N>,
    reset: &'a ResetController,
    counters: &'a BusCounters,
}

impl<'a, const N: usize> RxConsumer<'a, N> {
    /// Next received frame, or `None` if nothing is queued
    pub fn poll(&mut self) -> Option<Frame> {
        let frame = self.rx.pop()?;
        self.counters.inc_delivered();
        Some(frame)
    }

    /// Oldest queued frame without consuming it
    pub fn peek(&self) -> Option<Frame> {
        self.rx.peek()
    }

    /// Frames waiting to be polled
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn state(&self) -> BusState {
        self.reset.state()
    }

    /// Hold the bus in `Resetting` until the guard drops.
    ///
    /// While held, the producer refuses frames with
    /// [`ResetError::AlreadyInProgress`].
    pub fn begin_reset(&self) -> Result<ResetGuard<'a>, ResetError> {
        self.reset.begin()
    }

    /// Reset the bus: discard every queued frame and return how many were
    /// flushed.
    ///
    /// Frames the producer queues after the reset ends are kept.
    pub fn reset_bus(&mut self) -> Result<usize, BusError> {
        let guard = self.begin_reset()?;
        let flushed = self.rx.drain().count();
        drop(guard);

        self.counters.add_flushed(flushed as u64);
        self.counters.inc_resets();
        info!("Bus reset complete, {} queued frames flushed", flushed);
        Ok(flushed)
    }
}
