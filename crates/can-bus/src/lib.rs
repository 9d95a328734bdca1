//! CAN Receive Path
//!
//! Connects a raw-frame source (the interrupt side) to a consumer task
//! through a lock-free [`FrameRing`]. Frames are validated on entry, queued
//! under the configured overflow policy and counted; the bus can be reset
//! from any context, at most one reset at a time.

mod bus;
mod config;
mod counters;
mod error;
mod reset;

pub use bus::{CanBus, RxConsumer, RxProducer};
pub use can_frame::{checksum, legacy_checksum16, make_frame, Frame, InvalidFrame};
pub use config::{BusConfig, OverflowPolicy};
pub use counters::{BusCounters, CounterSnapshot};
pub use error::{BusError, ResetError};
pub use reset::{BusState, ResetController, ResetGuard};
pub use ring_buffer::{BufferFull, FrameRing, DEFAULT_CAPACITY};
