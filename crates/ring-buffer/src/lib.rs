//! Lock-Free Ring Buffer
//!
//! Fixed-capacity SPSC queue of CAN frames. The producer side is meant to be
//! driven from an interrupt-like receive context and never blocks; the
//! consumer side is polled by a task.

mod buffer;
mod error;

pub use buffer::{Consumer, Drain, FrameRing, Producer, DEFAULT_CAPACITY};
pub use error::BufferFull;
