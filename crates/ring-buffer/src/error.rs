//! Ring Buffer Error Types

use can_frame::Frame;
use thiserror::Error;

/// Push refused because every slot is occupied.
///
/// The rejected frame is handed back so the caller can retry or count the
/// drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Ring buffer full ({capacity} frames), frame rejected")]
pub struct BufferFull {
    pub frame: Frame,
    pub capacity: usize,
}

impl BufferFull {
    /// Take back the frame that was not stored
    pub fn into_frame(self) -> Frame {
        self.frame
    }
}
