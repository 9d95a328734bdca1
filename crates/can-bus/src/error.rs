//! Receive Path Error Types

use can_frame::InvalidFrame;
use ring_buffer::BufferFull;
use thiserror::Error;

/// Bus reset refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResetError {
    /// Another context is already resetting the bus
    #[error("Bus reset already in progress")]
    AlreadyInProgress,
}

/// Errors returned by the receive path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// Malformed frame from the driver
    #[error("Invalid frame: {0}")]
    Invalid(#[from] InvalidFrame),

    /// 29-bit frame on a bus configured for standard identifiers only
    #[error("Extended identifier {0:#X} not accepted on this bus")]
    ExtendedNotAccepted(u32),

    /// Ring full after the overflow policy gave up
    #[error("Frame dropped: {0}")]
    Full(#[from] BufferFull),

    /// Frame refused or reset refused because a reset is running
    #[error(transparent)]
    Reset(#[from] ResetError),
}
