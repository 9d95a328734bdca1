//! Frame Validation Errors

use thiserror::Error;

/// Reasons a frame is refused at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidFrame {
    /// Declared length larger than a classic CAN payload
    #[error("Data length {0} exceeds the 8-byte CAN payload")]
    LengthOutOfRange(usize),

    /// Identifier does not fit in 11 bits
    #[error("Standard identifier {0:#X} exceeds 0x7FF")]
    StandardIdOutOfRange(u32),

    /// Identifier does not fit in 29 bits
    #[error("Extended identifier {0:#X} exceeds 0x1FFFFFFF")]
    ExtendedIdOutOfRange(u32),

    /// Source buffer is shorter than the declared length
    #[error("Payload holds {available} bytes but length is {length}")]
    ShortPayload { length: usize, available: usize },
}
