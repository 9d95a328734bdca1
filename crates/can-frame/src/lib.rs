//! CAN Frame Types
//!
//! Validated CAN 2.0A/2.0B frames and the payload checksum helpers used by
//! the receive path. A [`Frame`] can only be obtained through validation,
//! so downstream code never re-checks its fields.

mod checksum;
mod error;
mod frame;

pub use checksum::{checksum, legacy_checksum16};
pub use error::InvalidFrame;
pub use frame::{make_frame, Frame};

/// Maximum payload length of a classic CAN frame
pub const MAX_DLC: usize = 8;

/// Largest 11-bit (CAN 2.0A) identifier
pub const STANDARD_ID_MAX: u32 = 0x7FF;

/// Largest 29-bit (CAN 2.0B) identifier
pub const EXTENDED_ID_MAX: u32 = 0x1FFF_FFFF;
