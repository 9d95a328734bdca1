//! Receive path configuration

use serde::{Deserialize, Serialize};

/// What the producer does when the ring is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Reject the frame and count it as dropped
    #[default]
    Drop,
    /// Spin and retry up to `attempts` more times before dropping.
    ///
    /// Only useful when the producer runs on its own thread: an interrupt
    /// handler that spins keeps the consumer from draining the ring, so ISR
    /// producers should use `Drop`.
    Retry { attempts: u8 },
}

/// Receive path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Behavior when the ring buffer is full
    pub overflow: OverflowPolicy,

    /// Accept 29-bit identifiers (false on a standard-only bus)
    pub accept_extended: bool,

    /// Emit a debug event for every dropped frame
    pub log_drops: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::Drop,
            accept_extended: true,
            log_drops: true,
        }
    }
}

impl BusConfig {
    /// Standard-only bus, drop on overflow
    pub fn strict() -> Self {
        Self {
            accept_extended: false,
            ..Default::default()
        }
    }

    /// Retry on overflow before giving up
    pub fn lenient() -> Self {
        Self {
            overflow: OverflowPolicy::Retry { attempts: 64 },
            ..Default::default()
        }
    }
}
