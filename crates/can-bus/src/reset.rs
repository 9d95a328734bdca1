//! Bus reset state machine
//!
//! `Idle -> Resetting -> Idle`, with the first transition taken by a single
//! compare-and-swap. A second reset requested while one is running gets
//! [`ResetError::AlreadyInProgress`]; nothing ever waits on the state.

use crate::error::ResetError;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::warn;

/// Reset state of the bus
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Idle = 0,
    Resetting = 1,
}

impl From<u8> for BusState {
    fn from(value: u8) -> Self {
        match value {
            1 => BusState::Resetting,
            _ => BusState::Idle,
        }
    }
}

/// Non-reentrant reset guard shared by every context on the bus
#[derive(Debug, Default)]
pub struct ResetController {
    state: AtomicU8,
}

impl ResetController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> BusState {
        BusState::from(self.state.load(Ordering::Acquire))
    }

    /// Whether a reset is running
    pub fn is_resetting(&self) -> bool {
        self.state() == BusState::Resetting
    }

    /// Enter `Resetting`; the state returns to `Idle` when the guard drops
    pub fn begin(&self) -> Result<ResetGuard<'_>, ResetError> {
        self.state
            .compare_exchange(
                BusState::Idle as u8,
                BusState::Resetting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| {
                warn!("Bus reset requested while another reset is running");
                ResetError::AlreadyInProgress
            })?;
        Ok(ResetGuard { controller: self })
    }

    /// Run `action` while in `Resetting`
    pub fn run<R>(&self, action: impl FnOnce() -> R) -> Result<R, ResetError> {
        let _guard = self.begin()?;
        Ok(action())
    }
}

/// Holds the bus in `Resetting`; returns it to `Idle` on drop, including
/// during unwinding
#[derive(Debug)]
pub struct ResetGuard<'a> {
    controller: &'a ResetController,
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.controller
            .state
            .store(BusState::Idle as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_idle_resetting_idle() {
        let controller = ResetController::new();
        assert_eq!(controller.state(), BusState::Idle);

        let guard = controller.begin().unwrap();
        assert_eq!(controller.state(), BusState::Resetting);
        drop(guard);

        assert_eq!(controller.state(), BusState::Idle);
    }

    #[test]
    fn test_reentrant_reset_refused() {
        let controller = ResetController::new();
        let result = controller.run(|| controller.run(|| ()));
        assert_eq!(result, Ok(Err(ResetError::AlreadyInProgress)));

        // Outer reset completed, a new one is allowed
        assert!(controller.run(|| ()).is_ok());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let controller = ResetController::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            controller.run(|| panic!("reset failed"))
        }));
        assert!(outcome.is_err());
        assert_eq!(controller.state(), BusState::Idle);
    }

    #[test]
    fn test_concurrent_resets_exclusive() {
        let controller = ResetController::new();
        let inside = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1_000 {
                        let _ = controller.run(|| {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            inside.fetch_sub(1, Ordering::SeqCst);
                            completed.fetch_add(1, Ordering::Relaxed);
                        });
                    }
                });
            }
        });

        assert!(completed.load(Ordering::Relaxed) > 0);
        assert_eq!(controller.state(), BusState::Idle);
    }
}
