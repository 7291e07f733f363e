//! Single-flight guards.
//!
//! A [`RunSlot`] admits at most one holder at a time. Claiming returns a
//! guard whose drop releases the slot, so a panicking or early-returning
//! pass can never wedge the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Mutual-exclusion slot for one named operation.
#[derive(Clone)]
pub struct RunSlot {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl RunSlot {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Try to claim the slot. `None` when a previous claim is still
    /// held.
    #[must_use]
    pub fn try_claim(&self) -> Option<RunGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether the slot is currently held.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// The slot's name, for log messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Held claim on a [`RunSlot`]; releases on drop.
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_refused_until_release() {
        let slot = RunSlot::new("sync");
        let guard = slot.try_claim().expect("first claim");
        assert!(slot.is_busy());
        assert!(slot.try_claim().is_none());

        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_claim().is_some());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let slot = RunSlot::new("restore");
        let other = slot.clone();
        let _guard = slot.try_claim().expect("first claim");
        assert!(other.try_claim().is_none());
        assert!(other.is_busy());
    }
}
