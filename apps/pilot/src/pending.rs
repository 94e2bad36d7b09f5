use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-surface in-flight flag. While a guard is alive the surface rejects re-entry.
/// There is no queue behind it: a second caller is refused, not delayed.
#[derive(Debug, Clone)]
pub struct PendingFlag {
    name: &'static str,
    raised: Arc<AtomicBool>,
}

impl PendingFlag {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_pending(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Raises the flag, or returns `None` when a call is already in flight.
    pub fn try_raise(&self) -> Option<PendingGuard> {
        self.raised
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard {
                raised: Arc::clone(&self.raised),
            })
    }
}

/// Lowers the flag on drop.
#[derive(Debug)]
pub struct PendingGuard {
    raised: Arc<AtomicBool>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.raised.store(false, Ordering::Release);
    }
}
