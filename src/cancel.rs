//! Cooperative cancellation for long-running joins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag checked between candidate pairs.
///
/// Cancelling one clone is observed by all others. The join stops at the next
/// pair boundary and returns [`QuadJoinError::Cancelled`](crate::QuadJoinError::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
