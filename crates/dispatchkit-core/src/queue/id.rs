//! Queue identity

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a dispatch queue
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct QueueId(u64);

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

impl QueueId {
    /// Generate a new unique QueueId
    pub fn new() -> Self {
        QueueId(NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Default for QueueId {
    fn default() -> Self {
        Self::new()
    }
}
