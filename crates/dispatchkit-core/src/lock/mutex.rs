//! Non-recursive pthread mutex

use crate::lock::raw::RawPthreadMutex;
use crate::lock::{Lockable, MutexError};

/// Plain (non-recursive) wrapper around an OS `pthread_mutex_t`
///
/// A second `lock` from the owning thread deadlocks and a second `try_lock`
/// from it fails; use [`RecursiveMutex`](crate::lock::RecursiveMutex) where
/// same-owner reentrancy is needed.
pub struct Mutex {
    raw: RawPthreadMutex,
}

impl Mutex {
    /// Create a new mutex.
    ///
    /// Construction is the only fallible step; see [`MutexError`].
    pub fn new() -> Result<Self, MutexError> {
        Ok(Self {
            raw: RawPthreadMutex::new(libc::PTHREAD_MUTEX_NORMAL)?,
        })
    }
}

impl Lockable for Mutex {
    fn lock(&self) {
        self.raw.lock();
    }

    fn unlock(&self) {
        self.raw.unlock();
    }

    fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }
}
