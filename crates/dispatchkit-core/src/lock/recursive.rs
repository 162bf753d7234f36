//! Recursive (reentrant) pthread mutex

use crate::lock::raw::RawPthreadMutex;
use crate::lock::{Lockable, MutexError};

/// Recursive wrapper around an OS `pthread_mutex_t`
///
/// The owning thread may call `lock` any number of nested times without
/// self-deadlock; each nested acquisition requires one matching `unlock`
/// before another thread can acquire the mutex. Ownership transfer across
/// threads without a full unwind is not supported.
pub struct RecursiveMutex {
    raw: RawPthreadMutex,
}

impl RecursiveMutex {
    /// Create a new recursive mutex.
    ///
    /// Construction is the only fallible step; see [`MutexError`].
    pub fn new() -> Result<Self, MutexError> {
        Ok(Self {
            raw: RawPthreadMutex::new(libc::PTHREAD_MUTEX_RECURSIVE)?,
        })
    }
}

impl Lockable for RecursiveMutex {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursive_mutex_creation() {
        assert!(RecursiveMutex::new().is_ok());
    }

    #[test]
    fn test_recursive_mutex_creation_failure_surfaces() {
        use crate::lock::raw::instrument;

        instrument::FAIL_ATTR_INIT.with(|f| f.set(true));
        let result = RecursiveMutex::new();
        assert_eq!(result.err(), Some(MutexError::CannotCreateMutexAttributes));

        instrument::FAIL_MUTEX_INIT.with(|f| f.set(true));
        let result = RecursiveMutex::new();
        assert_eq!(result.err(), Some(MutexError::CannotCreateMutex));
    }

    #[test]
    fn test_recursive_mutex_same_thread_reentry() {
        let mutex = RecursiveMutex::new().unwrap();

        mutex.lock();
        mutex.lock();
        // try_lock from the owner counts as another nested acquisition
        assert!(mutex.try_lock());

        mutex.unlock();
        mutex.unlock();
        mutex.unlock();
    }
}
