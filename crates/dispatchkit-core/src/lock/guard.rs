//! RAII guard for automatic unlock

use crate::lock::Lockable;

/// RAII guard over any `Lockable` (auto-unlocks on drop)
///
/// The guard ensures the lock is released when it goes out of scope, even
/// on panic, so an unlock can never be forgotten or performed twice.
pub struct LockGuard<'a, L: Lockable> {
    /// The lock being held
    lock: &'a L,
    /// Whether the guard has been manually unlocked
    released: bool,
}

impl<'a, L: Lockable> LockGuard<'a, L> {
    /// Create a guard for a lock the caller has already acquired.
    pub(crate) fn new(lock: &'a L) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Manually unlock early (before drop).
    pub fn unlock(mut self) {
        self.released = true;
        self.lock.unlock();
    }
}

impl<L: Lockable> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        if !self.released {
            self.lock.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::lock::{Lockable, Mutex};

    #[test]
    fn test_guard_auto_unlock() {
        let mutex = Mutex::new().unwrap();

        {
            let _guard = mutex.guard();
            assert!(!mutex.try_lock());
        } // Guard dropped here

        assert!(mutex.try_lock());
        mutex.unlock();
    }

    #[test]
    fn test_guard_manual_unlock() {
        let mutex = Mutex::new().unwrap();

        let guard = mutex.guard();
        assert!(!mutex.try_lock());

        guard.unlock();
        assert!(mutex.try_lock());
        mutex.unlock();
    }

    #[test]
    fn test_try_guard() {
        let mutex = Mutex::new().unwrap();

        let guard = mutex.try_guard();
        assert!(guard.is_some());

        // Lock is held by the guard
        assert!(mutex.try_guard().is_none());

        drop(guard);
        assert!(mutex.try_guard().is_some());
    }
}
