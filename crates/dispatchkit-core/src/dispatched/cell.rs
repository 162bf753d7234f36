//! Reentrancy-safe storage cell for dispatched values

use parking_lot::ReentrantMutex;
use std::cell::UnsafeCell;

/// Storage cell granting serialized, same-thread-reentrant value access
///
/// Cross-thread access is serialized by a reentrant lock. The thread holding
/// the cell may re-enter it, so an operation reaching the same value from
/// inside an enclosing `execute` closure completes instead of blocking on
/// the lock that closure already holds.
pub(crate) struct ValueCell<T> {
    lock: ReentrantMutex<()>,
    value: UnsafeCell<T>,
}

// Safety: the value is only reached while the lock is held, so the cell is
// as thread-safe as a mutex over T.
unsafe impl<T: Send> Send for ValueCell<T> {}
unsafe impl<T: Send> Sync for ValueCell<T> {}

impl<T> ValueCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            lock: ReentrantMutex::new(()),
            value: UnsafeCell::new(value),
        }
    }

    /// Run `f` with exclusive mutable access to the stored value.
    ///
    /// Never blocks when the calling thread already holds the cell; that is
    /// what keeps nested same-value operations inside `execute` from
    /// deadlocking.
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let _guard = self.lock.lock();
        // Safety: other threads are excluded by the lock, and same-thread
        // re-entry is strictly nested, so this frame's access to the value
        // ends before any outer frame touches it again.
        f(unsafe { &mut *self.value.get() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_cell_basic_access() {
        let cell = ValueCell::new(1);
        cell.with_mut(|v| *v += 1);
        assert_eq!(cell.with_mut(|v| *v), 2);
    }

    #[test]
    fn test_cell_reentrant_access_same_thread() {
        let cell = Arc::new(ValueCell::new(1));
        let alias = cell.clone();

        let observed = cell.with_mut(|v| {
            *v += 1;
            alias.with_mut(|v| *v)
        });
        assert_eq!(observed, 2);
    }

    #[test]
    fn test_cell_excludes_other_threads() {
        const THREADS: usize = 8;
        const ITERATIONS: usize = 1000;

        let cell = Arc::new(ValueCell::new(0usize));

        let mut handles = Vec::with_capacity(THREADS);
        for _ in 0..THREADS {
            let cell = cell.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    cell.with_mut(|v| *v += 1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cell.with_mut(|v| *v), THREADS * ITERATIONS);
    }
}
