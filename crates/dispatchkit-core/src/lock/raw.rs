//! Raw pthread mutex plumbing shared by the concrete lock types

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// Errors that can occur when constructing a mutex
///
/// Construction is the only fallible operation on a mutex; once it exists,
/// lock/unlock/try_lock do not report errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MutexError {
    /// The OS failed to initialize the mutex attribute storage
    #[error("Cannot create mutex attributes")]
    CannotCreateMutexAttributes,

    /// The OS failed to initialize the mutex itself
    #[error("Cannot create mutex")]
    CannotCreateMutex,
}

/// Test instrumentation for the OS allocation calls: injectable failures
/// plus live-resource counters proving init/destroy stay paired. All state
/// is thread-local so parallel tests cannot interfere with each other.
#[cfg(test)]
pub(crate) mod instrument {
    use std::cell::Cell;

    thread_local! {
        /// Makes the next attribute initialization on this thread fail
        pub(crate) static FAIL_ATTR_INIT: Cell<bool> = Cell::new(false);
        /// Makes the next mutex initialization on this thread fail
        pub(crate) static FAIL_MUTEX_INIT: Cell<bool> = Cell::new(false);
        /// Attribute objects initialized minus destroyed on this thread
        pub(crate) static LIVE_ATTRS: Cell<isize> = Cell::new(0);
        /// OS mutexes initialized minus destroyed on this thread
        pub(crate) static LIVE_MUTEXES: Cell<isize> = Cell::new(0);
    }
}

/// # Safety
/// `attr` must point to writable attribute storage.
unsafe fn attr_init(attr: *mut libc::pthread_mutexattr_t) -> libc::c_int {
    #[cfg(test)]
    if instrument::FAIL_ATTR_INIT.with(|f| f.replace(false)) {
        return libc::EAGAIN;
    }

    let rc = libc::pthread_mutexattr_init(attr);
    #[cfg(test)]
    if rc == 0 {
        instrument::LIVE_ATTRS.with(|c| c.set(c.get() + 1));
    }
    rc
}

/// # Safety
/// `attr` must point to initialized attribute storage.
unsafe fn attr_destroy(attr: *mut libc::pthread_mutexattr_t) {
    libc::pthread_mutexattr_destroy(attr);
    #[cfg(test)]
    instrument::LIVE_ATTRS.with(|c| c.set(c.get() - 1));
}

/// # Safety
/// `mutex` must point to writable mutex storage and `attr` to initialized
/// attribute storage.
unsafe fn mutex_init(
    mutex: *mut libc::pthread_mutex_t,
    attr: *const libc::pthread_mutexattr_t,
) -> libc::c_int {
    #[cfg(test)]
    if instrument::FAIL_MUTEX_INIT.with(|f| f.replace(false)) {
        return libc::EAGAIN;
    }

    let rc = libc::pthread_mutex_init(mutex, attr);
    #[cfg(test)]
    if rc == 0 {
        instrument::LIVE_MUTEXES.with(|c| c.set(c.get() + 1));
    }
    rc
}

/// # Safety
/// `mutex` must point to an initialized, unlocked mutex.
unsafe fn mutex_destroy(mutex: *mut libc::pthread_mutex_t) {
    libc::pthread_mutex_destroy(mutex);
    #[cfg(test)]
    instrument::LIVE_MUTEXES.with(|c| c.set(c.get() - 1));
}

/// Scoped owner of a `pthread_mutexattr_t`
///
/// The attribute storage is only needed while the mutex is being initialized;
/// dropping this releases it on every exit path, including construction
/// failure.
struct MutexAttr {
    attr: libc::pthread_mutexattr_t,
}

impl MutexAttr {
    fn new() -> Result<Self, MutexError> {
        let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();

        if unsafe { attr_init(attr.as_mut_ptr()) } != 0 {
            return Err(MutexError::CannotCreateMutexAttributes);
        }

        Ok(Self {
            attr: unsafe { attr.assume_init() },
        })
    }

    fn set_kind(&mut self, kind: libc::c_int) {
        unsafe {
            libc::pthread_mutexattr_settype(&mut self.attr, kind);
        }
    }

    fn as_ptr(&self) -> *const libc::pthread_mutexattr_t {
        &self.attr
    }
}

impl Drop for MutexAttr {
    fn drop(&mut self) {
        unsafe {
            attr_destroy(&mut self.attr);
        }
    }
}

/// Exclusive owner of one OS mutex handle
///
/// The handle is boxed so its address never changes after
/// `pthread_mutex_init`; pthread mutexes are not relocatable. The type is
/// deliberately not `Clone`: duplicating the handle would break OS-level
/// mutex identity. The OS mutex is destroyed exactly once, on drop.
pub(crate) struct RawPthreadMutex {
    handle: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

// The handle is heap-pinned and pthread mutexes may be locked and unlocked
// from any thread, subject to the usual pthread ownership rules.
unsafe impl Send for RawPthreadMutex {}
unsafe impl Sync for RawPthreadMutex {}

impl RawPthreadMutex {
    /// Allocate and initialize an OS mutex of the given pthread kind.
    ///
    /// Fails with `CannotCreateMutexAttributes` if the attribute storage
    /// cannot be initialized, and with `CannotCreateMutex` if the mutex
    /// itself cannot be. No OS resource is left allocated on failure.
    pub(crate) fn new(kind: libc::c_int) -> Result<Self, MutexError> {
        let mut attr = MutexAttr::new()?;
        attr.set_kind(kind);

        let handle = Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));

        if unsafe { mutex_init(handle.get(), attr.as_ptr()) } != 0 {
            return Err(MutexError::CannotCreateMutex);
        }

        Ok(Self { handle })
    }

    pub(crate) fn lock(&self) {
        unsafe {
            libc::pthread_mutex_lock(self.handle.get());
        }
    }

    pub(crate) fn unlock(&self) {
        unsafe {
            libc::pthread_mutex_unlock(self.handle.get());
        }
    }

    pub(crate) fn try_lock(&self) -> bool {
        unsafe { libc::pthread_mutex_trylock(self.handle.get()) == 0 }
    }
}

impl Drop for RawPthreadMutex {
    fn drop(&mut self) {
        // Destroying a locked mutex is a caller precondition violation
        // inherited from the pthread primitive.
        unsafe {
            mutex_destroy(self.handle.get());
        }
    }
}
