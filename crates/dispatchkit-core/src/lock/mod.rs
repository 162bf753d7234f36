//! Lock capability and pthread-backed mutual exclusion primitives
//!
//! Every lock in this module implements the `Lockable` contract, so generic
//! callers can take any mutual-exclusion primitive interchangeably. The
//! concrete locks wrap an OS `pthread_mutex_t`: construction is the single
//! fallible step, and lock/unlock/try_lock are infallible once the mutex
//! exists.

mod guard;
mod lockable;
mod mutex;
mod raw;
mod recursive;

pub use guard::LockGuard;
pub use lockable::Lockable;
pub use mutex::Mutex;
pub use raw::MutexError;
pub use recursive::RecursiveMutex;
