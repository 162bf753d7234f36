//! The lock capability contract

use crate::lock::LockGuard;

/// Capability contract for mutual-exclusion primitives
///
/// Any type implementing this trait can be used interchangeably by generic
/// callers that need "a lock". The contract is deliberately minimal:
/// - `lock` blocks until exclusive ownership is acquired, with no timeout.
/// - `unlock` is only valid after a matching successful `lock`/`try_lock`
///   by the same owner; anything else is a precondition violation.
/// - `try_lock` never blocks.
///
/// No cancellation exists at this layer. Callers needing bounded waits must
/// poll `try_lock`.
pub trait Lockable {
    /// Block the calling thread until exclusive ownership is acquired.
    fn lock(&self);

    /// Release ownership acquired by a prior `lock` or successful `try_lock`.
    fn unlock(&self);

    /// Attempt immediate acquisition without blocking.
    ///
    /// Returns `true` with ownership held, or `false` if the lock is
    /// unavailable.
    fn try_lock(&self) -> bool;

    /// Lock and return an RAII guard that unlocks on drop.
    fn guard(&self) -> LockGuard<'_, Self>
    where
        Self: Sized,
    {
        self.lock();
        LockGuard::new(self)
    }

    /// Try to lock, returning an RAII guard on success.
    fn try_guard(&self) -> Option<LockGuard<'_, Self>>
    where
        Self: Sized,
    {
        if self.try_lock() {
            Some(LockGuard::new(self))
        } else {
            None
        }
    }
}
