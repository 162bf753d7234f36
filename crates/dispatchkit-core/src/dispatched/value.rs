//! Generic dispatched value container

use std::sync::Arc;

use crate::dispatched::cell::ValueCell;
use crate::queue::DispatchQueue;

/// A value whose every access is funneled through one dispatch queue
///
/// All reads, writes, and mutations run inside tasks submitted to the bound
/// queue, giving mutual exclusion and a happens-before ordering between a
/// completed write and any later read. On a serial queue, operations on the
/// value are totally ordered; on the global queue, the internal cell still
/// guarantees exclusion, but no cross-task ordering beyond it.
///
/// Operations are safe to call from any context, including from a task
/// already running on the bound queue and from inside the value's own
/// `execute` closure: the queue submission executes inline in that case, and
/// the storage cell is reentrant for the thread holding it.
///
/// The value keeps a strong handle to its queue, so the queue cannot be torn
/// down while the value is alive.
///
/// `Clone` shares the same stored value and queue (reference semantics).
pub struct DispatchedValue<T> {
    value: Arc<ValueCell<T>>,
    queue: DispatchQueue,
}

impl<T: Send + 'static> DispatchedValue<T> {
    /// Create a dispatched value bound to the given queue.
    pub fn new(value: T, queue: &DispatchQueue) -> Self {
        Self {
            value: Arc::new(ValueCell::new(value)),
            queue: queue.clone(),
        }
    }

    /// Create a dispatched value holding `T::default()`.
    pub fn with_default(queue: &DispatchQueue) -> Self
    where
        T: Default,
    {
        Self::new(T::default(), queue)
    }

    /// Read the value through the bound queue.
    ///
    /// Returns the value observed at the time the read task ran. Linearizes
    /// after every write whose submission happened-before this call.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        let value = self.value.clone();
        self.queue.submit_sync(move || value.with_mut(|v| v.clone()))
    }

    /// Replace the value through the bound queue.
    ///
    /// Once this returns, any subsequent `get` from any caller observes
    /// `new_value` or a later write, never an earlier one.
    pub fn set(&self, new_value: T) {
        let value = self.value.clone();
        self.queue.submit_sync(move || {
            value.with_mut(|v| *v = new_value);
        });
    }

    /// Run a closure with exclusive mutable access to the value, returning
    /// its result.
    ///
    /// This is the composable primitive: `get` and `set` are trivial
    /// executes. The closure runs inside a task on the bound queue and is
    /// the only way to reach the value mutably.
    pub fn execute<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let value = self.value.clone();
        self.queue.submit_sync(move || value.with_mut(f))
    }

    /// Run a closure with exclusive mutable access, without waiting for it.
    ///
    /// Asynchronous variant of [`execute`](Self::execute) for mutations
    /// whose result the caller does not need.
    pub fn execute_async<F>(&self, f: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        let value = self.value.clone();
        self.queue.submit_async(move || {
            value.with_mut(f);
        });
    }

    /// The queue this value is bound to.
    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }
}

impl<T> Clone for DispatchedValue<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            queue: self.queue.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatched_value_get_set() {
        let queue = DispatchQueue::serial("test-value");
        let value = DispatchedValue::new(1, &queue);

        assert_eq!(value.get(), 1);
        value.set(2);
        assert_eq!(value.get(), 2);
    }

    #[test]
    fn test_dispatched_value_default() {
        let queue = DispatchQueue::serial("test-default");
        let value: DispatchedValue<i64> = DispatchedValue::with_default(&queue);

        assert_eq!(value.get(), 0);
    }

    #[test]
    fn test_dispatched_value_execute_returns_result() {
        let queue = DispatchQueue::serial("test-execute");
        let value = DispatchedValue::new(10, &queue);

        let doubled = value.execute(|v| {
            *v *= 2;
            *v
        });
        assert_eq!(doubled, 20);
        assert_eq!(value.get(), 20);
    }

    #[test]
    fn test_dispatched_value_execute_async() {
        let queue = DispatchQueue::serial("test-execute-async");
        let value = DispatchedValue::new(0, &queue);

        value.execute_async(|v| *v += 5);

        // Serial queue: the following read is ordered after the mutation
        assert_eq!(value.get(), 5);
    }

    #[test]
    fn test_dispatched_value_clone_shares_storage() {
        let queue = DispatchQueue::serial("test-clone");
        let value = DispatchedValue::new(String::from("a"), &queue);
        let alias = value.clone();

        alias.set(String::from("b"));
        assert_eq!(value.get(), "b");
        assert_eq!(value.queue().id(), alias.queue().id());
    }

    #[test]
    fn test_nested_get_inside_execute() {
        let queue = DispatchQueue::serial("test-nested");
        let value = DispatchedValue::new(1i64, &queue);

        // An alias reaching the same storage from inside the closure must
        // complete inline, not block on the access the closure holds
        let alias = value.clone();
        let observed = value.execute(move |v| {
            *v += 1;
            alias.get()
        });
        assert_eq!(observed, 2);
        assert_eq!(value.get(), 2);
    }
}
