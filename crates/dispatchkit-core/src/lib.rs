//! Dispatchkit Core
//!
//! This crate provides serialized-access concurrency primitives:
//! - Lock capability (`Lockable`) with pthread-backed mutexes
//! - Dispatch queues (serial, main, global) with sync/async submission
//! - Dispatched values (thread-safe value containers bound to a queue)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod lock;
pub mod queue;
pub mod dispatched;

pub use lock::{LockGuard, Lockable, Mutex, MutexError, RecursiveMutex};
pub use queue::{DispatchQueue, QueueId, QueueKind};
pub use dispatched::DispatchedValue;
