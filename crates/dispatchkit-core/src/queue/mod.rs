//! Dispatch queues: serial, main, and global execution contexts
//!
//! A `DispatchQueue` is a thin ownership wrapper over a set of worker
//! threads consuming submitted closures. Callers submit work synchronously
//! or asynchronously and can ask whether they are already running on a
//! given queue, which is what makes synchronous self-submission safe.

mod dispatch;
mod id;

pub use dispatch::{DispatchQueue, QueueKind};
pub use id::QueueId;
