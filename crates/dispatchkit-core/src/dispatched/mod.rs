//! Dispatched values: thread-safe containers bound to a dispatch queue
//!
//! Every read and write of a dispatched value happens inside a task
//! submitted to the value's bound queue, so callers on any thread get
//! serialized access without touching a lock themselves.

mod cell;
mod value;

pub use value::DispatchedValue;

/// Thread-safe boolean value
pub type DispatchedBool = DispatchedValue<bool>;

/// Thread-safe 32-bit signed integer value
pub type DispatchedI32 = DispatchedValue<i32>;

/// Thread-safe 64-bit signed integer value
pub type DispatchedI64 = DispatchedValue<i64>;

/// Thread-safe 64-bit unsigned integer value
pub type DispatchedU64 = DispatchedValue<u64>;

/// Thread-safe pointer-sized unsigned integer value
pub type DispatchedUsize = DispatchedValue<usize>;

/// Thread-safe 64-bit floating point value
pub type DispatchedF64 = DispatchedValue<f64>;

/// Thread-safe string value
pub type DispatchedString = DispatchedValue<String>;
