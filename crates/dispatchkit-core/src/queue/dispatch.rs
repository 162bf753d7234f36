//! Dispatch queue implementation

use crossbeam::channel::{self, Receiver, Sender};
use once_cell::sync::Lazy;
use parking_lot::Mutex as ParkingLotMutex;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::queue::QueueId;

/// A unit of work submitted to a queue
type Job = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    /// The queue whose worker owns the current thread, if any
    static CURRENT_QUEUE: Cell<Option<QueueId>> = Cell::new(None);
}

/// Concurrency kind of a dispatch queue
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueueKind {
    /// The process-wide serial "main" queue
    Main,
    /// The process-wide concurrent queue (one worker per CPU)
    Global,
    /// A custom serial queue with its own dedicated worker
    Serial,
}

/// Handle to an execution queue
///
/// Cloning the handle shares the same underlying queue; the workers are
/// torn down when the last handle is dropped. The well-known queues
/// ([`DispatchQueue::main`] and [`DispatchQueue::global`]) live for the
/// whole process.
///
/// Serial queues (including "main") run submitted closures one at a time in
/// FIFO submission order. The global queue runs closures on a pool sized to
/// the CPU count and guarantees no relative ordering between two
/// submissions.
#[derive(Clone)]
pub struct DispatchQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    id: QueueId,
    label: String,
    kind: QueueKind,
    // Declared before `workers` so the channel disconnects before the join.
    sender: Sender<Job>,
    workers: WorkerSet,
}

struct WorkerSet {
    queue_id: QueueId,
    handles: ParkingLotMutex<Vec<thread::JoinHandle<()>>>,
}

impl Drop for WorkerSet {
    fn drop(&mut self) {
        // A worker cannot join itself; if the last handle died on one of
        // this queue's own threads, the workers exit on channel disconnect.
        if CURRENT_QUEUE.with(|current| current.get()) == Some(self.queue_id) {
            return;
        }

        for handle in self.handles.lock().drain(..) {
            let _ = handle.join();
        }
    }
}

/// Process-wide serial queue standing in for the platform main queue.
///
/// There is no runtime-owned main thread to bind to, so the queue runs on a
/// dedicated thread created on first use. Identity semantics are unchanged:
/// synchronous submission from its own thread executes inline.
static MAIN_QUEUE: Lazy<DispatchQueue> =
    Lazy::new(|| DispatchQueue::with_kind("main", QueueKind::Main, 1));

static GLOBAL_QUEUE: Lazy<DispatchQueue> =
    Lazy::new(|| DispatchQueue::with_kind("global", QueueKind::Global, num_cpus::get().max(1)));

impl DispatchQueue {
    /// Create a custom serial queue with a dedicated worker thread.
    ///
    /// Submitted closures run one at a time, in submission order.
    pub fn serial(label: &str) -> Self {
        Self::with_kind(label, QueueKind::Serial, 1)
    }

    /// The process-wide serial "main" queue, created on first use.
    pub fn main() -> Self {
        MAIN_QUEUE.clone()
    }

    /// The process-wide concurrent queue, created on first use.
    ///
    /// No ordering is guaranteed between two submissions; callers needing
    /// serialization on this queue must bring their own lock.
    pub fn global() -> Self {
        GLOBAL_QUEUE.clone()
    }

    fn with_kind(label: &str, kind: QueueKind, worker_count: usize) -> Self {
        let id = QueueId::new();
        let (sender, receiver) = channel::unbounded::<Job>();

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-worker-{}", label, index))
                .spawn(move || Self::run_loop(id, receiver))
                .expect("Failed to spawn queue worker thread");
            handles.push(handle);
        }

        Self {
            inner: Arc::new(QueueInner {
                id,
                label: label.to_string(),
                kind,
                sender,
                workers: WorkerSet {
                    queue_id: id,
                    handles: ParkingLotMutex::new(handles),
                },
            }),
        }
    }

    /// Worker thread main loop
    fn run_loop(id: QueueId, receiver: Receiver<Job>) {
        // Tag the thread with its queue identity for `is_current`
        CURRENT_QUEUE.with(|current| current.set(Some(id)));

        // Exits when every queue handle is gone and the channel drains
        while let Ok(job) = receiver.recv() {
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                #[cfg(debug_assertions)]
                eprintln!("queue {}: submitted task panicked", id.as_u64());
            }
        }
    }

    /// Check whether the calling thread is one of this queue's workers.
    ///
    /// This is the identity test that makes synchronous self-submission
    /// safe: `submit_sync` from a task already on the queue executes inline
    /// instead of re-entering it.
    pub fn is_current(&self) -> bool {
        CURRENT_QUEUE.with(|current| current.get()) == Some(self.inner.id)
    }

    /// Submit a closure and block until it has run, returning its result.
    ///
    /// If the caller is already running on this queue the closure executes
    /// inline, never re-enqueued, so synchronous self-submission cannot
    /// deadlock. A panic inside the closure is caught on the worker and
    /// resumed on the calling thread.
    pub fn submit_sync<R, F>(&self, work: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return work();
        }

        let (done, wait) = channel::bounded(1);
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(work));
            let _ = done.send(result);
        });

        // The channel stays open while any handle is alive, and we hold one
        self.inner
            .sender
            .send(job)
            .expect("queue channel closed while a handle is alive");

        match wait
            .recv()
            .expect("queue worker dropped a synchronous task")
        {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Submit a closure for execution and return immediately.
    pub fn submit_async<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(work);
        self.inner
            .sender
            .send(job)
            .expect("queue channel closed while a handle is alive");
    }

    /// This queue's unique identity.
    pub fn id(&self) -> QueueId {
        self.inner.id
    }

    /// The label given at creation ("main"/"global" for the shared queues).
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The concurrency kind of this queue.
    pub fn kind(&self) -> QueueKind {
        self.inner.kind
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("kind", &self.inner.kind)
            .finish()
    }
}
