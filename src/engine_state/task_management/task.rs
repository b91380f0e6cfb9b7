//! # Task System Core Types
//!
//! This module defines the fundamental building blocks of the worker pool.
//!
//! ## Core Components
//! - `Task`: A unit of work executed on a worker thread against that worker's
//!   private context
//! - `RequestId`: Identifier handed out when a task is published
//! - `Completed`: A finished task travelling back to the control thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is published via `WorkerPool::publish()` and receives a `RequestId`
//! 2. The pool sends it to a free worker, or queues it while all workers are busy
//! 3. The worker calls `process()` with its own context
//! 4. The task and its outcome come back as a `Completed` from `poll_completed()`

use std::fmt;

use crate::error::TaskError;

/// A unit of work that runs on a worker thread.
///
/// Every worker owns one `Context` for its whole lifetime, so a task may
/// keep reusable state there (caches, generators) without any locking.
///
/// # Implementation Guidelines
/// - The task must own all the data it needs (`Send + 'static`)
/// - `process` must not depend on which worker runs it if outputs are
///   expected to be reproducible
pub trait Task: Send + 'static {
    /// Per-worker state handed to every task that worker runs.
    type Context: Send + 'static;
    /// Value sent back to the control thread.
    type Output: Send + 'static;

    /// Performs the work.
    ///
    /// A panic here is caught by the worker and reported as
    /// [`TaskError::Panicked`]; the worker keeps serving later tasks.
    fn process(&self, context: &mut Self::Context) -> Self::Output;
}

/// Identifies one published task. Ids increase monotonically per pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A task paired with its request id while it waits or travels to a worker.
#[derive(Debug)]
pub struct Envelope<T> {
    /// Id assigned by `publish`.
    pub request_id: RequestId,
    /// The task itself.
    pub task: T,
}

/// A task that finished on a worker, successfully or not.
pub struct Completed<T: Task> {
    /// Id assigned when the task was published.
    pub request_id: RequestId,
    /// Index of the worker that ran the task.
    pub worker: usize,
    /// The task, returned so the caller can inspect its inputs.
    pub task: T,
    /// The task's output, or why there is none.
    pub outcome: Result<T::Output, TaskError>,
}

impl<T: Task + fmt::Debug> fmt::Debug for Completed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completed")
            .field("request_id", &self.request_id)
            .field("worker", &self.worker)
            .field("task", &self.task)
            .field("ok", &self.outcome.is_ok())
            .finish()
    }
}
