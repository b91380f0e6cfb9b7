//! # Task Management System
//!
//! This module provides a fixed pool of worker threads for executing tasks off
//! the control thread.
//!
//! ## Architecture Overview
//!
//! - `WorkerPool`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work run against a per-worker context
//! - `TaskChannel`: The control thread's handle on one worker
//!
//! Each worker has a dedicated task channel and at most `MAX_TASKS_IN_FLIGHT`
//! tasks outstanding. Tasks are handed out round-robin starting after the
//! last worker used; when every worker is busy they wait in a FIFO queue that
//! `process_queued_tasks()` drains as workers free up. All workers report
//! through one shared result channel.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `WorkerPool::publish()`
//! 2. The pool sends them to available workers, or queues them
//! 3. Workers process tasks and send back a `Completed`
//! 4. The control thread drains results with `poll_completed()` or
//!    `wait_completed()`
//!
//! A panicking task is caught on its worker and comes back as an error
//! outcome. The worker stays alive. A worker whose channel has closed is
//! retired; once no worker is left, every task still waiting comes back as
//! `TaskError::Disconnected`.
//!
//! ## Example Usage
//! ```ignore
//! let mut pool = WorkerPool::new(4, |_worker| MyContext::default())?;
//! let id = pool.publish(MyTask::new(/* ... */));
//!
//! // In the main loop:
//! for completed in pool.poll_completed() {
//!     // ...
//! }
//! pool.process_queued_tasks();
//! ```

pub mod task;

use std::{
    any::Any,
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info, warn};
use web_time::Instant;

use crate::error::TaskError;
use task::{Completed, Envelope, RequestId, Task};

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// A communication channel between the control thread and one worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the control thread to the worker
/// - `num_tasks_in_flight`: Number of tasks sent and not yet reported back
/// - `worker`: Handle to the worker thread, joined on drop
/// - `connected`: Cleared the first time a send to the worker fails
struct TaskChannel<T> {
    task_sender: Sender<Envelope<T>>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
    connected: bool,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: One channel per worker
/// - `result_receiver`: Shared channel all workers report on
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
/// - `next_request_id`: Id handed to the next published task
/// - `undeliverable`: Failures for tasks no live worker could take
pub struct WorkerPool<T: Task> {
    channels: Vec<TaskChannel<T>>,
    result_receiver: Receiver<Completed<T>>,
    queued_tasks: VecDeque<Envelope<T>>,
    undeliverable: VecDeque<Completed<T>>,
    current_channel: usize,
    next_request_id: u64,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl<T: Task> WorkerPool<T> {
    /// Creates a new `WorkerPool` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. At least one is created.
    /// * `make_context` - Builds the private context of worker `i`
    ///
    /// # Errors
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(
        num_workers: usize,
        make_context: impl Fn(usize) -> T::Context,
    ) -> std::io::Result<Self> {
        let num_workers = num_workers.max(1);
        let mut channels = Vec::with_capacity(num_workers);
        let (result_tx, result_rx) = channel::<Completed<T>>();

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Envelope<T>>();
            let result_tx = result_tx.clone();
            let mut context = make_context(worker_index);

            let task_closure = move || {
                while let Ok(Envelope { request_id, task }) = task_rx.recv() {
                    let run = AssertUnwindSafe(|| task.process(&mut context));
                    let outcome = panic::catch_unwind(run)
                        .map_err(|payload| TaskError::Panicked {
                            worker: worker_index,
                            message: panic_message(payload.as_ref()),
                        });
                    let completed = Completed {
                        request_id,
                        worker: worker_index,
                        task,
                        outcome,
                    };
                    if result_tx.send(completed).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("worker-{worker_index}"))
                .spawn(task_closure)?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                num_tasks_in_flight: 0,
                worker: Some(worker),
                connected: true,
            });
        }

        info!("Started {num_workers} worker threads");

        Ok(WorkerPool {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            undeliverable: VecDeque::new(),
            current_channel: 0,
            next_request_id: 0,
        })
    }

    /// Number of workers the pool was started with.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of workers still accepting tasks.
    pub fn live_workers(&self) -> usize {
        self.channels.iter().filter(|channel| channel.connected).count()
    }

    /// Number of tasks currently running or waiting to be reported.
    pub fn in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Number of published tasks no worker has picked up yet.
    pub fn queued(&self) -> usize {
        self.queued_tasks.len()
    }

    /// True when nothing is queued, in flight or waiting to be reported.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.in_flight() == 0 && self.undeliverable.is_empty()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(envelope)` if the worker has disconnected; it is retired
    fn try_send_task(
        &mut self,
        envelope: Envelope<T>,
        channel_idx: usize,
    ) -> Result<(), Envelope<T>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(envelope) {
            Ok(()) => {
                channel.num_tasks_in_flight += 1;
                self.current_channel = (channel_idx + 1) % self.channels.len();
                Ok(())
            }
            Err(err) => {
                warn!("Worker {channel_idx} disconnected");
                channel.connected = false;
                Err(err.0)
            }
        }
    }

    /// Finds an available live worker channel, round-robin from the one
    /// after the last used.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| {
                let channel = &self.channels[idx];
                channel.connected && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Hands `envelope` to a free live worker, retiring any worker found
    /// disconnected on the way. With no live worker left the task is
    /// reported back as `TaskError::Disconnected`.
    ///
    /// # Returns
    /// The envelope again if every live worker is busy.
    fn dispatch(&mut self, mut envelope: Envelope<T>) -> Option<Envelope<T>> {
        let mut last_tried = self.current_channel;
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(envelope, channel_idx) {
                Ok(()) => return None,
                Err(returned) => {
                    envelope = returned;
                    last_tried = channel_idx;
                }
            }
        }
        if self.live_workers() > 0 {
            return Some(envelope);
        }

        let Envelope { request_id, task } = envelope;
        self.undeliverable.push_back(Completed {
            request_id,
            worker: last_tried,
            task,
            outcome: Err(TaskError::Disconnected(last_tried)),
        });
        None
    }

    /// Publishes a new task for execution.
    ///
    /// The task goes to the next free worker, or to the back of the queue if
    /// every worker is busy.
    ///
    /// # Returns
    /// The id the task's `Completed` will carry.
    pub fn publish(&mut self, task: T) -> RequestId {
        let request_id = RequestId(self.next_request_id);
        self.next_request_id += 1;

        self.queued_tasks.push_back(Envelope { request_id, task });
        self.process_queued_tasks();
        request_id
    }

    /// Sends queued tasks to free workers, oldest first, until either runs out.
    pub fn process_queued_tasks(&mut self) {
        while let Some(envelope) = self.queued_tasks.pop_front() {
            if let Some(envelope) = self.dispatch(envelope) {
                self.queued_tasks.push_front(envelope);
                break;
            }
        }
    }

    /// Drops queued tasks for which `keep` returns false and returns them.
    ///
    /// Tasks already handed to a worker are unaffected.
    pub fn retain_queued(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<Envelope<T>> {
        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.queued_tasks.len());
        for envelope in self.queued_tasks.drain(..) {
            if keep(&envelope.task) {
                kept.push_back(envelope);
            } else {
                removed.push(envelope);
            }
        }
        self.queued_tasks = kept;
        if !removed.is_empty() {
            debug!("Pruned {} queued tasks", removed.len());
        }
        removed
    }

    fn record_completion(&mut self, completed: &Completed<T>) {
        if let Some(channel) = self.channels.get_mut(completed.worker) {
            channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
        }
    }

    /// Collects every result already reported, without blocking.
    pub fn poll_completed(&mut self) -> Vec<Completed<T>> {
        let mut results: Vec<Completed<T>> = self.undeliverable.drain(..).collect();
        while let Ok(completed) = self.result_receiver.try_recv() {
            self.record_completion(&completed);
            results.push(completed);
        }
        results
    }

    /// Blocks until at least one result arrives or `timeout` elapses, then
    /// collects everything reported so far.
    ///
    /// Returns immediately if a failure is already waiting, or with nothing
    /// if no task is in flight.
    pub fn wait_completed(&mut self, timeout: Duration) -> Vec<Completed<T>> {
        if !self.undeliverable.is_empty() {
            return self.poll_completed();
        }
        if self.in_flight() == 0 {
            return Vec::new();
        }

        let start = Instant::now();
        match self.result_receiver.recv_timeout(timeout) {
            Ok(completed) => {
                self.record_completion(&completed);
                let mut results = vec![completed];
                results.extend(self.poll_completed());
                results
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("No task completed within {:?}", start.elapsed());
                Vec::new()
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("All workers disconnected");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
impl<T: Task> WorkerPool<T> {
    /// Closes worker `idx`'s task channel so its thread exits.
    pub(crate) fn disconnect_worker(&mut self, idx: usize) {
        let (closed_sender, _) = channel();
        self.channels[idx].task_sender = closed_sender;
    }
}

impl<T: Task> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.queued_tasks.clear();
        self.undeliverable.clear();
        for (index, channel) in self.channels.drain(..).enumerate() {
            let TaskChannel {
                task_sender,
                worker,
                ..
            } = channel;
            // Closing the task channel ends the worker's receive loop.
            drop(task_sender);
            if let Some(worker) = worker {
                if worker.join().is_err() {
                    warn!("Worker {index} exited abnormally");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Squares a number and counts how many tasks its worker ran.
    #[derive(Debug)]
    struct Square(u64);

    impl Task for Square {
        type Context = u32;
        type Output = (u64, u32);

        fn process(&self, runs: &mut u32) -> (u64, u32) {
            *runs += 1;
            if self.0 == 13 {
                panic!("unlucky");
            }
            (self.0 * self.0, *runs)
        }
    }

    fn drain(pool: &mut WorkerPool<Square>, count: usize) -> Vec<Completed<Square>> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while results.len() < count && Instant::now() < deadline {
            results.extend(pool.wait_completed(Duration::from_millis(100)));
            pool.process_queued_tasks();
        }
        results
    }

    #[test]
    fn excess_tasks_are_queued_then_dispatched() {
        let mut pool = WorkerPool::<Square>::new(2, |_| 0).unwrap();
        let ids: Vec<_> = (0..6).map(|n| pool.publish(Square(n))).collect();
        assert!(pool.in_flight() <= 2 * MAX_TASKS_IN_FLIGHT);
        assert_eq!(pool.queued() + pool.in_flight(), 6);

        let mut results = drain(&mut pool, 6);
        results.sort_by_key(|c| c.request_id);
        assert_eq!(results.iter().map(|c| c.request_id).collect::<Vec<_>>(), ids);
        for completed in &results {
            let (square, _) = completed.outcome.as_ref().unwrap();
            assert_eq!(*square, completed.task.0 * completed.task.0);
        }
        assert!(pool.is_idle());
    }

    #[test]
    fn workers_keep_their_context() {
        let mut pool = WorkerPool::<Square>::new(1, |_| 100).unwrap();
        for n in 0..3 {
            pool.publish(Square(n));
        }
        let results = drain(&mut pool, 3);
        let mut runs: Vec<u32> = results.iter().map(|c| c.outcome.as_ref().unwrap().1).collect();
        runs.sort();
        assert_eq!(runs, vec![101, 102, 103]);
    }

    #[test]
    fn panicking_task_reports_an_error_and_worker_survives() {
        let mut pool = WorkerPool::<Square>::new(1, |_| 0).unwrap();
        let bad = pool.publish(Square(13));
        let good = pool.publish(Square(3));
        let results = drain(&mut pool, 2);

        let failed = results.iter().find(|c| c.request_id == bad).unwrap();
        assert!(matches!(
            &failed.outcome,
            Err(TaskError::Panicked { worker: 0, message }) if message == "unlucky"
        ));
        let ok = results.iter().find(|c| c.request_id == good).unwrap();
        assert_eq!(ok.outcome.as_ref().unwrap().0, 9);
    }

    #[test]
    fn retain_queued_prunes_only_waiting_tasks() {
        let mut pool = WorkerPool::<Square>::new(1, |_| 0).unwrap();
        for n in 0..5 {
            pool.publish(Square(n));
        }
        // Square(0) is on the worker; the rest wait.
        let removed = pool.retain_queued(|task| task.0 % 2 == 0);
        assert_eq!(removed.iter().map(|e| e.task.0).collect::<Vec<_>>(), vec![1, 3]);
        let results = drain(&mut pool, 3);
        let mut done: Vec<u64> = results.iter().map(|c| c.task.0).collect();
        done.sort();
        assert_eq!(done, vec![0, 2, 4]);
    }

    #[test]
    fn disconnected_worker_is_retired_and_tasks_go_elsewhere() {
        let mut pool = WorkerPool::<Square>::new(2, |_| 0).unwrap();
        pool.disconnect_worker(0);
        for n in 1..=3 {
            pool.publish(Square(n));
        }
        assert_eq!(pool.live_workers(), 1);

        let results = drain(&mut pool, 3);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|c| c.worker == 1 && c.outcome.is_ok()));
    }

    #[test]
    fn tasks_fail_once_every_worker_is_gone() {
        let mut pool = WorkerPool::<Square>::new(1, |_| 0).unwrap();
        pool.disconnect_worker(0);
        let id = pool.publish(Square(2));
        assert!(!pool.is_idle());

        let results = pool.wait_completed(Duration::from_secs(60));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].request_id, id);
        assert_eq!(results[0].outcome, Err(TaskError::Disconnected(0)));
        assert!(pool.is_idle());
    }

    #[test]
    fn wait_without_work_returns_immediately() {
        let mut pool = WorkerPool::<Square>::new(1, |_| 0).unwrap();
        assert!(pool.wait_completed(Duration::from_secs(60)).is_empty());
    }
}
