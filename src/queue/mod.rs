//! In-memory task queue shared by the worker pool.
//!
//! # Overview
//!
//! - [`Target`] - one URL plus optional destination
//! - [`Task`] - queue entry: a target to fetch or a stop sentinel
//! - [`TaskQueue`] - FIFO with a blocking, cancellable pop for many consumers
//! - [`CompletionCounter`] - wait-group style counter of unfinished targets
//!
//! # Example
//!
//! ```
//! use batchget_core::queue::{Target, Task, TaskQueue};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let queue = TaskQueue::new();
//! queue.push(Task::Fetch(Target::new("http://example.com/a.html")));
//! queue.push(Task::Stop);
//!
//! let cancel = CancellationToken::new();
//! assert!(matches!(queue.pop(&cancel).await, Some(Task::Fetch(_))));
//! assert_eq!(queue.pop(&cancel).await, Some(Task::Stop));
//! # });
//! ```

mod completion;
mod item;

pub use completion::CompletionCounter;
pub use item::{Target, Task};

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Multi-consumer FIFO of [`Task`]s.
///
/// Consumers block in [`TaskQueue::pop`] until a task is available or the
/// cancellation token fires; there is no polling.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    available: Notify,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        // A panicking holder cannot leave the deque half-updated
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a task and wakes one waiting consumer.
    pub fn push(&self, task: Task) {
        self.lock().push_back(task);
        self.available.notify_one();
    }

    /// Puts a task ahead of everything queued and wakes one waiting consumer.
    pub fn push_front(&self, task: Task) {
        self.lock().push_front(task);
        self.available.notify_one();
    }

    /// Appends every task in order.
    pub fn extend(&self, tasks: impl IntoIterator<Item = Task>) {
        for task in tasks {
            self.push(task);
        }
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes the next task without waiting.
    #[must_use]
    pub fn try_pop(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    /// Takes the next task, waiting until one is pushed.
    ///
    /// Returns `None` only when `cancel` fires while the queue is empty.
    pub async fn pop(&self, cancel: &CancellationToken) -> Option<Task> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking so a push between the check and the
            // await still wakes this consumer.
            notified.as_mut().enable();

            if let Some(task) = self.try_pop() {
                return Some(task);
            }

            tokio::select! {
                () = &mut notified => {}
                () = cancel.cancelled() => return None,
            }
        }
    }
}
