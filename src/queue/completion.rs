//! Completion counter for the fill/drain/stop handshake.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Counts targets that have not finished processing.
///
/// The distributor waits on this rather than on queue emptiness: the queue
/// is empty as soon as the last target is popped, while its transfer is still
/// running.
#[derive(Debug)]
pub struct CompletionCounter {
    remaining: AtomicUsize,
    done: Notify,
}

impl CompletionCounter {
    /// Creates a counter expecting `total` completions.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(total),
            done: Notify::new(),
        }
    }

    /// Number of completions still expected.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Marks one target as processed. Extra calls past zero are ignored.
    pub fn complete_one(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.done.notify_waiters();
        }
    }

    /// Waits until every expected completion has been recorded.
    pub async fn wait(&self) {
        loop {
            let notified = self.done.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }
}
