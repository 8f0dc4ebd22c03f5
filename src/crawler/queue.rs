use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{Mutex, Notify};

/// Shared FIFO frontier for one crawl cycle.
///
/// Producers (the cycle setup and parsers yielding follow-up links) `put`
/// targets; workers `get` them and call `task_done` when the item is fully
/// processed. `join` resolves once every put item has been marked done, and
/// `close` releases workers blocked in `get`.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    unfinished: AtomicUsize,
    closed: AtomicBool,
    item_ready: Notify,
    all_done: Notify,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            unfinished: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            item_ready: Notify::new(),
            all_done: Notify::new(),
        }
    }

    pub async fn put(&self, item: T) {
        // Counted before it becomes visible so join can't observe a gap
        // between pop and task_done.
        self.unfinished.fetch_add(1, Ordering::AcqRel);
        self.items.lock().await.push_back(item);
        self.item_ready.notify_one();
    }

    /// Next target, or `None` once the queue is closed and empty.
    pub async fn get(&self) -> Option<T> {
        loop {
            // Register interest before re-checking state, otherwise a put or
            // close landing in between is a lost wakeup.
            let notified = self.item_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.items.lock().await.pop_front() {
                return Some(item);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }

            notified.await;
        }
    }

    /// Marks one previously `get`-ed item as fully processed.
    pub fn task_done(&self) {
        if self.unfinished.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.all_done.notify_waiters();
        }
    }

    /// Waits until every enqueued item has been processed.
    pub async fn join(&self) {
        loop {
            let notified = self.all_done.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.unfinished.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stops workers: blocked and future `get` calls return `None` once the
    /// queue is empty. In-flight items are unaffected.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.item_ready.notify_waiters();
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
