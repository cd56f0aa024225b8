use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::log::log_item::LogItem;

/// Default bound of a sink queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Outcome of a [`SinkQueue::push`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Pushed {
    Queued,
    /// Queued after evicting the oldest entry.
    Evicted,
    /// The queue is shut down; the entry was discarded.
    Closed,
}

struct State {
    items: VecDeque<LogItem>,
    closed: bool,
    busy: bool,
}

/// Bounded FIFO shared by many producers and one sink worker.
///
/// When full, the oldest entry is dropped to make room. The worker blocks on
/// `ready` until there is work or the queue is closed.
pub(crate) struct SinkQueue {
    state: Mutex<State>,
    ready: Condvar,
    idle: Condvar,
    capacity: usize,
}

impl SinkQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
                busy: false,
            }),
            ready: Condvar::new(),
            idle: Condvar::new(),
            capacity,
        }
    }

    pub(crate) fn push(&self, item: LogItem) -> Pushed {
        let mut st = self.state.lock();
        if st.closed {
            return Pushed::Closed;
        }
        let evicted = if st.items.len() >= self.capacity {
            st.items.pop_front();
            true
        } else {
            false
        };
        st.items.push_back(item);
        drop(st);
        self.ready.notify_one();
        if evicted { Pushed::Evicted } else { Pushed::Queued }
    }

    /// Blocks until an entry is available. `None` once the queue is closed.
    ///
    /// Returning an entry marks the worker busy until the next call.
    pub(crate) fn next(&self) -> Option<LogItem> {
        let mut st = self.state.lock();
        st.busy = false;
        loop {
            if st.closed {
                return None;
            }
            if let Some(item) = st.items.pop_front() {
                st.busy = true;
                return Some(item);
            }
            self.idle.notify_all();
            self.ready.wait(&mut st);
        }
    }

    /// Marks the queue closed and discards pending entries. Returns how many were dropped.
    pub(crate) fn close(&self) -> usize {
        let mut st = self.state.lock();
        st.closed = true;
        let discarded = st.items.len();
        st.items.clear();
        drop(st);
        self.ready.notify_all();
        self.idle.notify_all();
        discarded
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Waits until nothing is queued and no write is in flight.
    pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut st = self.state.lock();
        while !st.closed && (st.busy || !st.items.is_empty()) {
            if self.idle.wait_until(&mut st, deadline).timed_out() {
                return st.closed || (!st.busy && st.items.is_empty());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::log_level::LogLevel;
    use std::sync::Arc;
    use std::thread;

    fn item(msg: &str) -> LogItem {
        LogItem::new(LogLevel::Info, msg, None, "test")
    }

    #[test]
    fn full_queue_drops_oldest() {
        let q = SinkQueue::new(2);
        assert_eq!(q.push(item("a")), Pushed::Queued);
        assert_eq!(q.push(item("b")), Pushed::Queued);
        assert_eq!(q.push(item("c")), Pushed::Evicted);

        assert_eq!(q.next().expect("b").message, "b");
        assert_eq!(q.next().expect("c").message, "c");
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn close_discards_and_wakes_worker() {
        let q = Arc::new(SinkQueue::new(8));
        let worker = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.next())
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(q.close(), 0);
        assert!(worker.join().expect("join").is_none());

        assert_eq!(q.push(item("late")), Pushed::Closed);
        assert!(q.is_closed());
    }

    #[test]
    fn wait_idle_times_out_while_busy() {
        let q = SinkQueue::new(8);
        q.push(item("a"));
        let _taken = q.next().expect("item");
        // Worker has not come back for the next entry, so the queue is busy.
        assert!(!q.wait_idle(Duration::from_millis(20)));
    }
}
