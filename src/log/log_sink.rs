use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::log::log_item::LogItem;
use crate::log::log_level::LogLevel;
use crate::log::sink_error::SinkError;
use crate::log::sink_queue::{DEFAULT_QUEUE_CAPACITY, Pushed, SinkQueue};
use crate::log::sink_writer::{SinkInfo, SinkWriter};

/// Delivery counters of a sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Entries written without error.
    pub delivered: u64,
    /// Entries whose write returned an error or panicked.
    pub failed: u64,
    /// Entries evicted by the queue bound or discarded at shutdown.
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

struct Shared {
    info: SinkInfo,
    kind: &'static str,
    queue: SinkQueue,
    writer: Mutex<Box<dyn SinkWriter>>,
    counters: Counters,
}

/// A running log destination: a bounded queue plus one dedicated worker.
///
/// # Architecture
///
/// 1. **Producers**: any thread calls [`enqueue`](Self::enqueue); it never
///    waits on the destination.
/// 2. **Queue**: a bounded FIFO that drops its oldest entry when full.
/// 3. **Consumer**: the `sink-<name>` thread pops entries in order and hands
///    them to the [`SinkWriter`]. Failed or panicking writes are counted and
///    skipped.
///
/// Dropping a `LogSink` stops the worker without waiting for it;
/// [`shutdown`](Self::shutdown) also joins it.
pub struct LogSink {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl LogSink {
    /// Opens `writer` and starts the worker with the default queue bound.
    pub fn start(
        name: impl Into<String>,
        threshold: LogLevel,
        writer: Box<dyn SinkWriter>,
    ) -> Result<Self, SinkError> {
        Self::with_capacity(name, threshold, writer, DEFAULT_QUEUE_CAPACITY)
    }

    /// Opens `writer` and starts the worker.
    ///
    /// # Errors
    ///
    /// Returns the writer's `open` error, or an I/O error when the worker
    /// thread cannot be spawned. No thread is left running in either case.
    pub fn with_capacity(
        name: impl Into<String>,
        threshold: LogLevel,
        mut writer: Box<dyn SinkWriter>,
        capacity: usize,
    ) -> Result<Self, SinkError> {
        let info = SinkInfo {
            name: name.into(),
            threshold,
        };
        writer.open(&info)?;

        let kind = writer.kind();
        let shared = Arc::new(Shared {
            info,
            kind,
            queue: SinkQueue::new(capacity),
            writer: Mutex::new(writer),
            counters: Counters::default(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(format!("sink-{}", shared.info.name))
            .spawn(move || run_loop(&worker_shared));

        match handle {
            Ok(h) => {
                tracing::debug!(sink = %shared.info.name, kind, %threshold, "sink started");
                Ok(Self {
                    shared,
                    worker: Mutex::new(Some(h)),
                })
            }
            Err(e) => {
                shared.writer.lock().close();
                Err(SinkError::Io(e))
            }
        }
    }

    /// Configured sink name; also the worker thread's suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.info.name
    }

    /// Lowest level this sink accepts.
    #[must_use]
    pub fn threshold(&self) -> LogLevel {
        self.shared.info.threshold
    }

    /// Type name of the underlying writer, e.g. `"file"` or `"tcp"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.shared.kind
    }

    /// Whether an entry of `level` reaches this sink.
    #[inline]
    #[must_use]
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.shared.info.threshold.admits(level)
    }

    /// Queues `item` for the worker. Never blocks on the destination.
    pub fn enqueue(&self, item: LogItem) {
        match self.shared.queue.push(item) {
            Pushed::Queued => {}
            Pushed::Evicted | Pushed::Closed => {
                self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Applies a property to the live writer, waiting for any in-flight write.
    ///
    /// # Parameters
    /// - `key`: property name, matched case-insensitively by the writer.
    /// - `value`: raw configuration value.
    ///
    /// # Errors
    /// Unknown properties and invalid values are rejected and leave the
    /// writer unchanged.
    pub fn reconfigure(&self, key: &str, value: &str) -> Result<(), SinkError> {
        self.shared.writer.lock().set_property(key, value)
    }

    /// Number of entries waiting for the worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Blocks until the queue is drained and no write is in flight.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.shared.queue.wait_idle(timeout)
    }

    /// Snapshot of the delivery counters.
    ///
    /// # Returns
    /// A [`SinkStats`] copy; counters keep moving after it is taken.
    #[must_use]
    pub fn stats(&self) -> SinkStats {
        let c = &self.shared.counters;
        SinkStats {
            delivered: c.delivered.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
        }
    }

    /// Stops the worker, discards queued entries and waits for the writer to close.
    pub fn shutdown(&self) {
        self.request_stop();
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                tracing::warn!(sink = %self.shared.info.name, "sink worker panicked");
            }
        }
    }

    fn request_stop(&self) {
        let discarded = self.shared.queue.close();
        if discarded > 0 {
            self.shared
                .counters
                .dropped
                .fetch_add(discarded as u64, Ordering::Relaxed);
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        self.request_stop();
    }
}

fn run_loop(shared: &Shared) {
    while let Some(item) = shared.queue.next() {
        let outcome = {
            let mut writer = shared.writer.lock();
            panic::catch_unwind(AssertUnwindSafe(|| writer.write_one(&shared.info, &item)))
        };
        match outcome {
            Ok(Ok(())) => {
                shared.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(sink = %shared.info.name, error = %e, "write failed");
            }
            Err(payload) => {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                let e = SinkError::Panicked(panic_message(payload.as_ref()));
                tracing::debug!(sink = %shared.info.name, error = %e, "write failed");
            }
        }
    }
    shared.writer.lock().close();
    tracing::debug!(sink = %shared.info.name, "sink stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
