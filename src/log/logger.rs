use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::config::{Config, ConfigError};
use crate::log::log_item::{LogItem, render_cause};
use crate::log::log_level::LogLevel;
use crate::log::log_sink::LogSink;
use crate::log::paths::process_name;
use crate::log::sink_config::{SINK_SECTION_PREFIX, SinkDescriptor, SinkRegistry};
use crate::log::sink_error::{SinkError, SinkSetupError};

/// Global configuration key overriding the origin name stamped on entries.
pub const APPLICATION_KEY: &str = "application";

struct Inner {
    origin: String,
    sinks: IndexMap<String, LogSink>,
}

/// Fan-out façade over the configured sinks.
///
/// Cheap to clone; every clone shares the same sinks. The sink set is fixed
/// at construction. A log call checks each sink's threshold and enqueues
/// one [`LogItem`] per matching sink, so it never waits on a destination.
///
/// # Example
///
/// ```rust,no_run
/// use fanlog::config::Config;
/// use fanlog::log::{Logger, SinkRegistry};
///
/// let config = Config::load("fanlog.ini").expect("config");
/// let setup = Logger::from_config(&config, &SinkRegistry::with_builtin());
/// for failure in &setup.failures {
///     eprintln!("{failure}");
/// }
/// let logger = setup.logger;
/// logger.info("service started");
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

/// Result of building a logger from configuration: the sinks that started,
/// plus one error per sink that did not.
pub struct LoggerSetup {
    pub logger: Logger,
    pub failures: Vec<SinkSetupError>,
}

impl Logger {
    /// A logger over already running sinks. Later duplicates of a name are dropped.
    #[must_use]
    pub fn new(sinks: Vec<LogSink>) -> Self {
        Self::with_origin(process_name(), sinks)
    }

    /// Like [`new`](Self::new), with `origin` recorded on every entry instead
    /// of the process name.
    #[must_use]
    pub fn with_origin(origin: impl Into<String>, sinks: Vec<LogSink>) -> Self {
        let mut map = IndexMap::with_capacity(sinks.len());
        for sink in sinks {
            if map.contains_key(sink.name()) {
                tracing::warn!(sink = sink.name(), "duplicate sink name ignored");
                continue;
            }
            map.insert(sink.name().to_string(), sink);
        }
        Self {
            inner: Arc::new(Inner {
                origin: origin.into(),
                sinks: map,
            }),
        }
    }

    /// Starts every `[sink:<name>]` section of `config`.
    ///
    /// Sections are handled independently: a bad declaration is reported in
    /// [`LoggerSetup::failures`] and the remaining sinks still start.
    #[must_use]
    pub fn from_config(config: &Config, registry: &SinkRegistry) -> LoggerSetup {
        let descriptors = config
            .sections_with_prefix(SINK_SECTION_PREFIX)
            .map(|(name, entries)| {
                (
                    name.to_string(),
                    SinkDescriptor::from_section(name, entries).map_err(SinkError::from),
                )
            })
            .collect::<Vec<_>>();

        let origin = config
            .get_global(APPLICATION_KEY)
            .filter(|s| !s.is_empty())
            .map_or_else(process_name, str::to_string);

        Self::from_descriptors(origin, descriptors, registry)
    }

    fn from_descriptors(
        origin: String,
        descriptors: Vec<(String, Result<SinkDescriptor, SinkError>)>,
        registry: &SinkRegistry,
    ) -> LoggerSetup {
        let mut sinks = Vec::new();
        let mut failures = Vec::new();

        for (name, desc) in descriptors {
            if sinks.iter().any(|s: &LogSink| s.name() == name) {
                failures.push(SinkSetupError {
                    sink: name,
                    error: ConfigError::invalid("name", "", "duplicate sink name").into(),
                });
                continue;
            }
            match desc.and_then(|d| registry.start(&d)) {
                Ok(sink) => sinks.push(sink),
                Err(error) => {
                    tracing::warn!(sink = %name, %error, "sink not started");
                    failures.push(SinkSetupError { sink: name, error });
                }
            }
        }

        LoggerSetup {
            logger: Self::with_origin(origin, sinks),
            failures,
        }
    }

    /// Whether both handles are clones of the same logger.
    pub(crate) fn shares_sinks_with(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Name stamped on every entry as its origin.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.inner.origin
    }

    /// Fans `message` out to every sink whose threshold admits `level`.
    ///
    /// Each matching sink receives its own [`LogItem`]; the call only
    /// enqueues and never waits on a destination.
    ///
    /// # Parameters
    /// - `level`: severity of the entry.
    /// - `message`: the entry text.
    /// - `cause`: optional error; its `source()` chain is rendered once and
    ///   shared by every item.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// logger.log(LogLevel::Warning, "disk almost full", None);
    /// logger.log(LogLevel::Error, "write failed", Some(&io_err));
    /// ```
    pub fn log(&self, level: LogLevel, message: &str, cause: Option<&dyn Error>) {
        let mut rendered: Option<String> = None;
        for sink in self.inner.sinks.values() {
            if !sink.accepts(level) {
                continue;
            }
            let cause = match cause {
                Some(err) => Some(rendered.get_or_insert_with(|| render_cause(err)).clone()),
                None => None,
            };
            sink.enqueue(LogItem::new(level, message, cause, self.inner.origin.as_str()));
        }
    }

    /// Whether any sink would receive an entry of `level`.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.inner.sinks.values().any(|s| s.accepts(level))
    }

    /// Logs `message` at [`LogLevel::Debug`].
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, None);
    }

    /// Logs `message` at [`LogLevel::Debug`] with `cause` rendered into the entry.
    pub fn debug_with(&self, message: &str, cause: &dyn Error) {
        self.log(LogLevel::Debug, message, Some(cause));
    }

    /// Logs `message` at [`LogLevel::Info`].
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, None);
    }

    /// Logs `message` at [`LogLevel::Info`] with `cause` rendered into the entry.
    pub fn info_with(&self, message: &str, cause: &dyn Error) {
        self.log(LogLevel::Info, message, Some(cause));
    }

    /// Logs `message` at [`LogLevel::Warning`].
    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message, None);
    }

    /// Logs `message` at [`LogLevel::Warning`] with `cause` rendered into the entry.
    pub fn warning_with(&self, message: &str, cause: &dyn Error) {
        self.log(LogLevel::Warning, message, Some(cause));
    }

    /// Logs `message` at [`LogLevel::Error`].
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, None);
    }

    /// Logs `message` at [`LogLevel::Error`] with `cause` rendered into the entry.
    pub fn error_with(&self, message: &str, cause: &dyn Error) {
        self.log(LogLevel::Error, message, Some(cause));
    }

    /// Logs `message` at [`LogLevel::Fatal`].
    pub fn fatal(&self, message: &str) {
        self.log(LogLevel::Fatal, message, None);
    }

    /// Logs `message` at [`LogLevel::Fatal`] with `cause` rendered into the entry.
    pub fn fatal_with(&self, message: &str, cause: &dyn Error) {
        self.log(LogLevel::Fatal, message, Some(cause));
    }

    /// Looks up a running sink, e.g. to [`reconfigure`](LogSink::reconfigure) it.
    #[must_use]
    pub fn get_sink(&self, name: &str) -> Option<&LogSink> {
        self.inner.sinks.get(name)
    }

    /// Names of the running sinks, in configuration order.
    pub fn sink_names(&self) -> impl Iterator<Item = &str> {
        self.inner.sinks.keys().map(String::as_str)
    }

    /// Waits until every sink has drained its queue.
    ///
    /// # Parameters
    /// - `timeout`: overall budget shared by all sinks.
    ///
    /// # Returns
    /// `true` if every queue drained in time, `false` otherwise.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.inner
            .sinks
            .values()
            .all(|s| s.wait_idle(deadline.saturating_duration_since(Instant::now())))
    }

    /// Stops every sink worker, dropping entries that are still queued.
    pub fn shutdown(&self) {
        for sink in self.inner.sinks.values() {
            sink.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::log_item::LogItem;
    use crate::log::sink_writer::{SinkInfo, SinkWriter};
    use parking_lot::Mutex;
    use std::io;

    #[derive(Clone, Default)]
    struct Collected(Arc<Mutex<Vec<LogItem>>>);

    struct Collector(Collected);

    impl SinkWriter for Collector {
        fn kind(&self) -> &'static str {
            "collector"
        }

        fn set_property(&mut self, _key: &str, _value: &str) -> Result<(), SinkError> {
            Ok(())
        }

        fn write_one(&mut self, _sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
            self.0.0.lock().push(item.clone());
            Ok(())
        }
    }

    fn sink(name: &str, level: LogLevel) -> (LogSink, Collected) {
        let c = Collected::default();
        let s = LogSink::start(name, level, Box::new(Collector(c.clone()))).expect("start");
        (s, c)
    }

    fn levels(c: &Collected) -> Vec<LogLevel> {
        c.0.lock().iter().map(|i| i.level).collect()
    }

    #[test]
    fn each_sink_only_sees_levels_at_or_above_threshold() {
        let (all, all_c) = sink("all", LogLevel::Debug);
        let (warn, warn_c) = sink("warn", LogLevel::Warning);
        let logger = Logger::with_origin("svc", vec![all, warn]);

        logger.debug("d");
        logger.info("i");
        logger.warning("w");
        logger.error("e");
        logger.fatal("f");
        assert!(logger.wait_idle(Duration::from_secs(2)));

        assert_eq!(levels(&all_c).len(), 5);
        assert_eq!(
            levels(&warn_c),
            vec![LogLevel::Warning, LogLevel::Error, LogLevel::Fatal]
        );
        assert!(all_c.0.lock().iter().all(|i| i.origin == "svc"));
    }

    #[test]
    fn cause_is_rendered_per_item() {
        let (a, a_c) = sink("a", LogLevel::Debug);
        let (b, b_c) = sink("b", LogLevel::Debug);
        let logger = Logger::with_origin("svc", vec![a, b]);

        let err = io::Error::new(io::ErrorKind::NotFound, "config.ini missing");
        logger.error_with("startup failed", &err);
        assert!(logger.wait_idle(Duration::from_secs(2)));

        for c in [&a_c, &b_c] {
            let items = c.0.lock();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].cause.as_deref(), Some("config.ini missing"));
        }
    }

    #[test]
    fn get_sink_finds_by_name_and_duplicates_are_ignored() {
        let (first, _) = sink("dup", LogLevel::Info);
        let (second, _) = sink("dup", LogLevel::Error);
        let logger = Logger::new(vec![first, second]);

        assert_eq!(logger.sink_names().collect::<Vec<_>>(), vec!["dup"]);
        assert_eq!(logger.get_sink("dup").map(LogSink::threshold), Some(LogLevel::Info));
        assert!(logger.get_sink("missing").is_none());
        assert!(logger.enabled(LogLevel::Info));
        assert!(!logger.enabled(LogLevel::Debug));
    }
}
