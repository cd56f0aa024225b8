use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::ConfigError;
use crate::log::log_level::LogLevel;
use crate::log::log_sink::LogSink;
use crate::log::sink_error::SinkError;
use crate::log::sink_queue::DEFAULT_QUEUE_CAPACITY;
use crate::log::sink_writer::SinkWriter;
use crate::log::sinks::{ConsoleSink, DatabaseSink, FileSink, TcpSink};

/// Prefix of configuration sections that declare a sink: `[sink:<name>]`.
pub const SINK_SECTION_PREFIX: &str = "sink:";

/// Builds a default-configured writer for one sink type.
pub type SinkFactory = fn() -> Box<dyn SinkWriter>;

/// A sink declaration as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkDescriptor {
    pub name: String,
    pub threshold: LogLevel,
    pub kind: String,
    pub capacity: Option<usize>,
    /// Destination-specific properties, in declaration order.
    pub properties: IndexMap<String, String>,
}

impl SinkDescriptor {
    /// Reads a `[sink:<name>]` section. `type`, `loglevel` and `capacity` are
    /// reserved; every other key is kept as a property.
    pub fn from_section(
        name: &str,
        entries: &IndexMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut kind = None;
        let mut threshold = None;
        let mut capacity = None;
        let mut properties = IndexMap::new();

        for (key, value) in entries {
            match key.to_ascii_lowercase().as_str() {
                "type" => kind = Some(value.trim().to_string()),
                "loglevel" => threshold = Some(value.parse::<LogLevel>()?),
                "capacity" => {
                    let n: usize = value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::invalid(key, value, format!("{e}")))?;
                    if n == 0 {
                        return Err(ConfigError::invalid(key, value, "capacity must be positive"));
                    }
                    capacity = Some(n);
                }
                _ => {
                    properties.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            threshold: threshold.ok_or(ConfigError::MissingKey("loglevel"))?,
            kind: kind
                .filter(|k| !k.is_empty())
                .ok_or(ConfigError::MissingKey("type"))?,
            capacity,
            properties,
        })
    }
}

/// Maps configuration type names to writer constructors.
#[derive(Clone)]
pub struct SinkRegistry {
    factories: HashMap<String, SinkFactory>,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl SinkRegistry {
    /// A registry with no sink types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// `console`, `file`, `tcp`, `database` and, on Unix, `eventlog`.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut reg = Self::empty();
        reg.register("console", || Box::new(ConsoleSink::default()));
        reg.register("file", || Box::new(FileSink::default()));
        reg.register("tcp", || Box::new(TcpSink::default()));
        reg.register("database", || Box::new(DatabaseSink::default()));
        #[cfg(unix)]
        reg.register("eventlog", || {
            Box::new(crate::log::sinks::EventLogSink::default())
        });
        reg
    }

    /// Registers (or replaces) a sink type. Names are case-insensitive.
    pub fn register(&mut self, kind: &str, factory: SinkFactory) {
        self.factories.insert(kind.to_ascii_lowercase(), factory);
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&kind.to_ascii_lowercase())
    }

    /// Constructs the writer for `desc` and applies all its properties.
    pub fn build_writer(&self, desc: &SinkDescriptor) -> Result<Box<dyn SinkWriter>, SinkError> {
        let factory = self
            .factories
            .get(&desc.kind.to_ascii_lowercase())
            .ok_or_else(|| ConfigError::UnknownSinkType(desc.kind.clone()))?;
        let mut writer = factory();
        for (key, value) in &desc.properties {
            writer.set_property(key, value)?;
        }
        Ok(writer)
    }

    /// Builds, configures and starts the sink described by `desc`.
    pub fn start(&self, desc: &SinkDescriptor) -> Result<LogSink, SinkError> {
        let writer = self.build_writer(desc)?;
        LogSink::with_capacity(
            desc.name.clone(),
            desc.threshold,
            writer,
            desc.capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
        )
    }
}
