use std::io::{self, Write};

use crate::log::log_item::LogItem;
use crate::log::log_level::LogLevel;
use crate::log::sink_error::SinkError;

/// Identity of the sink a writer is attached to.
#[derive(Debug, Clone)]
pub struct SinkInfo {
    pub name: String,
    pub threshold: LogLevel,
}

/// Destination-specific half of a sink.
///
/// A writer is driven by exactly one worker thread, so `write_one` takes
/// `&mut self` and needs no internal locking of its own.
pub trait SinkWriter: Send {
    /// Type name used in configuration (`type = ...`).
    fn kind(&self) -> &'static str;

    /// Applies one configuration property. Names match case-insensitively.
    fn set_property(&mut self, key: &str, value: &str) -> Result<(), SinkError>;

    /// Acquires destination resources before the worker starts.
    fn open(&mut self, _sink: &SinkInfo) -> Result<(), SinkError> {
        Ok(())
    }

    /// Writes one entry. Without an override the entry goes to stdout.
    fn write_one(&mut self, _sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
        let mut out = io::stdout().lock();
        writeln!(out, "{item}")?;
        Ok(())
    }

    /// Releases destination resources; called once when the worker stops.
    fn close(&mut self) {}
}
