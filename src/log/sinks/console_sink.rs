use std::io::{self, Write};

use crate::config::ConfigError;
use crate::log::log_item::LogItem;
use crate::log::sink_error::SinkError;
use crate::log::sink_writer::{SinkInfo, SinkWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes each entry as one line on the process console.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    #[must_use]
    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl SinkWriter for ConsoleSink {
    fn kind(&self) -> &'static str {
        "console"
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        if !key.eq_ignore_ascii_case("stream") {
            return Err(ConfigError::UnknownProperty {
                sink_type: "console",
                property: key.to_string(),
            }
            .into());
        }
        self.stream = match value.trim().to_ascii_lowercase().as_str() {
            "stdout" | "out" => ConsoleStream::Stdout,
            "stderr" | "err" => ConsoleStream::Stderr,
            _ => return Err(ConfigError::invalid(key, value, "expected stdout or stderr").into()),
        };
        Ok(())
    }

    fn write_one(&mut self, _sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
        match self.stream {
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{item}")?,
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{item}")?,
        }
        Ok(())
    }
}
