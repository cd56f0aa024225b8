use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Defines the severity levels for log messages.
///
/// Ordering follows severity: a sink whose threshold is `Error` accepts
/// `Error` and `Fatal` only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Fine-grained events that are most useful to debug an application.
    Debug,
    /// Informational messages that highlight coarse-grained progress.
    Info,
    /// Potentially harmful situations.
    Warning,
    /// Error events that might still allow the application to continue running.
    Error,
    /// Failures the application cannot recover from.
    Fatal,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
        }
    }

    /// Whether an entry of `level` passes a sink configured at `self`.
    #[inline]
    #[must_use]
    pub fn admits(self, level: LogLevel) -> bool {
        level >= self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("warn") {
            return Ok(LogLevel::Warning);
        }
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| ConfigError::InvalidLevel(s.to_string()))
    }
}
