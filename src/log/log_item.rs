use std::error::Error;
use std::fmt;

use chrono::{DateTime, Local};

use crate::log::log_level::LogLevel;

/// Represents a single log event.
///
/// Built once per matching sink on every log call and never mutated
/// afterwards; the sink's worker is its only reader.
#[derive(Debug, Clone, PartialEq)]
pub struct LogItem {
    /// The severity level of the entry.
    pub level: LogLevel,
    /// The user supplied message.
    pub message: String,
    /// Rendered error chain attached to the entry, if any.
    pub cause: Option<String>,
    /// Local wall-clock time the entry was created.
    pub timestamp: DateTime<Local>,
    /// Name of the originating process or application.
    pub origin: String,
}

impl LogItem {
    /// Creates a new `LogItem` stamped with the current local time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fanlog::log::{LogItem, LogLevel};
    ///
    /// let item = LogItem::new(LogLevel::Info, "Connection established", None, "billing");
    /// assert_eq!(item.origin, "billing");
    /// ```
    pub fn new(
        level: LogLevel,
        message: impl Into<String>,
        cause: Option<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self::at(level, message, cause, origin, Local::now())
    }

    /// Creates a `LogItem` with an explicit timestamp.
    pub fn at(
        level: LogLevel,
        message: impl Into<String>,
        cause: Option<String>,
        origin: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            cause,
            timestamp,
            origin: origin.into(),
        }
    }

    /// Text stored in the `Exception` column and similar places.
    #[must_use]
    pub fn cause_or_none(&self) -> &str {
        self.cause.as_deref().unwrap_or("None")
    }
}

impl fmt::Display for LogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Severity: {} Application: {} Date: {} Message: {}",
            self.level.as_str().to_uppercase(),
            self.origin,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )?;
        if let Some(cause) = &self.cause {
            write!(f, "\nCause: {cause}")?;
        }
        Ok(())
    }
}

/// Renders an error and its `source()` chain as `outer: inner: root`.
#[must_use]
pub fn render_cause(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut next = err.source();
    while let Some(src) = next {
        out.push_str(": ");
        out.push_str(&src.to_string());
        next = src.source();
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use chrono::TimeZone;
    use std::io;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("could not save invoice")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn display_includes_severity_origin_and_cause() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).single().expect("ts");
        let item = LogItem::at(
            LogLevel::Warning,
            "disk almost full",
            Some("quota".into()),
            "billing",
            ts,
        );
        let text = item.to_string();
        assert_eq!(
            text,
            "Severity: WARNING Application: billing Date: 2024-03-09 14:05:00 Message: disk almost full\nCause: quota"
        );
    }

    #[test]
    fn cause_chain_is_flattened() {
        let err = Wrapped(io::Error::other("permission denied"));
        assert_eq!(render_cause(&err), "could not save invoice: permission denied");
    }

    #[test]
    fn missing_cause_renders_none() {
        let item = LogItem::new(LogLevel::Info, "x", None, "app");
        assert_eq!(item.cause_or_none(), "None");
        assert!(!item.to_string().contains("Cause"));
    }
}
