use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::log::date_pattern::DatePattern;
use crate::log::log_item::LogItem;
use crate::log::paths::resolve_log_dir;
use crate::log::sink_error::SinkError;
use crate::log::sink_writer::{SinkInfo, SinkWriter};

/// Appends entries to `<dir>/<name><date>.log`.
///
/// The file is opened and closed for every entry, so several processes (or
/// an external rotation tool) can share the directory. The date suffix comes
/// from the entry's own timestamp; a new suffix value starts a new file.
#[derive(Debug, Default)]
pub struct FileSink {
    log_path: String,
    date_pattern: DatePattern,
    filename: String,
}

impl FileSink {
    #[must_use]
    pub fn new(log_path: impl Into<String>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    /// Directory the sink writes into after resolving `~` and relative paths.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        resolve_log_dir(&self.log_path)
    }

    /// Full path of the file `item` would be appended to.
    #[must_use]
    pub fn path_for(&self, item: &LogItem) -> PathBuf {
        let base = if self.filename.is_empty() {
            item.origin.as_str()
        } else {
            self.filename.as_str()
        };
        let date = self.date_pattern.format(&item.timestamp);
        self.directory().join(format!("{base}{date}.log"))
    }
}

impl SinkWriter for FileSink {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        match key.to_ascii_lowercase().as_str() {
            "logpath" => self.log_path = value.trim().to_string(),
            "datetimeformat" => self.date_pattern = DatePattern::parse(value.trim())?,
            "filename" => self.filename = value.trim().to_string(),
            _ => {
                return Err(ConfigError::UnknownProperty {
                    sink_type: "file",
                    property: key.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn write_one(&mut self, _sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
        let path = self.path_for(item);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{item}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::log_level::LogLevel;
    use chrono::{Local, TimeZone};

    fn item_on(day: u32, msg: &str) -> LogItem {
        let ts = Local
            .with_ymd_and_hms(2024, 5, day, 12, 0, 0)
            .single()
            .expect("unambiguous");
        LogItem::at(LogLevel::Info, msg, None, "billing", ts)
    }

    fn info() -> SinkInfo {
        SinkInfo {
            name: "file".into(),
            threshold: LogLevel::Debug,
        }
    }

    #[test]
    fn one_file_per_date_and_appends_within_a_date() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("nested").join("logs");
        let mut sink = FileSink::default();
        sink.set_property("LogPath", &dir.to_string_lossy()).unwrap();
        sink.set_property("DateTimeFormat", "yyyyMMdd").unwrap();

        sink.write_one(&info(), &item_on(1, "first")).unwrap();
        sink.write_one(&info(), &item_on(1, "second")).unwrap();
        sink.write_one(&info(), &item_on(2, "third")).unwrap();

        let day1 = fs::read_to_string(dir.join("billing20240501.log")).unwrap();
        let day2 = fs::read_to_string(dir.join("billing20240502.log")).unwrap();
        assert_eq!(day1.lines().count(), 2);
        assert!(day1.contains("first") && day1.contains("second"));
        assert_eq!(day2.lines().count(), 1);
        assert!(day2.contains("third"));
    }

    #[test]
    fn configured_filename_replaces_origin() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut sink = FileSink::new(tmp.path().to_string_lossy());
        sink.set_property("filename", "audit-").unwrap();
        sink.set_property("datetimeformat", "yyyy-MM").unwrap();

        let path = sink.path_for(&item_on(3, "x"));
        assert_eq!(path, tmp.path().join("audit-2024-05.log"));
    }

    #[test]
    fn bad_pattern_and_unknown_property_are_rejected() {
        let mut sink = FileSink::default();
        assert!(sink.set_property("datetimeformat", "yyyyQQ").is_err());
        assert!(sink.set_property("rotate", "daily").is_err());
    }
}
