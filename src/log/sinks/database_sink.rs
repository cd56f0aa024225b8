use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::config::ConfigError;
use crate::log::log_item::LogItem;
use crate::log::sink_error::SinkError;
use crate::log::sink_writer::{SinkInfo, SinkWriter};

/// Columns the sink knows how to fill. Any subset may exist in the table.
pub const LOG_COLUMNS: [&str; 7] = [
    "ApplicationName",
    "LoggerName",
    "Severity",
    "Message",
    "FullMessage",
    "Exception",
    "LogDate",
];

pub const DEFAULT_TABLE: &str = "Log";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    name: String,
    max_len: Option<usize>,
}

/// Inserts one row per entry into a SQLite table.
///
/// A connection is opened per entry and the table's columns are read back
/// each time, so the table can be altered while the process runs. Values
/// longer than a `VARCHAR(n)`-style declared size are cut to `n` characters.
#[derive(Debug)]
pub struct DatabaseSink {
    database: String,
    table: String,
}

impl Default for DatabaseSink {
    fn default() -> Self {
        Self {
            database: String::new(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl DatabaseSink {
    #[must_use]
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }

    fn columns(&self, conn: &Connection) -> rusqlite::Result<Vec<Column>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(&self.table)))?;
        let rows = stmt.query_map([], |row| {
            let name: String = row.get(1)?;
            let decl: String = row.get::<_, Option<String>>(2)?.unwrap_or_default();
            Ok(Column {
                name,
                max_len: declared_max_len(&decl),
            })
        })?;
        rows.collect()
    }

    fn value_for(&self, column: &str, sink: &SinkInfo, item: &LogItem) -> Option<String> {
        let known = LOG_COLUMNS
            .iter()
            .find(|c| c.eq_ignore_ascii_case(column))?;
        let v = match *known {
            "ApplicationName" => item.origin.clone(),
            "LoggerName" => sink.name.clone(),
            "Severity" => item.level.as_str().to_string(),
            "Message" => item.message.clone(),
            "FullMessage" => item.to_string(),
            "Exception" => item.cause_or_none().to_string(),
            _ => item.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        };
        Some(v)
    }
}

impl SinkWriter for DatabaseSink {
    fn kind(&self) -> &'static str {
        "database"
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        match key.to_ascii_lowercase().as_str() {
            "connectionstring" => self.database = data_source(value),
            "tablename" => {
                let t = value.trim();
                if t.is_empty() {
                    return Err(ConfigError::invalid(key, value, "table name is empty").into());
                }
                self.table = t.to_string();
            }
            _ => {
                return Err(ConfigError::UnknownProperty {
                    sink_type: "database",
                    property: key.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn open(&mut self, _sink: &SinkInfo) -> Result<(), SinkError> {
        if self.database.is_empty() {
            return Err(ConfigError::MissingKey("connectionstring").into());
        }
        Ok(())
    }

    fn write_one(&mut self, sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
        if self.database.is_empty() {
            return Err(SinkError::NotOpen("database"));
        }
        let conn = Connection::open(&self.database)?;

        let mut names = Vec::new();
        let mut values = Vec::new();
        for col in self.columns(&conn)? {
            let Some(v) = self.value_for(&col.name, sink, item) else {
                continue;
            };
            let v = match col.max_len {
                Some(max) => truncate_chars(&v, max),
                None => v,
            };
            names.push(quote_ident(&col.name));
            values.push(Value::Text(v));
        }
        if names.is_empty() {
            return Err(SinkError::NoLogColumns(self.table.clone()));
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            quote_ident(&self.table),
            names.join(", ")
        );
        conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }
}

/// Accepts either a bare path or a `Data Source=<path>;...` connection string.
fn data_source(value: &str) -> String {
    let value = value.trim();
    if !value.contains('=') {
        return value.to_string();
    }
    value
        .split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(k, _)| {
            let k = k.trim();
            k.eq_ignore_ascii_case("data source") || k.eq_ignore_ascii_case("datasource")
        })
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_else(|| value.to_string())
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `VARCHAR(50)` -> 50. Types without a single size argument are unbounded.
fn declared_max_len(decl: &str) -> Option<usize> {
    let open = decl.find('(')?;
    let close = decl[open..].find(')')? + open;
    decl[open + 1..close].trim().parse().ok()
}

/// Keeps the first `max` characters of `s`.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::log_level::LogLevel;

    fn info() -> SinkInfo {
        SinkInfo {
            name: "db".into(),
            threshold: LogLevel::Debug,
        }
    }

    #[test]
    fn parses_declared_sizes() {
        assert_eq!(declared_max_len("VARCHAR(50)"), Some(50));
        assert_eq!(declared_max_len("nvarchar( 8 )"), Some(8));
        assert_eq!(declared_max_len("TEXT"), None);
        assert_eq!(declared_max_len("NUMERIC(10,2)"), None);
    }

    #[test]
    fn truncation_keeps_leading_characters() {
        assert_eq!(truncate_chars("billing", 4), "bill");
        assert_eq!(truncate_chars("ab", 4), "ab");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn connection_string_forms() {
        assert_eq!(data_source(" /tmp/log.db "), "/tmp/log.db");
        assert_eq!(data_source("Data Source=/tmp/a.db;Version=3"), "/tmp/a.db");
    }

    #[test]
    fn fills_only_existing_columns_and_truncates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db = tmp.path().join("log.db");
        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch(
                "CREATE TABLE Log (
                    Id INTEGER PRIMARY KEY,
                    ApplicationName VARCHAR(4),
                    LoggerName TEXT,
                    Severity TEXT,
                    Message TEXT,
                    Exception TEXT,
                    Extra TEXT
                );",
            )
            .unwrap();
        }

        let mut sink = DatabaseSink::default();
        sink.set_property("ConnectionString", &db.to_string_lossy()).unwrap();
        sink.open(&info()).unwrap();
        let item = LogItem::new(LogLevel::Error, "payment declined", None, "billing");
        sink.write_one(&info(), &item).unwrap();

        let conn = Connection::open(&db).unwrap();
        let row: (String, String, String, String, String, Option<String>) = conn
            .query_row(
                "SELECT ApplicationName, LoggerName, Severity, Message, Exception, Extra FROM Log",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
            )
            .unwrap();
        assert_eq!(row.0, "bill");
        assert_eq!(row.1, "db");
        assert_eq!(row.2, "Error");
        assert_eq!(row.3, "payment declined");
        assert_eq!(row.4, "None");
        assert_eq!(row.5, None);
    }

    #[test]
    fn every_known_column_has_a_value_and_matching_ignores_case() {
        let sink = DatabaseSink::default();
        let item = LogItem::new(LogLevel::Warning, "low disk", None, "billing");
        for column in LOG_COLUMNS {
            assert!(sink.value_for(column, &info(), &item).is_some(), "{column}");
            let lower = column.to_ascii_lowercase();
            assert!(sink.value_for(&lower, &info(), &item).is_some(), "{lower}");
        }
        assert_eq!(sink.value_for("SEVERITY", &info(), &item).as_deref(), Some("Warning"));
        assert!(sink.value_for("LogDate", &info(), &item).is_some_and(|d| d.len() == 23));
        assert!(sink.value_for("Extra", &info(), &item).is_none());
    }

    #[test]
    fn table_without_log_columns_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let db = tmp.path().join("other.db");
        Connection::open(&db)
            .unwrap()
            .execute_batch("CREATE TABLE Log (Foo TEXT);")
            .unwrap();

        let mut sink = DatabaseSink::new(db.to_string_lossy(), "Log");
        let item = LogItem::new(LogLevel::Info, "x", None, "app");
        assert!(matches!(
            sink.write_one(&info(), &item),
            Err(SinkError::NoLogColumns(_))
        ));
    }

    #[test]
    fn open_requires_connection_string() {
        let mut sink = DatabaseSink::default();
        assert!(sink.open(&info()).is_err());
        assert!(sink.set_property("tablename", "  ").is_err());
    }
}
