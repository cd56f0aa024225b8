use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

/// Errors raised while reading configuration or applying it to a sink.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: &'static str },
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("unknown log level `{0}`")]
    InvalidLevel(String),
    #[error("unknown sink type `{0}`")]
    UnknownSinkType(String),
    #[error("unknown property `{property}` for {sink_type} sink")]
    UnknownProperty {
        sink_type: &'static str,
        property: String,
    },
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// INI-style configuration: global `key = value` pairs followed by
/// `[section]` blocks. Sections and keys keep their declaration order.
#[derive(Debug, Default, Clone)]
pub struct Config {
    pub globals: IndexMap<String, String>,
    pub sections: IndexMap<String, IndexMap<String, String>>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut globals = IndexMap::new();
        let mut sections: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        let mut current_section: Option<String> = None;

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') || line.len() < 3 {
                    return Err(ConfigError::Syntax {
                        line: idx + 1,
                        reason: "unterminated section header",
                    });
                }
                let name = line[1..line.len() - 1].trim().to_string();
                sections.entry(name.clone()).or_default();
                current_section = Some(name);
                continue;
            }

            let Some(pos) = line.find('=') else {
                return Err(ConfigError::Syntax {
                    line: idx + 1,
                    reason: "expected `key = value`",
                });
            };
            let key = line[..pos].trim().to_string();
            let value = line[pos + 1..].trim().trim_matches('"').to_string();

            match &current_section {
                None => {
                    globals.insert(key, value);
                }
                Some(sec) => {
                    sections.entry(sec.clone()).or_default().insert(key, value);
                }
            }
        }
        Ok(Config { globals, sections })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }

    /// Sections named `<prefix><rest>`, yielded as `(rest, entries)` in file order.
    pub fn sections_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a IndexMap<String, String>)> + 'a {
        self.sections
            .iter()
            .filter_map(move |(name, entries)| {
                name.strip_prefix(prefix).map(|rest| (rest.trim(), entries))
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# comment
application = "billing"

[sink:console]
type = console
loglevel = debug

[sink:audit]
type = file
logpath = logs
"#;

    #[test]
    fn parses_globals_and_sections_in_order() {
        let cfg = Config::parse(SAMPLE).expect("parse");
        assert_eq!(cfg.get_global("application"), Some("billing"));
        assert_eq!(cfg.get("sink:audit", "logpath"), Some("logs"));

        let names: Vec<&str> = cfg.sections_with_prefix("sink:").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["console", "audit"]);
    }

    #[test]
    fn falls_back_to_global_then_default() {
        let cfg = Config::parse(SAMPLE).expect("parse");
        assert_eq!(cfg.get_or_default("sink:audit", "application", "x"), "billing");
        assert_eq!(cfg.get_or_default("sink:audit", "missing", "x"), "x");
        assert_eq!(cfg.get_non_empty("sink:audit", "missing"), None);
    }

    #[test]
    fn rejects_lines_without_equals() {
        let err = Config::parse("[a]\njust text\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 2, .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/definitely/not/here.ini").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
