//! Date patterns in the `yyyyMMdd` custom-format dialect, rendered with chrono.

use chrono::{DateTime, TimeZone};

use crate::config::ConfigError;

pub const DEFAULT_DATE_PATTERN: &str = "yyyyMMdd";

/// A validated date pattern such as `yyyyMMdd` or `yyyy-MM-dd_HH`.
///
/// Supported tokens: `yyyy yy MMMM MMM MM M dddd ddd dd d HH H hh h mm m ss s fff ff f tt`.
/// Text inside single quotes is literal, as is any non-alphanumeric character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Strftime(String),
    /// Leading `n` digits of the millisecond field; chrono has no 1 or 2 digit form.
    Fraction(usize),
}

impl DatePattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::invalid("datetimeformat", pattern, reason);
        let chars: Vec<char> = pattern.chars().collect();
        let mut segments = Vec::new();
        let mut out = String::with_capacity(pattern.len() * 2);
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\'' {
                let Some(end) = chars[i + 1..].iter().position(|&q| q == '\'') else {
                    return Err(invalid("unterminated quote".into()));
                };
                for &lit in &chars[i + 1..i + 1 + end] {
                    push_literal(&mut out, lit);
                }
                i += end + 2;
                continue;
            }
            if !c.is_ascii_alphanumeric() || c.is_ascii_digit() {
                push_literal(&mut out, c);
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            let spec = match (c, run) {
                ('y', 4) => "%Y",
                ('y', 2) => "%y",
                ('M', 4) => "%B",
                ('M', 3) => "%b",
                ('M', 2) => "%m",
                ('M', 1) => "%-m",
                ('d', 4) => "%A",
                ('d', 3) => "%a",
                ('d', 2) => "%d",
                ('d', 1) => "%-d",
                ('H', 2) => "%H",
                ('H', 1) => "%-H",
                ('h', 2) => "%I",
                ('h', 1) => "%-I",
                ('m', 2) => "%M",
                ('m', 1) => "%-M",
                ('s', 2) => "%S",
                ('s', 1) => "%-S",
                ('f', 3) => "%3f",
                ('f', n @ 1..=2) => {
                    if !out.is_empty() {
                        segments.push(Segment::Strftime(std::mem::take(&mut out)));
                    }
                    segments.push(Segment::Fraction(n));
                    i += run;
                    continue;
                }
                ('t', 2) => "%p",
                _ => {
                    let token: String = std::iter::repeat_n(c, run).collect();
                    return Err(invalid(format!("unsupported token `{token}`")));
                }
            };
            out.push_str(spec);
            i += run;
        }

        if !out.is_empty() {
            segments.push(Segment::Strftime(out));
        }
        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn format<Tz>(&self, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut rendered = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Strftime(f) => rendered.push_str(&at.format(f).to_string()),
                Segment::Fraction(n) => {
                    let millis = at.format("%3f").to_string();
                    rendered.push_str(&millis[..*n]);
                }
            }
        }
        rendered
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self {
            raw: DEFAULT_DATE_PATTERN.to_string(),
            segments: vec![Segment::Strftime("%Y%m%d".to_string())],
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
