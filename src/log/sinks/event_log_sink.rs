use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::log::log_item::LogItem;
use crate::log::log_level::LogLevel;
use crate::log::sink_error::SinkError;
use crate::log::sink_writer::{SinkInfo, SinkWriter};

pub const DEFAULT_SYSLOG_SOCKET: &str = "/dev/log";

/// Syslog facilities accepted by the `facility` property.
const FACILITIES: &[(&str, u8)] = &[
    ("user", 1),
    ("application", 1),
    ("daemon", 3),
    ("system", 3),
    ("local0", 16),
    ("local1", 17),
    ("local2", 18),
    ("local3", 19),
    ("local4", 20),
    ("local5", 21),
    ("local6", 22),
    ("local7", 23),
];

/// Sends entries to the local system log as RFC 3164 datagrams.
///
/// The originating process name is the syslog identity.
pub struct EventLogSink {
    socket_path: PathBuf,
    facility: u8,
    socket: Option<UnixDatagram>,
}

impl Default for EventLogSink {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SYSLOG_SOCKET),
            facility: 1,
            socket: None,
        }
    }
}

/// Nearest syslog severity for a log level.
#[must_use]
pub fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Debug | LogLevel::Info => 6,
        LogLevel::Warning => 4,
        LogLevel::Error => 3,
        LogLevel::Fatal => 2,
    }
}

impl EventLogSink {
    #[must_use]
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Self::default()
        }
    }

    /// Renders one datagram: `<PRI>Mmm dd hh:mm:ss ident[pid]: text`.
    #[must_use]
    pub fn datagram(&self, item: &LogItem) -> String {
        let pri = u16::from(self.facility) * 8 + u16::from(severity(item.level));
        let text = item.to_string().replace('\n', " | ");
        format!(
            "<{pri}>{} {}[{}]: {text}",
            item.timestamp.format("%b %e %H:%M:%S"),
            item.origin,
            std::process::id()
        )
    }
}

impl SinkWriter for EventLogSink {
    fn kind(&self) -> &'static str {
        "eventlog"
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        match key.to_ascii_lowercase().as_str() {
            "socket" => {
                self.socket_path = PathBuf::from(value.trim());
                self.socket = None;
            }
            "facility" | "logname" => {
                let wanted = value.trim();
                self.facility = FACILITIES
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(wanted))
                    .map(|&(_, code)| code)
                    .ok_or_else(|| ConfigError::invalid(key, value, "unknown syslog facility"))?;
            }
            _ => {
                return Err(ConfigError::UnknownProperty {
                    sink_type: "eventlog",
                    property: key.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn open(&mut self, _sink: &SinkInfo) -> Result<(), SinkError> {
        self.socket = Some(UnixDatagram::unbound()?);
        Ok(())
    }

    fn write_one(&mut self, _sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
        if self.socket.is_none() {
            self.socket = Some(UnixDatagram::unbound()?);
        }
        let socket = self.socket.as_ref().ok_or(SinkError::NotOpen("eventlog"))?;
        socket.send_to(self.datagram(item).as_bytes(), &self.socket_path)?;
        Ok(())
    }

    fn close(&mut self) {
        self.socket = None;
    }
}
