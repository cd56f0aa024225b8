pub mod console_sink;
pub mod database_sink;
#[cfg(unix)]
pub mod event_log_sink;
pub mod file_sink;
pub mod tcp_sink;

pub use console_sink::{ConsoleSink, ConsoleStream};
pub use database_sink::DatabaseSink;
#[cfg(unix)]
pub use event_log_sink::EventLogSink;
pub use file_sink::FileSink;
pub use tcp_sink::TcpSink;
