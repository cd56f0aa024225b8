pub mod date_pattern;
pub mod global;
pub mod log_item;
pub mod log_level;
pub mod log_macros;
pub mod log_sink;
pub mod logger;
pub(crate) mod paths;
pub mod sink_config;
pub mod sink_error;
pub(crate) mod sink_queue;
pub mod sink_writer;
pub mod sinks;
pub mod tcp_client;

pub use date_pattern::DatePattern;
pub use log_item::LogItem;
pub use log_level::LogLevel;
pub use log_sink::{LogSink, SinkStats};
pub use logger::{Logger, LoggerSetup};
pub use sink_config::{SinkDescriptor, SinkRegistry};
pub use sink_error::{SinkError, SinkSetupError};
pub use sink_writer::{SinkInfo, SinkWriter};
pub use tcp_client::{ClientEvent, MessageSplitter, TcpLogClient};
