//! fanlog is a pluggable logging library with an attached validation engine.
//!
//! Log calls fan out to any number of sinks. Each sink owns a bounded queue
//! and a worker thread, so a slow or failing destination never holds up the
//! caller or the other sinks. Sinks are declared in an INI file and started
//! by [`log::Logger::from_config`].
//!
//! The crate also ships a `fanlog-tail` binary that connects to a TCP sink
//! and prints the entries it broadcasts.

/// Loads INI configuration files.
pub mod config;
/// Log levels, entries, sinks and the fan-out logger.
pub mod log;
/// Declarative, cached property validation.
pub mod validation;
