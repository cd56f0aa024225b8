//! Optional process-wide logger.
//!
//! Code that owns its [`Logger`] should pass it around explicitly; this slot
//! exists for call sites that cannot be threaded a handle.

use std::sync::OnceLock;

use crate::log::logger::Logger;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Installs `logger` as the process-wide logger.
///
/// # Errors
///
/// Hands `logger` back if a different logger was already installed.
/// Installing a clone of the current logger again succeeds.
pub fn init(logger: Logger) -> Result<&'static Logger, Logger> {
    let installed = GLOBAL.get_or_init(|| logger.clone());
    if installed.shares_sinks_with(&logger) {
        Ok(installed)
    } else {
        Err(logger)
    }
}

/// The installed logger, if any.
#[must_use]
pub fn get() -> Option<&'static Logger> {
    GLOBAL.get()
}
