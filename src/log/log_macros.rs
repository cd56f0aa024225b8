//! Leveled logging macros over a [`Logger`](crate::log::Logger).
//!
//! # Feature Flags
//! verbose levels are controlled by cargo features:
//! `log-debug`, `log-info`, `log-warning`. Each feature enables the ones
//! above it. `logger_error!` and `logger_fatal!` are always available.
//!
//! If a feature is disabled, the corresponding macro expands to `()`, removing
//! all formatting and allocation overhead at compile time.
//!
//! ```rust,ignore
//! logger_info!(logger, "user {} signed in", user_id);
//! logger_error!(logger, cause = &err; "payment {} failed", id);
//! ```

// ============================================================================
// 1. GENERIC MACRO
// ============================================================================

#[macro_export]
macro_rules! logger_log {
    ($logger:expr, $lvl:expr, cause = $cause:expr; $($arg:tt)*) => {{
        let __lvl = $lvl;
        if $logger.enabled(__lvl) {
            let __msg = format!($($arg)*);
            $logger.log(__lvl, &__msg, Some($cause as &dyn ::std::error::Error));
        }
    }};
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {{
        let __lvl = $lvl;
        if $logger.enabled(__lvl) {
            let __msg = format!($($arg)*);
            $logger.log(__lvl, &__msg, None);
        }
    }};
}

// ============================================================================
// 2. LEVEL-SPECIFIC MACROS (Feature Gated)
// ============================================================================

// ---------------------- DEBUG ----------------------
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! logger_debug { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::LogLevel::Debug, $($arg)*) } }

#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! logger_debug {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- INFO ----------------------
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! logger_info { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::LogLevel::Info, $($arg)*) } }

#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! logger_info {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- WARNING ----------------------
#[cfg(feature = "log-warning")]
#[macro_export]
macro_rules! logger_warning { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::LogLevel::Warning, $($arg)*) } }

#[cfg(not(feature = "log-warning"))]
#[macro_export]
macro_rules! logger_warning {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- ERROR / FATAL ----------------------
#[macro_export]
macro_rules! logger_error { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::LogLevel::Error, $($arg)*) } }

#[macro_export]
macro_rules! logger_fatal { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::LogLevel::Fatal, $($arg)*) } }
