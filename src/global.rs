//! Process-wide default logger
//!
//! Used by the macros when no logger is given. It starts with a single
//! console sink (when the `console` feature is enabled) and can be replaced
//! at any time.

use crate::core::{LogLevel, Logger};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<RwLock<Arc<Logger>>> = OnceLock::new();

fn default_logger() -> Logger {
    let logger = Logger::new();
    #[cfg(feature = "console")]
    logger.attach_sink("console", crate::sinks::ConsoleSink::new());
    logger
}

fn cell() -> &'static RwLock<Arc<Logger>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(default_logger())))
}

/// The current global logger.
pub fn logger() -> Arc<Logger> {
    Arc::clone(&cell().read())
}

/// Replace the global logger and return the previous one.
///
/// The previous logger closes its sinks once the last handle to it is
/// dropped.
pub fn set_logger(logger: Logger) -> Arc<Logger> {
    std::mem::replace(&mut *cell().write(), Arc::new(logger))
}

/// Set the threshold of the current global logger.
pub fn set_level(level: LogLevel) {
    logger().set_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    // The only test in this crate that touches the global logger.
    #[test]
    fn test_global_logger_roundtrip() {
        let memory = MemorySink::new();
        let replacement = Logger::new();
        replacement.set_caller_depth(0);
        replacement.attach_sink("memory", memory.clone());

        let previous = set_logger(replacement);
        set_level(LogLevel::Info);
        crate::debug!("filtered {}", 0);
        crate::info!("global {}", 1);
        crate::log!(LogLevel::Error, "global {}", 2);

        assert_eq!(logger().level(), LogLevel::Info);
        assert_eq!(memory.texts(), vec!["[I] global 1", "[E] global 2"]);

        drop(set_logger(Arc::try_unwrap(previous).unwrap_or_else(|_| Logger::new())));
        assert!(memory.is_closed());
    }
}
