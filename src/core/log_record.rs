//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};

/// A formatted record on its way to the sinks.
///
/// The text already carries the level tag and, when enabled, the caller
/// location. Records are immutable once built; ownership moves from the
/// caller to the queue to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    level: LogLevel,
    text: String,
    timestamp: DateTime<Local>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so that every record occupies exactly one line in a file sink.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, text: &str) -> Self {
        Self::at(Local::now(), level, text)
    }

    pub fn at(timestamp: DateTime<Local>, level: LogLevel, text: &str) -> Self {
        Self {
            level,
            text: Self::sanitize_message(text),
            timestamp,
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injection_is_escaped() {
        let record = LogRecord::new(LogLevel::Info, "[I] login\n[E] forged\tentry\r");
        assert_eq!(record.text(), "[I] login\\n[E] forged\\tentry\\r");
        assert_eq!(record.level(), LogLevel::Info);
    }
}
