//! In-memory sink that captures formatted lines

use crate::core::{LogLevel, LoggerError, Result, Sink};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub text: String,
}

#[derive(Debug, Default)]
struct Shared {
    lines: Mutex<Vec<CapturedLine>>,
    flushes: Mutex<usize>,
    closed: AtomicBool,
}

/// A sink that keeps every line in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the logger
/// and inspect the other.
///
/// # Examples
///
/// ```
/// use rust_sink_logger::{Logger, LogLevel, MemorySink};
///
/// let memory = MemorySink::new();
/// let logger = Logger::new();
/// logger.set_caller_depth(0);
/// logger.attach_sink("memory", memory.clone());
///
/// logger.info("hello");
/// assert_eq!(memory.texts(), vec!["[I] hello".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    shared: Arc<Shared>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.shared.lines.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.shared
            .lines
            .lock()
            .iter()
            .map(|line| line.text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shared.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush_count(&self) -> usize {
        *self.shared.flushes.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

impl Sink for MemorySink {
    fn write(&self, timestamp: &DateTime<Local>, text: &str, level: LogLevel) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::SinkClosed);
        }
        self.shared.lines.lock().push(CapturedLine {
            timestamp: *timestamp,
            level,
            text: text.to_string(),
        });
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        *self.shared.flushes.lock() += 1;
        Ok(())
    }

    fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
    }
}
