//! Sink trait for log output destinations

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

/// A destination for formatted log lines.
///
/// Sinks are shared between the calling threads and the async worker, so
/// every method takes `&self` and implementations guard their own state.
pub trait Sink: Send + Sync {
    /// Configure the sink from a flat JSON document before first use.
    fn init(&mut self, _config: &str) -> Result<()> {
        Ok(())
    }

    fn write(&self, timestamp: &DateTime<Local>, text: &str, level: LogLevel) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Release the sink's resources. Calling it twice must not panic.
    fn close(&self);
}

/// Sink kinds that can be built from a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File,
    MultiFile,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Console => "console",
            SinkKind::File => "file",
            SinkKind::MultiFile => "multifile",
        }
    }

    /// Build an unconfigured sink of this kind.
    ///
    /// Returns `None` when the kind was compiled out.
    pub(crate) fn create(&self) -> Option<Box<dyn Sink>> {
        match self {
            #[cfg(feature = "console")]
            SinkKind::Console => Some(Box::new(crate::sinks::ConsoleSink::new())),
            #[cfg(feature = "file")]
            SinkKind::File => Some(Box::new(crate::sinks::RotatingFileSink::new())),
            #[cfg(feature = "file")]
            SinkKind::MultiFile => Some(Box::new(crate::sinks::MultiFileSink::new())),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "console" => Ok(SinkKind::Console),
            "file" => Ok(SinkKind::File),
            "multifile" => Ok(SinkKind::MultiFile),
            _ => Err(format!("Unknown sink kind: '{}'", s)),
        }
    }
}

/// A registered sink together with the name it was registered under.
pub(crate) struct NamedSink {
    pub(crate) name: String,
    pub(crate) sink: Box<dyn Sink>,
}

/// Ordered sink list shared by the dispatcher and the async worker.
pub(crate) type SinkList = Arc<RwLock<Vec<NamedSink>>>;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Deliver one record to every sink in registration order.
///
/// Each sink is isolated: an error or panic in one is reported to stderr
/// and the remaining sinks still receive the record.
pub(crate) fn fan_out(sinks: &[NamedSink], record: &LogRecord) {
    for named in sinks {
        let result = catch_unwind(AssertUnwindSafe(|| {
            named
                .sink
                .write(record.timestamp(), record.text(), record.level())
        }));

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Sink '{}' write failed: {}", named.name, e);
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                     Other sinks continue to function.",
                    named.name,
                    panic_message(panic_info.as_ref())
                );
            }
        }
    }
}

pub(crate) fn flush_all(sinks: &[NamedSink]) {
    for named in sinks {
        match catch_unwind(AssertUnwindSafe(|| named.sink.flush())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", named.name, e);
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked during flush: {}",
                    named.name,
                    panic_message(panic_info.as_ref())
                );
            }
        }
    }
}

/// Flush, close and drop every sink in the list.
pub(crate) fn destroy_all(sinks: &mut Vec<NamedSink>) {
    flush_all(sinks);
    for named in sinks.drain(..) {
        if let Err(panic_info) = catch_unwind(AssertUnwindSafe(|| named.sink.close())) {
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked during close: {}",
                named.name,
                panic_message(panic_info.as_ref())
            );
        }
    }
}
