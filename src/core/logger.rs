//! Main logger implementation
//!
//! The dispatcher filters a record by level, formats it with the level tag and
//! caller location, then delivers it to every registered sink, either on the
//! calling thread or through the async pipeline once that is enabled.

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::LogRecord,
    pipeline::AsyncPipeline,
    sink::{destroy_all, fan_out, flush_all, NamedSink, Sink, SinkKind, SinkList},
};
use parking_lot::{Mutex, RwLock};
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::{Arc, OnceLock};

/// Caller depth used by a fresh logger. Zero disables the location prefix.
pub const DEFAULT_CALLER_DEPTH: usize = 1;

/// Payload of the unwind raised after a `Panic` record was delivered.
///
/// Carries the formatted line as the sinks received it, level tag and caller
/// location included. Recover it with `std::panic::catch_unwind` and
/// `downcast::<LogAbort>()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{text}")]
pub struct LogAbort {
    text: String,
}

impl LogAbort {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What the caller of [`Logger::dispatch`] is expected to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Escalation {
    Continue,
    /// A `Panic` record was delivered.
    Abort(LogAbort),
    /// A `Fatal` record was delivered.
    Exit,
}

#[derive(Debug, Clone, Copy)]
struct Settings {
    min_level: LogLevel,
    caller_depth: usize,
    short_filename: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            caller_depth: DEFAULT_CALLER_DEPTH,
            short_filename: false,
        }
    }
}

pub struct Logger {
    settings: RwLock<Settings>,
    sinks: SinkList,
    pipeline: OnceLock<AsyncPipeline>,
    /// Serializes mode changes.
    admin: Mutex<()>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    fn with_settings(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            sinks: Arc::new(RwLock::new(Vec::new())),
            pipeline: OnceLock::new(),
            admin: Mutex::new(()),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_sink_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Info)
    ///     .attach("memory", MemorySink::new())
    ///     .async_mode(1000)
    ///     .build()
    ///     .unwrap();
    /// assert!(logger.is_async());
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a sink of `kind` from a JSON configuration document and register
    /// it under the kind's name.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown kind or when the sink rejects its
    /// configuration. The sink is not registered in either case.
    pub fn add_sink(&self, kind: &str, config: &str) -> Result<()> {
        let kind: SinkKind = kind
            .parse()
            .map_err(|_| LoggerError::UnknownSink(kind.to_string()))?;
        let mut sink = kind
            .create()
            .ok_or_else(|| LoggerError::UnknownSink(kind.to_string()))?;
        sink.init(config)?;
        self.register(kind.as_str().to_string(), sink);
        Ok(())
    }

    /// Register an already configured sink under `name`.
    pub fn attach_sink(&self, name: impl Into<String>, sink: impl Sink + 'static) {
        self.register(name.into(), Box::new(sink));
    }

    fn register(&self, name: String, sink: Box<dyn Sink>) {
        self.sinks.write().push(NamedSink { name, sink });
    }

    /// Close and unregister every sink registered under `name`.
    pub fn remove_sink(&self, name: &str) -> Result<()> {
        let mut removed: Vec<NamedSink> = {
            let mut sinks = self.sinks.write();
            let (removed, kept) = std::mem::take(&mut *sinks)
                .into_iter()
                .partition(|named| named.name == name);
            *sinks = kept;
            removed
        };

        if removed.is_empty() {
            return Err(LoggerError::SinkNotFound(name.to_string()));
        }
        destroy_all(&mut removed);
        Ok(())
    }

    /// Names of the registered sinks in delivery order.
    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.read().iter().map(|n| n.name.clone()).collect()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.settings.write().min_level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.settings.read().min_level
    }

    /// Zero disables the `[file:line]` prefix.
    ///
    /// Every positive depth reports the same frame: the outermost caller
    /// reached through `#[track_caller]` functions and the crate's macros.
    /// Wrap a logging call in your own `#[track_caller]` function to report
    /// that function's caller instead.
    pub fn set_caller_depth(&self, depth: usize) {
        self.settings.write().caller_depth = depth;
    }

    pub fn caller_depth(&self) -> usize {
        self.settings.read().caller_depth
    }

    /// Keep only the last path component of the caller's file.
    pub fn set_short_filename(&self, short: bool) {
        self.settings.write().short_filename = short;
    }

    pub fn short_filename(&self) -> bool {
        self.settings.read().short_filename
    }

    /// Switch to async delivery through a bounded queue of `capacity` records
    /// (zero means the default). Later calls are no-ops.
    pub fn enable_async(&self, capacity: usize) -> Result<()> {
        let _guard = self.admin.lock();
        if self.pipeline.get().is_some() {
            return Ok(());
        }
        let pipeline = AsyncPipeline::spawn(capacity, Arc::clone(&self.sinks))?;
        let _ = self.pipeline.set(pipeline);
        Ok(())
    }

    pub fn is_async(&self) -> bool {
        self.pipeline.get().is_some()
    }

    pub fn async_capacity(&self) -> Option<usize> {
        self.pipeline.get().map(AsyncPipeline::capacity)
    }

    /// Filter, format and deliver one record without acting on its level.
    ///
    /// Records below the threshold are dropped and always yield
    /// [`Escalation::Continue`].
    #[track_caller]
    pub fn dispatch(&self, level: LogLevel, args: fmt::Arguments<'_>) -> Escalation {
        let settings = *self.settings.read();
        if level < settings.min_level {
            return Escalation::Continue;
        }

        let message = fmt::format(args);
        let mut text = String::with_capacity(message.len() + 32);
        text.push_str(level.prefix());
        if settings.caller_depth > 0 {
            let location = Location::caller();
            let file = if settings.short_filename {
                short_name(location.file())
            } else {
                location.file()
            };
            let _ = write!(text, "[{}:{}] ", file, location.line());
        }
        text.push_str(&message);

        let record = LogRecord::new(level, &text);
        match self.pipeline.get() {
            Some(pipeline) => {
                if let Err(e) = pipeline.submit(record) {
                    eprintln!("[LOGGER ERROR] Record dropped: {}", e);
                }
            }
            None => fan_out(&self.sinks.read(), &record),
        }

        match level {
            LogLevel::Panic => Escalation::Abort(LogAbort { text }),
            LogLevel::Fatal => Escalation::Exit,
            _ => Escalation::Continue,
        }
    }

    /// Log pre-formatted arguments. Used by the crate's macros.
    #[track_caller]
    pub fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let escalation = self.dispatch(level, args);
        self.escalate(escalation);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        self.log_fmt(level, format_args!("{}", message));
    }

    /// Log the error of `result` at `level`; `Ok` is ignored.
    #[track_caller]
    pub fn log_err<T, E: fmt::Display>(&self, level: LogLevel, result: &std::result::Result<T, E>) {
        if let Err(e) = result {
            self.log_fmt(level, format_args!("{}", e));
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    /// Log at `Panic`, then unwind with a [`LogAbort`] payload.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) {
        self.log(LogLevel::Panic, message);
    }

    /// Log at `Fatal`, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(LogLevel::Fatal, message);
    }

    fn escalate(&self, escalation: Escalation) {
        match escalation {
            Escalation::Continue => {}
            Escalation::Abort(abort) => {
                self.flush();
                std::panic::panic_any(abort);
            }
            Escalation::Exit => {
                self.flush();
                std::process::exit(1);
            }
        }
    }

    /// Block until every record logged before this call reached the sinks,
    /// then flush them.
    pub fn flush(&self) {
        match self.pipeline.get() {
            Some(pipeline) => pipeline.flush(),
            None => flush_all(&self.sinks.read()),
        }
    }

    /// Deliver what is pending, then close and unregister every sink. The
    /// logger stays usable and new sinks may be added.
    pub fn reset(&self) {
        self.flush();
        destroy_all(&mut self.sinks.write());
    }

    /// Deliver what is pending, close every sink and stop the async worker.
    pub fn close(&self) {
        match self.pipeline.get() {
            Some(pipeline) => pipeline.close(),
            None => destroy_all(&mut self.sinks.write()),
        }
    }
}

fn short_name(file: &str) -> &str {
    file.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file)
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

enum PendingSink {
    Configured { kind: String, config: String },
    Attached { name: String, sink: Box<dyn Sink> },
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use rust_sink_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Info)
///     .short_filename(true)
///     .sink("console", r#"{"color":true}"#)
///     .sink("file", r#"{"filename":"logs/app.log","maxline":10000}"#)
///     .async_mode(1000)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    settings: Settings,
    sinks: Vec<PendingSink>,
    async_capacity: Option<usize>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            sinks: Vec::new(),
            async_capacity: None,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.settings.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn caller_depth(mut self, depth: usize) -> Self {
        self.settings.caller_depth = depth;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn short_filename(mut self, short: bool) -> Self {
        self.settings.short_filename = short;
        self
    }

    /// Add a sink built from a configuration document, as
    /// [`Logger::add_sink`] does.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn sink(mut self, kind: impl Into<String>, config: impl Into<String>) -> Self {
        self.sinks.push(PendingSink::Configured {
            kind: kind.into(),
            config: config.into(),
        });
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn attach(mut self, name: impl Into<String>, sink: impl Sink + 'static) -> Self {
        self.sinks.push(PendingSink::Attached {
            name: name.into(),
            sink: Box::new(sink),
        });
        self
    }

    /// Enable async mode with the given queue capacity
    ///
    /// If not called, the logger will use synchronous mode.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn async_mode(mut self, capacity: usize) -> Self {
        self.async_capacity = Some(capacity);
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns the first sink configuration error, or a spawn error for the
    /// async worker.
    pub fn build(self) -> Result<Logger> {
        let logger = Logger::with_settings(self.settings);

        for pending in self.sinks {
            match pending {
                PendingSink::Configured { kind, config } => logger.add_sink(&kind, &config)?,
                PendingSink::Attached { name, sink } => logger.register(name, sink),
            }
        }

        if let Some(capacity) = self.async_capacity {
            logger.enable_async(capacity)?;
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
