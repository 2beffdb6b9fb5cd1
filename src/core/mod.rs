//! Core logger types and traits

pub mod config;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod pipeline;
pub mod sink;

pub use config::{
    format_timestamp, parse_config, split_filename, validate_time_format, ConsoleConfig,
    FileConfig, MultiFileConfig, DEFAULT_EXTENSION, DEFAULT_TIME_FORMAT,
};
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Escalation, LogAbort, Logger, LoggerBuilder, DEFAULT_CALLER_DEPTH};
pub use pipeline::DEFAULT_ASYNC_CAPACITY;
pub use sink::{Sink, SinkKind};
