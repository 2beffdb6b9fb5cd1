//! # Rust Sink Logger
//!
//! A level-filtered logging core that fans every record out to a set of
//! independently configured sinks.
//!
//! ## Features
//!
//! - **Sinks**: console, rotating file and split-by-level multi-file sinks,
//!   configured from flat JSON documents or typed configs
//! - **Rotation**: by line count, byte size or local midnight, with
//!   collision-free rotated filenames and background purge of old files
//! - **Async Delivery**: optional bounded queue with a single worker, strict
//!   ordering and synchronous `flush`/`close`
//! - **Escalation**: `Panic` records unwind and `Fatal` records exit the
//!   process after they were delivered
//!
//! ## Example
//!
//! ```
//! use rust_sink_logger::prelude::*;
//!
//! let memory = MemorySink::new();
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Info)
//!     .caller_depth(0)
//!     .attach("memory", memory.clone())
//!     .build()
//!     .unwrap();
//!
//! logger.debug("dropped");
//! logger.info("kept");
//! assert_eq!(memory.texts(), vec!["[I] kept".to_string()]);
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ConsoleConfig, Escalation, FileConfig, LogAbort, LogLevel, Logger, LoggerBuilder,
        LoggerError, MultiFileConfig, Result, Sink, SinkKind,
    };
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleSink;
    pub use crate::sinks::MemorySink;
    #[cfg(feature = "file")]
    pub use crate::sinks::{MultiFileSink, RotatingFileSink};
}

pub use crate::core::{
    ConsoleConfig, Escalation, FileConfig, LogAbort, LogLevel, LogRecord, Logger, LoggerBuilder,
    LoggerError, MultiFileConfig, Result, Sink, SinkKind, DEFAULT_ASYNC_CAPACITY,
    DEFAULT_CALLER_DEPTH, DEFAULT_TIME_FORMAT,
};
#[cfg(feature = "console")]
pub use crate::sinks::ConsoleSink;
#[cfg(feature = "file")]
pub use crate::sinks::{MultiFileSink, RotatingFileSink};
pub use crate::sinks::{CapturedLine, MemorySink};
