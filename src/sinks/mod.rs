//! Sink implementations

#[cfg(feature = "console")]
pub mod console;
pub mod memory;
#[cfg(feature = "file")]
pub mod multi_file;
#[cfg(feature = "file")]
pub mod rotating_file;

#[cfg(feature = "console")]
pub use console::ConsoleSink;
pub use memory::{CapturedLine, MemorySink};
#[cfg(feature = "file")]
pub use multi_file::MultiFileSink;
#[cfg(feature = "file")]
pub use rotating_file::RotatingFileSink;
