//! Basic logger usage example
//!
//! Demonstrates synchronous logging to the console, level filtering, caller
//! locations and the formatting macros.
//!
//! Run with: cargo run --example basic_usage

use rust_sink_logger::prelude::*;
use rust_sink_logger::{global, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Sink Logger - Basic Usage Example ===\n");

    // Create a synchronous logger with a colored console sink
    let logger = Logger::new();
    logger.add_sink("console", r#"{"color":true}"#)?;

    println!("1. Every level from Debug to Error:");
    logger.debug("Debug message");
    logger.info("Info message");
    logger.warn("Warning message");
    logger.error("Error message");

    println!("\n2. Threshold raised to Warn:");
    logger.set_level(LogLevel::Warn);
    logger.info("This info message is filtered out");
    logger.warn("This warning gets through");

    println!("\n3. Short caller filenames:");
    logger.set_level(LogLevel::Debug);
    logger.set_short_filename(true);
    logger.info("Only the file name is shown");

    println!("\n4. Caller location disabled:");
    logger.set_caller_depth(0);
    info!(logger, "Listening on port {}", 8080);
    warn!(logger, "Retry attempt {} of {}", 3, 5);

    println!("\n5. Errors from results:");
    let parsed: std::result::Result<u16, _> = "eighty".parse::<u16>();
    logger.log_err(LogLevel::Error, &parsed);

    println!("\n6. The global logger:");
    global::set_level(LogLevel::Info);
    info!("Logged through the global logger");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
