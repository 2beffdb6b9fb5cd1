//! File logging example
//!
//! Demonstrates a rotating file sink and a multi-file sink that splits
//! records by level.
//!
//! Run with: cargo run --example file_logging

use rust_sink_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Sink Logger - File Logging Example ===\n");

    let logger = Logger::new();
    logger.set_short_filename(true);

    // Rotate every 10 lines, keep rotated files for a week
    logger.add_sink(
        "file",
        r#"{"filename":"logs/application.log","maxline":10,"maxday":7}"#,
    )?;

    // Warnings and errors get their own files, plus one undivided file
    logger.attach_sink(
        "split",
        MultiFileSink::open(
            MultiFileConfig::new(FileConfig::new("logs/split.log"))
                .with_separate(["warn", "error"])
                .with_full(true),
        )?,
    );

    println!("1. Logging to both file sinks:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warn("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("2. Forcing a few line rotations:");
    for i in 1..=25 {
        logger.info(format_args!("Processing item {}/25", i));
    }

    logger.flush();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/' for application.log, its rotated files and the split.*.log files");

    Ok(())
}
