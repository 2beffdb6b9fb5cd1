//! Async logging example
//!
//! Demonstrates async delivery from several threads with a synchronous flush
//! barrier and an orderly close.
//!
//! Run with: cargo run --example async_logging

use rust_sink_logger::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Sink Logger - Async Logging Example ===\n");

    let logger = Logger::builder()
        .min_level(LogLevel::Info)
        .short_filename(true)
        .sink("console", r#"{"color":true}"#)
        .sink("file", r#"{"filename":"async_test.log","maxsize":1048576}"#)
        .async_mode(1000)
        .build()?;

    println!("1. High-volume async logging:");
    for i in 0..100 {
        logger.info(format_args!("Message #{}", i));
    }
    logger.flush();
    println!("   Logged and flushed 100 messages");

    println!("\n2. Multi-threaded logging:");
    let logger = Arc::new(logger);
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    logger.info(format_args!("Thread {} - Message {}", thread_id, i));
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("a producer thread panicked");
        }
    }
    println!("   5 threads logged 20 messages each");

    // Drains the queue and closes both sinks
    logger.close();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'async_test.log' for file output");

    Ok(())
}
