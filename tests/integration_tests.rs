//! Integration tests for the sink logger
//!
//! These tests verify:
//! - Sink registration from configuration documents
//! - Line rotation and successor filenames
//! - Level split of the multi-file sink
//! - Async delivery into file sinks
//! - Log injection prevention
//! - Removal and reset of sinks

#![cfg(feature = "file")]

use chrono::Local;
use rust_sink_logger::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(str::to_string)
        .collect()
}

fn file_config(path: &Path, extra: &str) -> String {
    // Backslashes in Windows paths must be escaped inside JSON.
    let filename = path.display().to_string().replace('\\', "\\\\");
    if extra.is_empty() {
        format!(r#"{{"filename":"{}"}}"#, filename)
    } else {
        format!(r#"{{"filename":"{}",{}}}"#, filename, extra)
    }
}

fn quiet_logger() -> Logger {
    let logger = Logger::new();
    logger.set_caller_depth(0);
    logger
}

#[test]
fn test_file_sink_rotates_by_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("test.log");

    let logger = quiet_logger();
    logger
        .add_sink("file", &file_config(&log_file, r#""maxline":4"#))
        .expect("Failed to add file sink");

    for i in 1..=6 {
        logger.info(format_args!("record {}", i));
    }
    logger.flush();

    let rotated = temp_dir
        .path()
        .join(format!("test.{}.001.log", Local::now().format("%Y-%m-%d")));
    let rotated_lines = read_lines(&rotated);
    assert_eq!(rotated_lines.len(), 4);
    assert!(rotated_lines[0].ends_with("[I] record 1"));

    let active = read_lines(&log_file);
    assert_eq!(active.len(), 2);
    assert!(active[0].ends_with("[I] record 5"));
    assert!(active[1].ends_with("[I] record 6"));

    let entries = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(entries, 2, "exactly one rotated file plus the active file");
}

#[test]
fn test_file_line_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("format.log");

    let logger = quiet_logger();
    logger
        .add_sink("file", &file_config(&log_file, r#""timeformat":"%Y/%m/%d""#))
        .unwrap();

    logger.warn("disk at 91%");
    logger.flush();

    let today = Local::now().format("%Y/%m/%d").to_string();
    assert_eq!(read_lines(&log_file), vec![format!("{} [W] disk at 91%", today)]);
}

#[test]
fn test_multifile_split_without_full() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("test.log");

    let logger = quiet_logger();
    logger
        .add_sink(
            "multifile",
            &file_config(&log_file, r#""separate":["debug","info"]"#),
        )
        .expect("Failed to add multifile sink");

    logger.debug("debug record");
    logger.info("info record");
    logger.flush();

    let debug = read_lines(&temp_dir.path().join("test.debug.log"));
    let info = read_lines(&temp_dir.path().join("test.info.log"));
    assert_eq!(debug.len(), 1);
    assert!(debug[0].ends_with("[D] debug record"));
    assert_eq!(info.len(), 1);
    assert!(info[0].ends_with("[I] info record"));
    assert!(!log_file.exists());
}

#[test]
fn test_multifile_split_with_full() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("test.log");

    let logger = quiet_logger();
    logger
        .add_sink(
            "multifile",
            &file_config(&log_file, r#""separate":["debug","info"],"full":true"#),
        )
        .unwrap();

    logger.debug("debug record");
    logger.error("error record");
    logger.flush();

    assert_eq!(read_lines(&temp_dir.path().join("test.debug.log")).len(), 1);
    let full = read_lines(&log_file);
    assert_eq!(full.len(), 2);
    assert!(full[0].ends_with("[D] debug record"));
    assert!(full[1].ends_with("[E] error record"));
}

#[test]
fn test_multifile_duplicate_level_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("test.log");

    let logger = quiet_logger();
    let err = logger
        .add_sink(
            "multifile",
            &file_config(&log_file, r#""separate":["info","info"]"#),
        )
        .unwrap_err();

    assert!(matches!(err, LoggerError::DuplicateLevel(_)));
    assert!(logger.sink_names().is_empty());
}

#[test]
fn test_malformed_config_is_rejected() {
    let logger = quiet_logger();

    let err = logger.add_sink("file", r#"{"maxline":"four"}"#).unwrap_err();
    assert!(matches!(err, LoggerError::MalformedConfig { .. }));

    let err = logger.add_sink("file", "{not json").unwrap_err();
    assert!(err.is_config());
    assert!(logger.sink_names().is_empty());
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let logger = quiet_logger();
    logger.add_sink("file", &file_config(&log_file, "")).unwrap();

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\r\tINFO Continuation";
    logger.info(malicious_message);
    logger.flush();

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(lines[0].contains("User login\\nERROR [2024-10-17] Fake error injected\\r\\tINFO"));
}

#[test]
fn test_async_file_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("async_test.log");

    let logger = quiet_logger();
    logger.add_sink("file", &file_config(&log_file, "")).unwrap();
    logger.enable_async(16).unwrap();

    for i in 0..500 {
        logger.info(format_args!("Message {}", i));
    }
    logger.flush();

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 500);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!("[I] Message {}", i)), "out of order: {}", line);
    }
}

#[test]
fn test_async_rotation_keeps_every_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");

    let logger = Logger::builder()
        .caller_depth(0)
        .sink("file", file_config(&log_file, r#""maxline":10,"daily":false"#))
        .async_mode(8)
        .build()
        .unwrap();

    for i in 0..35 {
        logger.info(format_args!("entry {}", i));
    }
    logger.close();

    let mut total = 0;
    for entry in fs::read_dir(temp_dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let lines = read_lines(&path);
        assert!(lines.len() <= 10);
        total += lines.len();
    }
    assert_eq!(total, 35);
    assert_eq!(read_lines(&log_file).len(), 5);
}

#[test]
fn test_remove_file_sink_closes_it() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("removed.log");
    let memory = MemorySink::new();

    let logger = quiet_logger();
    logger.add_sink("file", &file_config(&log_file, "")).unwrap();
    logger.attach_sink("memory", memory.clone());

    logger.info("both sinks");
    logger.remove_sink("file").unwrap();
    logger.info("memory only");
    logger.flush();

    assert_eq!(read_lines(&log_file).len(), 1);
    assert_eq!(memory.len(), 2);
    assert_eq!(logger.sink_names(), vec!["memory".to_string()]);
}

#[test]
fn test_two_file_sinks_of_the_same_kind() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let first = temp_dir.path().join("first.log");
    let second = temp_dir.path().join("second.log");

    let logger = quiet_logger();
    logger.add_sink("file", &file_config(&first, "")).unwrap();
    logger.add_sink("file", &file_config(&second, "")).unwrap();
    logger.error("everywhere");
    logger.flush();

    assert_eq!(read_lines(&first).len(), 1);
    assert_eq!(read_lines(&second).len(), 1);

    // Both are registered under the kind name.
    logger.remove_sink("file").unwrap();
    assert!(logger.sink_names().is_empty());
}

#[test]
fn test_reopen_appends_and_counts_existing_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("reopen.log");

    {
        let logger = quiet_logger();
        logger
            .add_sink("file", &file_config(&log_file, r#""maxline":3"#))
            .unwrap();
        logger.info("one");
        logger.info("two");
    }

    let logger = quiet_logger();
    logger
        .add_sink("file", &file_config(&log_file, r#""maxline":3"#))
        .unwrap();
    logger.info("three");
    logger.info("four");
    logger.flush();

    let rotated = temp_dir
        .path()
        .join(format!("reopen.{}.001.log", Local::now().format("%Y-%m-%d")));
    assert_eq!(read_lines(&rotated).len(), 3);
    let active = read_lines(&log_file);
    assert_eq!(active.len(), 1);
    assert!(active[0].ends_with("[I] four"));
}

#[test]
fn test_nested_directory_is_created() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("nested").join("deeper").join("app.log");

    let sink = RotatingFileSink::open(FileConfig::new(log_file.to_str().unwrap()))
        .expect("Failed to open sink in nested directory");
    let logger = quiet_logger();
    logger.attach_sink("file", sink);
    logger.info("nested");
    logger.flush();

    assert_eq!(read_lines(&log_file).len(), 1);
}
