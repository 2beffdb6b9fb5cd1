//! Sink configuration documents
//!
//! Every sink is configured from a flat JSON object. Missing keys fall back to
//! the defaults below, and an empty document is treated as `{}`.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Default strftime layout for the timestamp that starts every line.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extension used when the configured filename has none.
pub const DEFAULT_EXTENSION: &str = ".log";

/// Parse a configuration document for `component`.
pub fn parse_config<T: DeserializeOwned>(component: &str, text: &str) -> Result<T> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    serde_json::from_str(text).map_err(|e| LoggerError::malformed(component, e))
}

/// Reject strftime layouts chrono cannot render.
pub fn validate_time_format(component: &str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(LoggerError::config(
            component,
            format!("invalid timeformat '{}'", format),
        ));
    }
    Ok(())
}

/// Render a timestamp, falling back to the default layout instead of
/// panicking on a layout that slipped past validation.
pub fn format_timestamp(timestamp: &DateTime<Local>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", timestamp.format(DEFAULT_TIME_FORMAT));
    }
    out
}

/// Rotation policy shared by the file and multi-file sinks.
///
/// # Examples
///
/// ```
/// use rust_sink_logger::FileConfig;
///
/// let config = FileConfig::new("logs/app.log")
///     .with_max_lines(10_000)
///     .with_daily(true)
///     .with_max_days(7);
/// assert_eq!(config.maxline, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub filename: String,
    /// Rotate once this many lines were written; 0 disables.
    pub maxline: u64,
    /// Rotate once this many bytes were written; 0 disables.
    pub maxsize: u64,
    /// Rotate at local midnight.
    pub daily: bool,
    /// Purge rotated files older than this many days; <= 0 disables.
    pub maxday: i64,
    /// Octal permission string, re-applied after the file is created.
    pub perm: String,
    pub timeformat: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            filename: "app.log".to_string(),
            maxline: 0,
            maxsize: 0,
            daily: true,
            maxday: 30,
            perm: "0644".to_string(),
            timeformat: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl FileConfig {
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_lines(mut self, lines: u64) -> Self {
        self.maxline = lines;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.maxsize = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_daily(mut self, daily: bool) -> Self {
        self.daily = daily;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_days(mut self, days: i64) -> Self {
        self.maxday = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_perm(mut self, perm: impl Into<String>) -> Self {
        self.perm = perm.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.timeformat = format.into();
        self
    }

    /// Permission bits parsed from the octal `perm` string.
    pub fn permission_bits(&self) -> Result<u32> {
        u32::from_str_radix(self.perm.trim_start_matches("0o"), 8)
            .ok()
            .filter(|bits| *bits <= 0o7777)
            .ok_or_else(|| {
                LoggerError::config("file", format!("invalid octal perm '{}'", self.perm))
            })
    }

    /// Whether a line or size trigger is configured.
    pub fn has_numeric_trigger(&self) -> bool {
        self.maxline > 0 || self.maxsize > 0
    }

    /// Split the filename at its last dot into stem and extension.
    ///
    /// The extension keeps its leading dot and defaults to `.log`. A dot in a
    /// directory component does not count as an extension separator.
    pub fn split_filename(&self) -> (String, String) {
        split_filename(&self.filename)
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.filename)
    }
}

pub fn split_filename(filename: &str) -> (String, String) {
    let name_start = filename
        .rfind(|c: char| c == '/' || c == '\\')
        .map_or(0, |i| i + 1);
    match filename[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            (filename[..split].to_string(), filename[split..].to_string())
        }
        _ => (filename.to_string(), DEFAULT_EXTENSION.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub color: bool,
    pub timeformat: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            color: !cfg!(windows),
            timeformat: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

/// File policy plus the level split for a multi-file sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiFileConfig {
    #[serde(flatten)]
    pub file: FileConfig,
    /// Levels that get a dedicated file.
    pub separate: Vec<String>,
    /// Also write every record to one undivided file.
    pub full: bool,
}

impl MultiFileConfig {
    #[must_use]
    pub fn new(file: FileConfig) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_separate<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separate = levels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    /// Resolve the `separate` list into levels, rejecting unknown names,
    /// duplicates and an empty list.
    pub fn levels(&self) -> Result<Vec<LogLevel>> {
        let mut levels: Vec<LogLevel> = Vec::with_capacity(self.separate.len());
        for name in &self.separate {
            let level = LogLevel::from_name(name)
                .ok_or_else(|| LoggerError::UnknownLevel(name.clone()))?;
            if levels.contains(&level) {
                return Err(LoggerError::DuplicateLevel(name.clone()));
            }
            levels.push(level);
        }

        if levels.is_empty() {
            return Err(LoggerError::EmptyLevelSet);
        }
        Ok(levels)
    }
}
