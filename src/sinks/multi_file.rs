//! Multi-file sink that splits records by level

use super::rotating_file::RotatingFileSink;
use crate::core::{parse_config, FileConfig, LogLevel, MultiFileConfig, Result, Sink};
use chrono::{DateTime, Local};

/// Writes each level listed in `separate` to its own rotating file, plus an
/// optional undivided file receiving every level.
///
/// With `filename = "app.log"` and `separate = ["error"]` the error records go
/// to `app.error.log`; the undivided file is `app.log`.
///
/// # Examples
///
/// ```no_run
/// use rust_sink_logger::{FileConfig, MultiFileConfig, MultiFileSink};
///
/// let sink = MultiFileSink::open(
///     MultiFileConfig::new(FileConfig::new("logs/app.log"))
///         .with_separate(["warn", "error"])
///         .with_full(true),
/// )
/// .unwrap();
/// ```
#[derive(Debug)]
pub struct MultiFileSink {
    config: MultiFileConfig,
    /// Level index to position in `buckets`.
    routes: [Option<usize>; LogLevel::COUNT],
    buckets: Vec<RotatingFileSink>,
    full: Option<RotatingFileSink>,
}

impl MultiFileSink {
    /// Create an unconfigured sink that drops every record until
    /// [`Sink::init`] succeeds.
    pub fn new() -> Self {
        Self {
            config: MultiFileConfig::default(),
            routes: [None; LogLevel::COUNT],
            buckets: Vec::new(),
            full: None,
        }
    }

    /// Open one rotating file per configured level, plus the undivided file
    /// when `full` is set.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown, duplicated or empty level list, or when
    /// any of the files cannot be opened.
    pub fn open(config: MultiFileConfig) -> Result<Self> {
        let levels = config.levels()?;
        let (stem, ext) = config.file.split_filename();

        let mut routes = [None; LogLevel::COUNT];
        let mut buckets = Vec::with_capacity(levels.len());
        for level in levels {
            let filename = format!("{}.{}{}", stem, level.name(), ext);
            buckets.push(RotatingFileSink::open(FileConfig {
                filename,
                ..config.file.clone()
            })?);
            routes[level.index()] = Some(buckets.len() - 1);
        }

        let full = if config.full {
            Some(RotatingFileSink::open(FileConfig {
                filename: format!("{}{}", stem, ext),
                ..config.file.clone()
            })?)
        } else {
            None
        };

        Ok(Self {
            config,
            routes,
            buckets,
            full,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MultiFileConfig {
        &self.config
    }

    /// The sink owning `level`, if that level has its own file.
    pub fn bucket(&self, level: LogLevel) -> Option<&RotatingFileSink> {
        self.routes[level.index()].and_then(|i| self.buckets.get(i))
    }

    pub fn full(&self) -> Option<&RotatingFileSink> {
        self.full.as_ref()
    }

    fn owned(&self) -> impl Iterator<Item = &RotatingFileSink> {
        self.full.iter().chain(self.buckets.iter())
    }
}

impl Default for MultiFileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MultiFileSink {
    fn init(&mut self, config: &str) -> Result<()> {
        let config: MultiFileConfig = parse_config("multifile", config)?;
        let opened = Self::open(config)?;
        self.close();
        *self = opened;
        Ok(())
    }

    fn write(&self, timestamp: &DateTime<Local>, text: &str, level: LogLevel) -> Result<()> {
        let full = self
            .full
            .as_ref()
            .map_or(Ok(()), |sink| sink.write(timestamp, text, level));
        let bucket = self
            .bucket(level)
            .map_or(Ok(()), |sink| sink.write(timestamp, text, level));
        full.and(bucket)
    }

    fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for sink in self.owned() {
            if let Err(e) = sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn close(&self) {
        for sink in self.owned() {
            sink.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoggerError;
    use std::fs::{self, File};
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn init(dir: &Path, extra: &str) -> Result<MultiFileSink> {
        let mut sink = MultiFileSink::new();
        sink.init(&format!(
            r#"{{"filename":"{}",{}}}"#,
            dir.join("test.log").display(),
            extra
        ))?;
        Ok(sink)
    }

    #[test]
    fn test_split_without_full() {
        let dir = tempdir().unwrap();
        let sink = init(dir.path(), r#""separate":["debug","info"]"#).unwrap();
        let now = Local::now();

        sink.write(&now, "[D] debug line", LogLevel::Debug).unwrap();
        sink.write(&now, "[I] info line", LogLevel::Info).unwrap();
        sink.write(&now, "[E] dropped", LogLevel::Error).unwrap();
        sink.flush().unwrap();

        let debug = lines(&dir.path().join("test.debug.log"));
        let info = lines(&dir.path().join("test.info.log"));
        assert_eq!(debug.len(), 1);
        assert!(debug[0].ends_with("[D] debug line"));
        assert_eq!(info.len(), 1);
        assert!(info[0].ends_with("[I] info line"));
        assert!(!dir.path().join("test.log").exists());
        assert!(sink.bucket(LogLevel::Error).is_none());
    }

    #[test]
    fn test_split_with_full() {
        let dir = tempdir().unwrap();
        let sink = init(dir.path(), r#""separate":["debug"],"full":true"#).unwrap();
        let now = Local::now();

        sink.write(&now, "[D] both", LogLevel::Debug).unwrap();
        sink.write(&now, "[W] full only", LogLevel::Warn).unwrap();

        assert_eq!(lines(&dir.path().join("test.debug.log")).len(), 1);
        let full = lines(&dir.path().join("test.log"));
        assert_eq!(full.len(), 2);
        assert!(full[1].ends_with("[W] full only"));
    }

    #[test]
    fn test_level_list_errors_fail_init() {
        let dir = tempdir().unwrap();

        let err = init(dir.path(), r#""separate":["debug","debug"]"#).unwrap_err();
        assert!(matches!(err, LoggerError::DuplicateLevel(_)));

        let err = init(dir.path(), r#""separate":["trace"]"#).unwrap_err();
        assert!(matches!(err, LoggerError::UnknownLevel(_)));

        let err = init(dir.path(), r#""separate":[]"#).unwrap_err();
        assert!(matches!(err, LoggerError::EmptyLevelSet));

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_instances_route_independently() {
        let dir = tempdir().unwrap();
        let errors = MultiFileSink::open(
            MultiFileConfig::new(FileConfig::new(
                dir.path().join("a.log").to_str().unwrap(),
            ))
            .with_separate(["error"]),
        )
        .unwrap();
        let debug = MultiFileSink::open(
            MultiFileConfig::new(FileConfig::new(
                dir.path().join("b.log").to_str().unwrap(),
            ))
            .with_separate(["debug"]),
        )
        .unwrap();

        let now = Local::now();
        errors.write(&now, "[D] ignored", LogLevel::Debug).unwrap();
        debug.write(&now, "[D] kept", LogLevel::Debug).unwrap();

        assert_eq!(lines(&dir.path().join("a.error.log")).len(), 0);
        assert_eq!(lines(&dir.path().join("b.debug.log")).len(), 1);
    }

    #[test]
    fn test_full_file_purge_spares_idle_buckets() {
        let dir = tempdir().unwrap();
        let sink = MultiFileSink::open(
            MultiFileConfig::new(
                FileConfig::new(dir.path().join("test.log").to_str().unwrap())
                    .with_max_lines(1)
                    .with_daily(false),
            )
            .with_separate(["debug", "fatal"])
            .with_full(true),
        )
        .unwrap();

        let idle = dir.path().join("test.fatal.log");
        let old = SystemTime::now() - Duration::from_secs(40 * 24 * 60 * 60);
        File::options()
            .write(true)
            .open(&idle)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let now = Local::now();
        sink.write(&now, "[D] one", LogLevel::Debug).unwrap();
        sink.write(&now, "[D] two", LogLevel::Debug).unwrap();
        assert!(format!("{:?}", sink).contains("test.fatal.log"));

        // Closing waits for the purges queued by those rotations.
        sink.close();

        assert!(idle.exists());
        let today = Local::now().format("%Y-%m-%d");
        assert!(dir.path().join(format!("test.{}.001.log", today)).exists());
        assert!(dir
            .path()
            .join(format!("test.debug.{}.001.log", today))
            .exists());
    }

    #[test]
    fn test_close_reaches_every_file() {
        let dir = tempdir().unwrap();
        let sink = init(dir.path(), r#""separate":["info","error"],"full":true"#).unwrap();

        sink.close();
        sink.close();

        let err = sink
            .write(&Local::now(), "[I] late", LogLevel::Info)
            .unwrap_err();
        assert!(matches!(err, LoggerError::SinkClosed));
    }
}
