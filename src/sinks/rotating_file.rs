//! Rotating file sink
//!
//! Appends one line per record to a file and rotates it by line count, byte
//! count, or at local midnight. A rotated file is renamed to
//! `<stem>.<YYYY-MM-DD>[.NNN]<ext>` and a fresh file is opened at the
//! original path. Rotated files older than `maxday` days are purged in the
//! background.

use crate::core::{
    format_timestamp, parse_config, split_filename, validate_time_format, FileConfig, LogLevel,
    LoggerError, Result, Sink,
};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, SystemTime};

/// Slack added to the midnight deadline so the timer never fires early.
const MIDNIGHT_SLACK: Duration = Duration::from_millis(100);

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A file sink with line, size and daily rotation.
///
/// # Examples
///
/// ```no_run
/// use rust_sink_logger::{FileConfig, RotatingFileSink};
///
/// let sink = RotatingFileSink::open(
///     FileConfig::new("logs/app.log")
///         .with_max_lines(10_000)
///         .with_max_days(7),
/// )
/// .unwrap();
/// ```
pub struct RotatingFileSink {
    inner: Arc<Inner>,
    timer: Mutex<Option<DailyTimer>>,
}

struct Inner {
    config: FileConfig,
    stem: String,
    ext: String,
    perm: u32,
    /// Age after which rotated files are purged; `None` disables purging.
    retention: Option<Duration>,
    state: RwLock<FileState>,
    purger: Mutex<Option<PurgeWorker>>,
}

struct FileState {
    file: Option<File>,
    /// Set by `close` only. A sink that lost its file after a failed
    /// rotation is not closed and reopens on the next write.
    closed: bool,
    lines: u64,
    bytes: u64,
    opened_at: DateTime<Local>,
}

impl FileState {
    fn closed() -> Self {
        Self {
            file: None,
            closed: true,
            lines: 0,
            bytes: 0,
            opened_at: Local::now(),
        }
    }

    fn needs_reopen(&self) -> bool {
        !self.closed && self.file.is_none()
    }

    /// Line or size trigger reached. The daily trigger is driven by the timer.
    fn needs_rotation(&self, config: &FileConfig) -> bool {
        self.file.is_some()
            && ((config.maxline > 0 && self.lines >= config.maxline)
                || (config.maxsize > 0 && self.bytes >= config.maxsize))
    }
}

struct DailyTimer {
    cancel: Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl DailyTimer {
    fn cancel(self) {
        drop(self.cancel);
        if self.handle.thread().id() != thread::current().id() {
            let _ = self.handle.join();
        }
    }
}

/// Background thread deleting expired rotated files. Requests arriving while
/// one is already queued are folded into it.
struct PurgeWorker {
    request: Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl PurgeWorker {
    fn start(dir: PathBuf, prefix: String, ext: String, max_age: Duration) -> io::Result<Self> {
        let (request, requests) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("logger-purge".to_string())
            .spawn(move || {
                while requests.recv().is_ok() {
                    purge_expired(&dir, &prefix, &ext, max_age);
                }
            })?;
        Ok(Self { request, handle })
    }

    fn request(&self) {
        // Full means a purge is already queued and will see this rotation.
        let _ = self.request.try_send(());
    }

    /// Run any queued purge, then end the thread.
    fn stop(self) {
        drop(self.request);
        let _ = self.handle.join();
    }
}

impl RotatingFileSink {
    /// Create an unconfigured sink. Call [`Sink::init`] before writing.
    pub fn new() -> Self {
        let config = FileConfig::default();
        let (stem, ext) = split_filename(&config.filename);
        Self {
            inner: Arc::new(Inner {
                retention: retention(config.maxday),
                config,
                stem,
                ext,
                perm: 0o644,
                state: RwLock::new(FileState::closed()),
                purger: Mutex::new(None),
            }),
            timer: Mutex::new(None),
        }
    }

    /// Open (or create) the configured file and start the daily timer.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the file cannot be
    /// opened.
    pub fn open(config: FileConfig) -> Result<Self> {
        let mut sink = Self::new();
        sink.configure(config)?;
        Ok(sink)
    }

    fn configure(&mut self, config: FileConfig) -> Result<()> {
        let perm = config.permission_bits()?;
        validate_time_format("file", &config.timeformat)?;
        let (stem, ext) = config.split_filename();

        let inner = Arc::new(Inner {
            retention: retention(config.maxday),
            config,
            stem,
            ext,
            perm,
            state: RwLock::new(FileState::closed()),
            purger: Mutex::new(None),
        });
        inner.reopen(&mut inner.state.write())?;

        let timer = if inner.config.daily {
            Some(start_daily_timer(&inner)?)
        } else {
            None
        };

        self.close();
        self.inner = inner;
        *self.timer.lock() = timer;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.inner.config.path()
    }

    #[must_use]
    pub fn config(&self) -> &FileConfig {
        &self.inner.config
    }

    /// Lines written to the active file since it was opened or rotated,
    /// including lines already present when it was opened.
    #[must_use]
    pub fn line_count(&self) -> u64 {
        self.inner.state.read().lines
    }

    #[must_use]
    pub fn byte_count(&self) -> u64 {
        self.inner.state.read().bytes
    }

    /// Rotate immediately, naming the rotated file after `when`.
    pub fn rotate_at(&self, when: &DateTime<Local>) -> Result<()> {
        let mut state = self.inner.state.write();
        if state.closed {
            return Err(LoggerError::SinkClosed);
        }
        self.inner.rotate(&mut state, when)
    }
}

impl Default for RotatingFileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn path_display(&self) -> String {
        self.config.filename.clone()
    }

    fn open_file(&self) -> Result<File> {
        let path = self.config.path();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.perm);
        }

        let file = options.open(&path).map_err(|e| {
            LoggerError::file_sink(self.path_display(), format!("Failed to open: {}", e))
        })?;

        // The mode passed to open is masked by the process umask.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&path, fs::Permissions::from_mode(self.perm)) {
                eprintln!(
                    "[LOGGER WARNING] FileSink('{}'): cannot apply perm {:o}: {}",
                    self.config.filename, self.perm, e
                );
            }
        }

        Ok(file)
    }

    /// Open the file at the configured path and seed the counters from it.
    fn reopen(&self, state: &mut FileState) -> Result<()> {
        state.file = None;
        state.closed = false;
        let file = self.open_file()?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_sink(
                self.path_display(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;

        let bytes = metadata.len();
        let lines = if bytes > 0 {
            count_lines(&self.config.path()).map_err(|e| {
                LoggerError::io_operation(
                    "count existing lines",
                    format!("Failed to read '{}'", self.config.filename),
                    e,
                )
            })?
        } else {
            0
        };

        state.file = Some(file);
        state.bytes = bytes;
        state.lines = lines;
        state.opened_at = Local::now();
        Ok(())
    }

    fn write_line(&self, timestamp: &DateTime<Local>, text: &str) -> Result<()> {
        let line = format!(
            "{} {}\n",
            format_timestamp(timestamp, &self.config.timeformat),
            text
        );

        let pending = {
            let state = self.state.read();
            state.needs_reopen() || state.needs_rotation(&self.config)
        };

        let mut state = self.state.write();
        if state.closed {
            return Err(LoggerError::SinkClosed);
        }
        // A failed rotation leaves no file open; retry on every write.
        if state.needs_reopen() {
            self.reopen(&mut state)?;
        }
        // Another writer may have rotated between the two locks.
        let rotation_error = if pending && state.needs_rotation(&self.config) {
            self.rotate(&mut state, timestamp).err()
        } else {
            None
        };

        let Some(file) = state.file.as_mut() else {
            return Err(rotation_error.unwrap_or(LoggerError::SinkClosed));
        };
        if let Some(e) = rotation_error {
            eprintln!("[LOGGER ERROR] FileSink('{}'): {}", self.config.filename, e);
        }

        file.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_sink(
                self.path_display(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        state.lines += 1;
        state.bytes += line.len() as u64;
        Ok(())
    }

    /// Rename the active file to its successor name and reopen the original
    /// path. The sink is reopened even when the rename fails.
    fn rotate(&self, state: &mut FileState, when: &DateTime<Local>) -> Result<()> {
        let path = self.config.path();

        let renamed = if path_exists(&path) {
            let target = self.successor_path(when, &state.opened_at);
            // Close before rename.
            state.file = None;
            fs::rename(&path, &target).map_err(|e| {
                LoggerError::file_rotation(
                    self.path_display(),
                    format!("Failed to rename to '{}': {}", target.display(), e),
                )
            })
        } else {
            Ok(())
        };

        let reopened = self.reopen(state);
        if renamed.is_ok() && reopened.is_ok() {
            self.request_purge();
        }
        renamed.and(reopened)
    }

    /// First unused rotated filename.
    ///
    /// Pure daily rotation names the file after the day it was opened and
    /// only adds a sequence number on collision. With a line or size trigger
    /// the sequence number is always present.
    fn successor_path(&self, when: &DateTime<Local>, opened_at: &DateTime<Local>) -> PathBuf {
        if self.config.has_numeric_trigger() {
            return self.next_sequence_path(&when.format("%Y-%m-%d").to_string());
        }

        let date = opened_at.format("%Y-%m-%d").to_string();
        let plain = PathBuf::from(format!("{}.{}{}", self.stem, date, self.ext));
        if path_exists(&plain) {
            self.next_sequence_path(&date)
        } else {
            plain
        }
    }

    fn next_sequence_path(&self, date: &str) -> PathBuf {
        let mut sequence: u32 = 1;
        loop {
            let candidate = PathBuf::from(format!(
                "{}.{}.{:03}{}",
                self.stem, date, sequence, self.ext
            ));
            if !path_exists(&candidate) {
                return candidate;
            }
            sequence += 1;
        }
    }

    fn rotate_daily(&self, now: &DateTime<Local>) {
        let mut state = self.state.write();
        if state.closed || state.opened_at.date_naive() == now.date_naive() {
            return;
        }
        if let Err(e) = self.rotate(&mut state, now) {
            eprintln!("[LOGGER ERROR] FileSink('{}'): {}", self.config.filename, e);
        }
    }

    /// Queue a purge of expired rotated files, starting the purge thread on
    /// first use.
    fn request_purge(&self) {
        let Some(max_age) = self.retention else {
            return;
        };

        let mut purger = self.purger.lock();
        if purger.is_none() {
            let stem_path = Path::new(&self.stem);
            let dir = stem_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let prefix = stem_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match PurgeWorker::start(dir, prefix, self.ext.clone(), max_age) {
                Ok(worker) => *purger = Some(worker),
                Err(e) => {
                    eprintln!(
                        "[LOGGER WARNING] FileSink('{}'): cannot start purge: {}",
                        self.config.filename, e
                    );
                    return;
                }
            }
        }
        if let Some(worker) = purger.as_ref() {
            worker.request();
        }
    }
}

/// Retention window for `maxday`; zero or negative disables purging.
fn retention(maxday: i64) -> Option<Duration> {
    let days = u64::try_from(maxday).ok().filter(|&days| days > 0)?;
    Some(Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY)))
}

fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn count_lines(path: &Path) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(32 * 1024, File::open(path)?);
    let mut count = 0u64;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        count += buf.iter().filter(|&&b| b == b'\n').count() as u64;
        let len = buf.len();
        reader.consume(len);
    }
    Ok(count)
}

/// Time left until the next local midnight.
fn until_next_midnight(now: &DateTime<Local>) -> Duration {
    let next = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .unwrap_or_else(|| *now + ChronoDuration::days(1));

    (next - *now).to_std().unwrap_or(Duration::ZERO) + MIDNIGHT_SLACK
}

fn start_daily_timer(inner: &Arc<Inner>) -> Result<DailyTimer> {
    let (cancel, cancelled) = bounded::<()>(1);
    let weak: Weak<Inner> = Arc::downgrade(inner);

    let handle = thread::Builder::new()
        .name("logger-daily-rotate".to_string())
        .spawn(move || loop {
            let wait = until_next_midnight(&Local::now());
            match cancelled.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => match weak.upgrade() {
                    Some(inner) => inner.rotate_daily(&Local::now()),
                    None => break,
                },
                // Cancelled, or the sink is gone.
                _ => break,
            }
        })
        .map_err(|e| LoggerError::spawn("logger-daily-rotate", e))?;

    Ok(DailyTimer { cancel, handle })
}

/// Delete rotated files in `dir` (see [`is_rotated_name`]) whose modification
/// time is older than `max_age`. Returns how many were removed.
///
/// Failures on one file are reported and never stop the rest of the purge.
pub(crate) fn purge_expired(dir: &Path, prefix: &str, ext: &str, max_age: Duration) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!(
                "[LOGGER WARNING] Unable to scan '{}' for old logs: {}",
                dir.display(),
                e
            );
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            purge_one(&path, prefix, ext, now, max_age)
        }));

        match outcome {
            Ok(Ok(true)) => removed += 1,
            Ok(Ok(false)) => {}
            Ok(Err(e)) => {
                eprintln!(
                    "[LOGGER WARNING] Unable to delete old log '{}': {}",
                    path.display(),
                    e
                );
            }
            Err(_) => {
                eprintln!(
                    "[LOGGER WARNING] Unable to delete old log '{}': panicked",
                    path.display()
                );
            }
        }
    }
    removed
}

fn purge_one(
    path: &Path,
    prefix: &str,
    ext: &str,
    now: SystemTime,
    max_age: Duration,
) -> io::Result<bool> {
    let rotated = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| is_rotated_name(name, prefix, ext));
    if !rotated {
        return Ok(false);
    }

    let metadata = fs::metadata(path)?;
    if metadata.is_dir() {
        return Ok(false);
    }

    let expired = now
        .duration_since(metadata.modified()?)
        .is_ok_and(|age| age > max_age);
    if !expired {
        return Ok(false);
    }

    fs::remove_file(path)?;
    Ok(true)
}

/// `<prefix>.<YYYY-MM-DD><ext>` or `<prefix>.<YYYY-MM-DD>.<NNN><ext>`.
///
/// Active files of sibling sinks such as `<prefix>.error<ext>` never match.
fn is_rotated_name(name: &str, prefix: &str, ext: &str) -> bool {
    let Some(middle) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.strip_suffix(ext))
    else {
        return false;
    };

    let (date, sequence) = match middle.split_once('.') {
        Some((date, sequence)) => (date, Some(sequence)),
        None => (middle, None),
    };
    let sequence_ok = sequence
        .map_or(true, |seq| seq.len() >= 3 && seq.bytes().all(|b| b.is_ascii_digit()));

    sequence_ok && date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

impl Sink for RotatingFileSink {
    fn init(&mut self, config: &str) -> Result<()> {
        let config: FileConfig = parse_config("file", config)?;
        self.configure(config)
    }

    fn write(&self, timestamp: &DateTime<Local>, text: &str, _level: LogLevel) -> Result<()> {
        self.inner.write_line(timestamp, text)
    }

    fn flush(&self) -> Result<()> {
        let state = self.inner.state.write();
        if let Some(file) = state.file.as_ref() {
            file.sync_all().map_err(|e| {
                LoggerError::file_sink(self.inner.path_display(), format!("Failed to flush: {}", e))
            })?;
        }
        Ok(())
    }

    fn close(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.cancel();
        }
        {
            let mut state = self.inner.state.write();
            state.closed = true;
            if let Some(file) = state.file.take() {
                let _ = file.sync_all();
            }
        }
        let purger = self.inner.purger.lock().take();
        if let Some(purger) = purger {
            purger.stop();
        }
    }
}

impl fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("RotatingFileSink")
            .field("config", &self.inner.config)
            .field("lines", &state.lines)
            .field("bytes", &state.bytes)
            .field("closed", &state.closed)
            .finish()
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        self.close();
    }
}
