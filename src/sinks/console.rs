//! Console sink implementation

use crate::core::{
    format_timestamp, parse_config, validate_time_format, ConsoleConfig, LogLevel, Result, Sink,
};
use chrono::{DateTime, Local};
use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Writes one line per record to stdout, optionally colored by level.
pub struct ConsoleSink {
    config: ConsoleConfig,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_config(ConsoleConfig::default())
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self::with_config(ConsoleConfig {
            color: use_colors,
            ..ConsoleConfig::default()
        })
    }

    pub fn with_config(config: ConsoleConfig) -> Self {
        Self {
            config,
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Redirect output to another writer
    ///
    /// # Example
    ///
    /// ```
    /// use rust_sink_logger::ConsoleSink;
    ///
    /// let sink = ConsoleSink::with_colors(false).with_writer(std::io::stderr());
    /// ```
    #[must_use]
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Mutex::new(Box::new(writer));
        self
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    fn format_line(&self, timestamp: &DateTime<Local>, text: &str, level: LogLevel) -> String {
        let text = if self.config.color {
            text.color(level.color_code()).bold().to_string()
        } else {
            text.to_string()
        };
        format!("{} {}", format_timestamp(timestamp, &self.config.timeformat), text)
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn init(&mut self, config: &str) -> Result<()> {
        let mut config: ConsoleConfig = parse_config("console", config)?;
        validate_time_format("console", &config.timeformat)?;
        if cfg!(windows) {
            config.color = false;
        }
        self.config = config;
        Ok(())
    }

    fn write(&self, timestamp: &DateTime<Local>, text: &str, level: LogLevel) -> Result<()> {
        let line = self.format_line(timestamp, text, level);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn close(&self) {
        let _ = self.writer.lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    #[test]
    fn test_plain_line() {
        let buffer = SharedBuffer::default();
        let mut sink = ConsoleSink::new().with_writer(buffer.clone());
        sink.init(r#"{"color":false,"timeformat":"%Y"}"#).unwrap();

        let now = Local::now();
        sink.write(&now, "[W] low disk", LogLevel::Warn).unwrap();
        sink.flush().unwrap();

        assert_eq!(buffer.contents(), format!("{} [W] low disk\n", now.format("%Y")));
    }

    #[test]
    fn test_colored_line_keeps_text() {
        let buffer = SharedBuffer::default();
        let sink = ConsoleSink::with_colors(true).with_writer(buffer.clone());

        sink.write(&Local::now(), "[E] failed", LogLevel::Error).unwrap();

        let out = buffer.contents();
        assert!(out.contains("[E] failed"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_malformed_config() {
        let mut sink = ConsoleSink::new();
        assert!(sink.init(r#"{"color":"#).is_err());
        assert!(sink.init(r#"{"timeformat":"%Y-%"}"#).is_err());
    }
}
