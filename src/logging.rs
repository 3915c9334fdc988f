// Logging for toaststore
// A `log::Log` backend writing text or JSON lines to stderr, a file, or both.
//
// Console and file output carry independent levels. Text lines look like
// `2026-10-19 09:15:02 [DEBUG] toaststore::notifications::store: Dispatched ADD`;
// JSON lines carry timestamp, level, target and message.
//
// ```
// let config = LogConfig {
//     console_level: LevelFilter::Info,
//     file_level: Some(LevelFilter::Debug),
//     format: LogFormat::Json,
//     destination: LogDestination::Both(PathBuf::from("toaststore.log")),
// };
// init_logger(config)?;
// log::info!("Store ready");
// ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{Level, LevelFilter};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Log destination options
#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

impl LogDestination {
    fn file_path(&self) -> Option<&Path> {
        match self {
            LogDestination::Console => None,
            LogDestination::File(path) | LogDestination::Both(path) => Some(path),
        }
    }

    fn includes_console(&self) -> bool {
        !matches!(self, LogDestination::File(_))
    }
}

/// JSON log line
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        match self.file_level {
            Some(file_level) if file_level > self.console_level => file_level,
            _ => self.console_level,
        }
    }
}

/// Logger backend
pub struct ToastLogger {
    config: LogConfig,
    file: Option<Mutex<File>>,
}

impl ToastLogger {
    /// Create a logger, opening the log file up front when one is configured
    pub fn new(config: LogConfig) -> Result<Self> {
        let file = match config.destination.file_path() {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?;
                Some(Mutex::new(file))
            }
            None => None,
        };
        Ok(Self { config, file })
    }

    fn format_timestamp(now: DateTime<Local>) -> String {
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_line(&self, level: Level, target: &str, message: &str) -> String {
        let timestamp = Self::format_timestamp(Local::now());
        match self.config.format {
            LogFormat::Text => format_text(&timestamp, level, target, message),
            LogFormat::Json => {
                let entry = JsonLogEntry {
                    timestamp: timestamp.clone(),
                    level: level.to_string().to_uppercase(),
                    target: target.to_string(),
                    message: message.to_string(),
                };
                serde_json::to_string(&entry)
                    .unwrap_or_else(|_| format_text(&timestamp, level, target, message))
            }
        }
    }

    fn should_log_to_console(&self, level: Level) -> bool {
        self.config.destination.includes_console() && level <= self.config.console_level
    }

    fn should_log_to_file(&self, level: Level) -> bool {
        self.file.is_some() && self.config.file_level.map_or(false, |file_level| level <= file_level)
    }

    fn write_to_file(&self, line: &str) -> io::Result<()> {
        match &self.file {
            Some(file) => writeln!(file.lock(), "{}", line),
            None => Ok(()),
        }
    }
}

fn format_text(timestamp: &str, level: Level, target: &str, message: &str) -> String {
    format!("{} [{}] {}: {}", timestamp, level.to_string().to_uppercase(), target, message)
}

impl log::Log for ToastLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log_to_console(metadata.level()) || self.should_log_to_file(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        let level = record.level();
        let to_console = self.should_log_to_console(level);
        let to_file = self.should_log_to_file(level);
        if !to_console && !to_file {
            return;
        }

        let line = self.format_line(level, record.target(), &record.args().to_string());

        if to_file {
            if let Err(e) = self.write_to_file(&line) {
                eprintln!("File logging error: {}", e);
                if !to_console {
                    eprintln!("{}", line);
                }
            }
        }
        if to_console {
            let _ = writeln!(io::stderr(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Install the logger as the global `log` backend
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();
    let logger = ToastLogger::new(config)?;

    log::set_boxed_logger(Box::new(logger)).context("Failed to set global logger")?;
    log::set_max_level(max_level);

    Ok(())
}

/// Convert string to LevelFilter
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )),
    }
}
