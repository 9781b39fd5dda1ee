//! Leveled logging handle.
//!
//! A [`Logger`] is created once by the CLI and passed down by reference to
//! every pipeline stage. Nothing in the crate logs through global state, so
//! tests can capture output with [`Logger::memory`].

use chrono::{Local, NaiveTime};
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn letter(self) -> char {
        match self {
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warn => 'W',
            LogLevel::Error => 'E',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

enum Sink {
    Stderr,
    Memory(Arc<Mutex<Vec<String>>>),
    Silent,
}

pub struct Logger {
    level: LogLevel,
    sink: Sink,
}

impl Logger {
    pub fn stderr(level: LogLevel) -> Self {
        Self {
            level,
            sink: Sink::Stderr,
        }
    }

    /// Captures formatted lines instead of printing them.
    pub fn memory(level: LogLevel) -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let logger = Self {
            level,
            sink: Sink::Memory(Arc::clone(&lines)),
        };
        (logger, lines)
    }

    pub fn silent() -> Self {
        Self {
            level: LogLevel::Error,
            sink: Sink::Silent,
        }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }

        match &self.sink {
            Sink::Stderr => {
                let prefix = format!("{}:", level.letter());
                let prefix = match level {
                    LogLevel::Debug => prefix
                        .if_supports_color(Stream::Stderr, |p| p.bright_black())
                        .to_string(),
                    LogLevel::Info => prefix
                        .if_supports_color(Stream::Stderr, |p| p.bright_blue())
                        .to_string(),
                    LogLevel::Warn => prefix
                        .if_supports_color(Stream::Stderr, |p| p.bright_yellow())
                        .to_string(),
                    LogLevel::Error => prefix
                        .if_supports_color(Stream::Stderr, |p| p.bright_red())
                        .to_string(),
                };
                let stamp = timestamp(Local::now().time());
                let mut err = std::io::stderr().lock();
                writeln!(err, "{stamp} {prefix} {message}").ok();
            }
            Sink::Memory(lines) => {
                lines.lock().push(format!("{}: {}", level.letter(), message));
            }
            Sink::Silent => {}
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }
}

/// `HHMMSS.mmm` in local time.
fn timestamp(time: NaiveTime) -> String {
    time.format("%H%M%S%.3f").to_string()
}
