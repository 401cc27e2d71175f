//! Centralized logging for the emulator cores.
//!
//! Video cores run once per emulated instruction, so logging must cost
//! nothing when it is off and must not flood the terminal when it is on.
//!
//! # Architecture
//!
//! - **LogLevel**: Off < Error < Warn < Info < Debug < Trace
//! - **LogCategory**: PPU mode machine, LCD register traffic, interrupts, frontend
//! - **LogConfig**: process-wide levels stored in atomics, one per category
//!   plus a global fallback
//! - **log()**: lazily formats the message, rate-limits per category and
//!   writes to stderr or a background file writer
//!
//! # Usage
//!
//! ```rust
//! use emu_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Ppu, LogLevel::Trace, || {
//!     format!("PPU: LY={} entering HBlank", 42)
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse a level name or digit (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Subsystem a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// PPU mode transitions, scanline rendering, frame completion
    Ppu,
    /// LCD register reads/writes from the CPU side
    Lcd,
    /// Interrupt requests (VBlank, LCD STAT)
    Interrupts,
    /// Drivers and frontends
    Frontend,
}

impl LogCategory {
    pub const ALL: [LogCategory; CATEGORY_COUNT] = [
        LogCategory::Ppu,
        LogCategory::Lcd,
        LogCategory::Interrupts,
        LogCategory::Frontend,
    ];

    fn index(self) -> usize {
        match self {
            LogCategory::Ppu => 0,
            LogCategory::Lcd => 1,
            LogCategory::Interrupts => 2,
            LogCategory::Frontend => 3,
        }
    }
}

const CATEGORY_COUNT: usize = 4;

/// Per-category bookkeeping for the sliding-window limiter
#[derive(Default)]
struct Window {
    stamps: VecDeque<Instant>,
    dropped: usize,
}

/// Sliding one-second window limiting messages per category.
///
/// When messages are dropped, the next allowed message carries the number
/// of drops so the caller can report it.
struct RateLimiter {
    max_per_second: AtomicUsize,
    span: Duration,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(max_per_second: usize) -> Self {
        Self {
            max_per_second: AtomicUsize::new(max_per_second),
            span: Duration::from_secs(1),
            windows: Mutex::new(Default::default()),
        }
    }

    fn set_max(&self, max: usize) {
        self.max_per_second.store(max, Ordering::Relaxed);
    }

    fn max(&self) -> usize {
        self.max_per_second.load(Ordering::Relaxed)
    }

    /// Returns (allowed, dropped-since-last-allowed)
    fn admit(&self, category: LogCategory) -> (bool, Option<usize>) {
        let now = Instant::now();
        let Ok(mut windows) = self.windows.lock() else {
            // A panicked writer poisoned the lock; keep logging unthrottled
            return (true, None);
        };
        let window = &mut windows[category.index()];

        while let Some(&front) = window.stamps.front() {
            if now.duration_since(front) > self.span {
                window.stamps.pop_front();
            } else {
                break;
            }
        }

        if window.stamps.len() < self.max() {
            window.stamps.push_back(now);
            let dropped = std::mem::take(&mut window.dropped);
            (true, (dropped > 0).then_some(dropped))
        } else {
            window.dropped += 1;
            (false, None)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Fallback for categories left at Off
    global_level: AtomicU8,
    /// Per-category overrides
    levels: [AtomicU8; CATEGORY_COUNT],
    /// Background file writer, when a log file is set
    sink: Mutex<Option<Sender<String>>>,
    file_logging: AtomicBool,
    limiter: RateLimiter,
}

impl LogConfig {
    /// All logging off, 60 messages per second per category
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: Default::default(),
            sink: Mutex::new(None),
            file_logging: AtomicBool::new(false),
            limiter: RateLimiter::new(60),
        }
    }

    /// Process-wide instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category level other than Off wins; otherwise the global level applies.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Turn everything off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.limiter.set_max(max_logs_per_second);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.limiter.max()
    }

    /// Append log output to `path` from a background thread.
    ///
    /// Replaces any previous log file. Fails if the file cannot be opened.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        if let Ok(mut sink) = self.sink.lock() {
            *sink = Some(sender);
        }
        self.file_logging.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn write_message(&self, message: String) {
        if self.file_logging.load(Ordering::Relaxed) {
            if let Ok(sink) = self.sink.lock() {
                if let Some(sender) = sink.as_ref() {
                    if let Err(unsent) = sender.send(message) {
                        eprintln!("{}", unsent.0);
                    }
                    return;
                }
            }
        }
        eprintln!("{}", message);
    }
}

/// Log a lazily formatted message.
///
/// `message_fn` only runs when the category/level is enabled and the rate
/// limiter admits the message. When messages were dropped since the last
/// admitted one, a one-line summary is written first.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let (allowed, dropped) = config.limiter.admit(category);
    if let Some(count) = dropped {
        config.write_message(format!(
            "[{:?}] rate limit exceeded, {} message(s) dropped",
            category, count
        ));
    }
    if allowed {
        config.write_message(message_fn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::from_str("ERR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("3"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("TRACE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("loud"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Ppu, LogLevel::Trace);

        assert!(config.should_log(LogCategory::Ppu, LogLevel::Trace));
        assert!(!config.should_log(LogCategory::Interrupts, LogLevel::Warn));
        assert!(config.should_log(LogCategory::Interrupts, LogLevel::Error));
    }

    #[test]
    fn test_off_messages_never_log() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        assert!(!config.should_log(LogCategory::Ppu, LogLevel::Off));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Lcd, LogLevel::Debug);
        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        for category in LogCategory::ALL {
            assert_eq!(config.get_level(category), LogLevel::Off);
        }
    }

    #[test]
    fn test_rate_limiter_per_category() {
        let limiter = RateLimiter::new(5);
        for _ in 0..5 {
            assert!(limiter.admit(LogCategory::Ppu).0);
        }
        assert!(!limiter.admit(LogCategory::Ppu).0);

        // Other categories have their own window
        assert!(limiter.admit(LogCategory::Interrupts).0);
    }

    #[test]
    fn test_rate_limiter_reports_drops_after_window() {
        let limiter = RateLimiter::new(2);
        limiter.admit(LogCategory::Ppu);
        limiter.admit(LogCategory::Ppu);
        for _ in 0..7 {
            assert!(!limiter.admit(LogCategory::Ppu).0);
        }

        std::thread::sleep(Duration::from_millis(1100));

        let (allowed, dropped) = limiter.admit(LogCategory::Ppu);
        assert!(allowed);
        assert_eq!(dropped, Some(7));

        // Drop count is reported once
        let (_, dropped) = limiter.admit(LogCategory::Ppu);
        assert_eq!(dropped, None);
    }

    #[test]
    fn test_rate_limit_setting() {
        let config = LogConfig::new();
        assert_eq!(config.get_rate_limit(), 60);
        config.set_rate_limit(500);
        assert_eq!(config.get_rate_limit(), 500);
    }
}
