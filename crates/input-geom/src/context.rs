//! Build context collecting diagnostics and stage timings
//!
//! The scene reports every failure here with the failing stage as the entry
//! category. Entries are mirrored to the `log` facade so host applications
//! see them through their own logger as well.

use std::collections::HashMap;
use std::time::Duration;
use web_time::Instant;

const LOG_TARGET: &str = "input_geom";

/// Log level for context messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug level messages
    Debug = 0,
    /// Informational messages
    Info = 1,
    /// Warning messages
    Warning = 2,
    /// Error messages
    Error = 3,
}

impl LogLevel {
    fn as_log_level(self) -> log::Level {
        match self {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Timed stages of scene loading
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerCategory {
    /// Whole load call
    Total,
    /// Mesh source parsing
    LoadMesh,
    /// Chunky triangle index construction
    SpatialIndex,
    /// Segment queries against the mesh
    Raycast,
    /// Custom user-defined timer
    Custom(String),
}

/// Log entry containing message and metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: Instant,
    pub message: String,
    /// Stage that produced the entry, if any
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TimerEntry {
    pub category: TimerCategory,
    /// Accumulated duration over all completed runs
    pub duration: Duration,
    /// Number of completed runs
    pub count: usize,
}

/// Diagnostic sink passed into scene operations
#[derive(Debug)]
pub struct BuildContext {
    logs: Vec<LogEntry>,
    active_timers: HashMap<TimerCategory, Instant>,
    timers: HashMap<TimerCategory, TimerEntry>,
    min_log_level: LogLevel,
    enable_timing: bool,
    max_log_entries: usize,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    /// Creates a new context recording `Info` and above, with timing enabled
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            active_timers: HashMap::new(),
            timers: HashMap::new(),
            min_log_level: LogLevel::Info,
            enable_timing: true,
            max_log_entries: 1000,
        }
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.min_log_level = level;
    }

    pub fn set_timing_enabled(&mut self, enabled: bool) {
        self.enable_timing = enabled;
    }

    /// Sets the maximum number of log entries to keep (oldest are dropped)
    pub fn set_max_log_entries(&mut self, max_entries: usize) {
        self.max_log_entries = max_entries;
        self.trim_logs();
    }

    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message, None);
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn log_info_with_category(&mut self, message: impl Into<String>, category: impl Into<String>) {
        self.log(LogLevel::Info, message, Some(category.into()));
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message, None);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None);
    }

    /// Logs an error message tagged with the stage that failed
    pub fn log_error_with_category(&mut self, message: impl Into<String>, category: impl Into<String>) {
        self.log(LogLevel::Error, message, Some(category.into()));
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>, category: Option<String>) {
        if level < self.min_log_level {
            return;
        }

        let message = message.into();
        match &category {
            Some(category) => {
                log::log!(target: LOG_TARGET, level.as_log_level(), "[{}] {}", category, message)
            }
            None => log::log!(target: LOG_TARGET, level.as_log_level(), "{}", message),
        }

        self.logs.push(LogEntry {
            level,
            timestamp: Instant::now(),
            message,
            category,
        });
        self.trim_logs();
    }

    fn trim_logs(&mut self) {
        if self.logs.len() > self.max_log_entries {
            let excess = self.logs.len() - self.max_log_entries;
            self.logs.drain(..excess);
        }
    }

    pub fn start_timer(&mut self, category: TimerCategory) {
        if self.enable_timing {
            self.active_timers.insert(category, Instant::now());
        }
    }

    /// Stops a timer and adds the elapsed time to its entry
    pub fn stop_timer(&mut self, category: TimerCategory) {
        if !self.enable_timing {
            return;
        }

        if let Some(start_time) = self.active_timers.remove(&category) {
            let elapsed = start_time.elapsed();
            let entry = self.timers.entry(category.clone()).or_insert(TimerEntry {
                category,
                duration: Duration::ZERO,
                count: 0,
            });
            entry.duration += elapsed;
            entry.count += 1;
        }
    }

    /// Total duration recorded for a stopped timer
    pub fn get_timer_duration(&self, category: &TimerCategory) -> Option<Duration> {
        self.timers.get(category).map(|entry| entry.duration)
    }

    /// How many times a timer was stopped
    pub fn get_timer_count(&self, category: &TimerCategory) -> usize {
        self.timers.get(category).map(|entry| entry.count).unwrap_or(0)
    }

    pub fn get_logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn get_logs_by_level(&self, level: LogLevel) -> Vec<&LogEntry> {
        self.logs.iter().filter(|entry| entry.level == level).collect()
    }

    pub fn get_logs_by_category(&self, category: &str) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|entry| entry.category.as_deref() == Some(category))
            .collect()
    }

    /// Returns true if any error entry was recorded
    pub fn has_errors(&self) -> bool {
        self.logs.iter().any(|entry| entry.level == LogLevel::Error)
    }

    /// Clears logs and timers
    pub fn reset(&mut self) {
        self.logs.clear();
        self.active_timers.clear();
        self.timers.clear();
    }

    /// Prints all log entries
    pub fn print_logs(&self) {
        for entry in &self.logs {
            let category_str = entry
                .category
                .as_ref()
                .map(|c| format!("[{}] ", c))
                .unwrap_or_default();

            println!("{} {}{}", entry.level.label(), category_str, entry.message);
        }
    }

    /// Prints the accumulated stage timings, slowest first
    pub fn print_timer_summary(&self) {
        let mut sorted_timers: Vec<_> = self.timers.values().collect();
        sorted_timers.sort_by(|a, b| b.duration.cmp(&a.duration));

        for entry in sorted_timers {
            println!(
                "{:20} {:8.2}ms ({} calls)",
                format!("{:?}", entry.category),
                entry.duration.as_secs_f64() * 1000.0,
                entry.count
            );
        }
    }
}
