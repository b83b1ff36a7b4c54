//! Enhancement Logger
//!
//! Appends one line per enhancement (or rejected prompt) to `Config::log_file`
//! when `enable_logging` is set. Failures to write are reported through
//! `tracing` and never reach the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::warn;

use crate::config::Config;
use crate::error::ValidationError;
use crate::model::EnhancementRecord;

/// Characters of the prompt kept in a log line
pub const PROMPT_PREVIEW_CHARS: usize = 50;

/// Global mutex for thread-safe log writing
static LOG_MUTEX: Mutex<()> = Mutex::new(());

/// What happened to a prompt
#[derive(Debug)]
pub enum LogEntry<'a> {
    Enhanced(&'a EnhancementRecord),
    Rejected {
        prompt: &'a str,
        error: &'a ValidationError,
    },
}

/// A formatted line waiting to be appended to the log file
#[derive(Debug, Clone)]
pub struct PendingLine {
    path: PathBuf,
    line: String,
}

impl PendingLine {
    /// Blocking append; failures are only reported through `tracing`
    pub fn write(self) {
        if let Err(e) = write_log(&self.path, &self.line) {
            warn!(
                "Failed to write enhancement log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Stamp and format an entry, or `None` when logging is disabled
pub fn prepare_entry(config: &Config, entry: &LogEntry<'_>) -> Option<PendingLine> {
    if !config.enable_logging {
        return None;
    }

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    Some(PendingLine {
        path: config.log_file.clone(),
        line: format_entry(&timestamp, entry),
    })
}

/// Append an entry to the configured log file, if logging is enabled
pub fn log_entry(config: &Config, entry: &LogEntry<'_>) {
    if let Some(pending) = prepare_entry(config, entry) {
        pending.write();
    }
}

/// Append an entry from async code, keeping the file I/O off the runtime threads
pub async fn log_entry_async(config: &Config, entry: &LogEntry<'_>) {
    let Some(pending) = prepare_entry(config, entry) else {
        return;
    };

    if let Err(e) = tokio::task::spawn_blocking(move || pending.write()).await {
        warn!("Enhancement log task failed: {}", e);
    }
}

/// Format one log line (newline terminated)
pub fn format_entry(timestamp: &str, entry: &LogEntry<'_>) -> String {
    match entry {
        LogEntry::Enhanced(record) => format!(
            "[{}] ENHANCED context={} format={} confidence={:.4} processing_ms={} prompt=\"{}\"\n",
            timestamp,
            record.enhanced_prompt.context,
            record.enhanced_prompt.output_format,
            record.metadata.confidence_score,
            record.metadata.processing_time,
            preview(&record.original_prompt, PROMPT_PREVIEW_CHARS)
        ),
        LogEntry::Rejected { prompt, error } => format!(
            "[{}] REJECTED error=\"{}\" prompt=\"{}\"\n",
            timestamp,
            error,
            preview(prompt, PROMPT_PREVIEW_CHARS)
        ),
    }
}

/// Write log content to file (thread-safe), creating the parent directory
fn write_log(path: &Path, content: &str) -> std::io::Result<()> {
    // Acquire lock to prevent interleaved writes from concurrent requests
    let _guard = LOG_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Single-line, char-safe preview of a prompt
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat: String = s
        .trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let flat = flat.replace('"', "'");

    if flat.chars().count() <= max_chars {
        return flat;
    }

    let truncated: String = flat.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
