//! JSON rendering and saving of enhancement records

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::model::EnhancementRecord;

/// Directory used when no output path is given
pub const DEFAULT_OUTPUT_DIR: &str = "enhanced_prompts";

/// Pretty JSON with 2-space indentation, the form written back into the chat input
pub fn to_json_pretty(record: &EnhancementRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn to_json_compact(record: &EnhancementRecord) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

/// `enhanced_prompts/enhanced_prompt_YYYYmmdd_HHMMSS.json`
pub fn default_output_path() -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    Path::new(DEFAULT_OUTPUT_DIR).join(format!("enhanced_prompt_{}.json", timestamp))
}

/// Save a record as pretty JSON; returns the path written
pub fn save_record(record: &EnhancementRecord, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_output_path);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
    }

    let content = to_json_pretty(record)?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Enhanced prompt saved to: {}", path.display());
    Ok(path)
}
