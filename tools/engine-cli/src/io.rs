//! Loading recorded input events and engine settings from disk.

use std::path::Path;

use anyhow::{Context, Result};
use grabme_project_model::event::{parse_events, InputEvent};
use grabme_project_model::timeline::Settings;

/// Read a JSONL event log, skipping blank lines and `#`-prefixed comments.
pub fn load_events(path: &Path) -> Result<Vec<InputEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading event log at {}", path.display()))?;
    let filtered: String = content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    parse_events(&filtered).with_context(|| format!("parsing event log at {}", path.display()))
}

/// Read settings from a JSON file, or fall back to the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading settings at {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing settings at {}", path.display()))
        }
        None => Ok(Settings::default()),
    }
}
