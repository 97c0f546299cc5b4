//! Snapshot export
//!
//! Serializes a filtered event view into a transferable artifact: a pretty
//! JSON document plus a suggested filename embedding the task id and export
//! timestamp. Read-only over its input; the optional disk write uses the
//! temp-file + rename pattern so a crash never leaves a partial artifact.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::AutomationEvent;
use crate::utils::{current_timestamp, format_export_timestamp};

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while producing or writing an artifact
#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Json(e)
    }
}

/// The serialized document inside an export artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub task_id: String,
    /// Unix timestamp of the export
    pub exported_at: i64,
    pub event_count: usize,
    pub events: Vec<AutomationEvent>,
}

/// A ready-to-download artifact: content plus suggested filename
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// `events-{task_id}-{YYYYMMDD-HHMMSS}.json`
    pub filename: String,
    /// Pretty-printed JSON document
    pub content: String,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, returning the file path
    ///
    /// Writes to a `.tmp` sibling, syncs, then renames into place.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> ExportResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(&self.filename);
        let temp_path = path.with_extension("tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(self.content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(path)
    }
}

/// Export a filtered view for `task_id`, stamped with the current time
pub fn export(task_id: &str, events: &[AutomationEvent]) -> ExportResult<ExportArtifact> {
    export_at(task_id, events, current_timestamp())
}

/// Export as of an explicit timestamp (unix seconds)
pub fn export_at(
    task_id: &str,
    events: &[AutomationEvent],
    exported_at: i64,
) -> ExportResult<ExportArtifact> {
    let document = ExportDocument {
        task_id: task_id.to_string(),
        exported_at,
        event_count: events.len(),
        events: events.to_vec(),
    };

    let filename = format!(
        "events-{}-{}.json",
        task_id,
        format_export_timestamp(exported_at)
    );
    let content = serde_json::to_string_pretty(&document)?;

    Ok(ExportArtifact { filename, content })
}
