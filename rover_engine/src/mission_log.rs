//! Append-only mission log: one JSON object per finished session.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::mission::{Outcome, SessionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionRecord {
    pub timestamp: String,
    pub operator: String,
    pub level: u32,
    pub levels_completed: u32,
    pub outcome: Outcome,
    pub battery: u32,
}

impl MissionRecord {
    /// Stamp an outcome with the local time (UTC when the offset is unknown).
    pub fn new(operator: &str, result: &SessionOutcome) -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            timestamp: now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string()),
            operator: operator.to_string(),
            level: result.level,
            levels_completed: result.levels_completed,
            outcome: result.outcome,
            battery: result.battery,
        }
    }
}

/// Append `record` as a JSON line to `path`, creating the file if needed.
///
/// # Errors
/// Returns an error if the file cannot be opened or written.
pub fn append_record(path: &Path, record: &MissionRecord) -> Result<()> {
    let line = serde_json::to_string(record).context("serializing mission record")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening mission log {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("writing mission log {}", path.display()))?;
    info!("mission logged to {}", path.display());
    Ok(())
}
