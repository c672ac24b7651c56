//! Append-only feedback log.

use std::path::Path;

use commander_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One rating of a worker, on the 0–100 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub service_id: String,
    pub score: u8,
    /// Unix seconds.
    pub timestamp: i64,
}

/// Feedback for all workers, in append order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackLog {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a log from a JSON array. A missing file is an empty log; an
    /// unreadable or malformed one is an error, so it is never overwritten.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("FeedbackLog: {} not found, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let entries: Vec<FeedbackEntry> = serde_json::from_str(&raw)?;
        if let Some(bad) = entries.iter().find(|e| e.score > 100) {
            return Err(Error::InvalidInput(format!(
                "feedback for {} in {} has score {} outside 0..=100",
                bad.service_id,
                path.display(),
                bad.score
            )));
        }
        info!("FeedbackLog: {} entries loaded", entries.len());
        Ok(Self { entries })
    }

    /// Save the log to disk as a JSON array.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Append a rating.
    pub fn record(&mut self, service_id: &str, score: u8, timestamp: i64) -> Result<()> {
        if score > 100 {
            return Err(Error::InvalidInput(format!(
                "feedback score {score} is outside 0..=100"
            )));
        }
        self.entries.push(FeedbackEntry {
            service_id: service_id.to_string(),
            score,
            timestamp,
        });
        Ok(())
    }

    /// Entries for one worker, ordered by timestamp (append order on ties).
    pub fn for_service(&self, service_id: &str) -> Vec<FeedbackEntry> {
        let mut entries: Vec<FeedbackEntry> = self
            .entries
            .iter()
            .filter(|e| e.service_id == service_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
