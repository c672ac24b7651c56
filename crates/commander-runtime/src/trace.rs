//! One-way mission trace events.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::ledger::Budget;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    MissionStarted {
        #[serde(rename = "missionId")]
        mission_id: String,
        goal: String,
        budget: Budget,
    },
    PhaseStarted {
        #[serde(rename = "missionId")]
        mission_id: String,
        index: usize,
        name: String,
        budget: Budget,
    },
    PhaseCompleted {
        #[serde(rename = "missionId")]
        mission_id: String,
        index: usize,
        name: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        budget: Budget,
    },
    MissionCompleted {
        #[serde(rename = "missionId")]
        mission_id: String,
        phases: usize,
        budget: Budget,
    },
    MissionFailed {
        #[serde(rename = "missionId")]
        mission_id: String,
        error: String,
    },
}

/// Receives trace events. Must not block or fail the mission.
pub trait TraceSink: Send + Sync {
    fn emit(&self, event: &TraceEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, event: &TraceEvent) {
        match event {
            TraceEvent::MissionStarted { mission_id, goal, .. } => {
                info!("Mission {} started: {}", mission_id, goal)
            }
            TraceEvent::PhaseStarted {
                mission_id,
                index,
                name,
                budget,
            } => info!(
                "Mission {} phase {} ({}) started, spent {}/{}",
                mission_id,
                index,
                name,
                budget.spent_wei(),
                budget.max_total_wei()
            ),
            TraceEvent::PhaseCompleted {
                mission_id,
                index,
                name,
                success,
                error,
                budget,
            } => {
                if *success {
                    info!(
                        "Mission {} phase {} ({}) succeeded, {} phase(s), spent {}",
                        mission_id,
                        index,
                        name,
                        budget.phase_count(),
                        budget.spent_wei()
                    )
                } else {
                    warn!(
                        "Mission {} phase {} ({}) failed: {}",
                        mission_id,
                        index,
                        name,
                        error.as_deref().unwrap_or("unknown error")
                    )
                }
            }
            TraceEvent::MissionCompleted {
                mission_id,
                phases,
                budget,
            } => info!(
                "Mission {} completed after {} phase(s), spent {}",
                mission_id,
                phases,
                budget.spent_wei()
            ),
            TraceEvent::MissionFailed { mission_id, error } => {
                warn!("Mission {} failed: {}", mission_id, error)
            }
        }
    }
}

/// Keeps events in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }
}

impl TraceSink for RecordingSink {
    fn emit(&self, event: &TraceEvent) {
        self.events.lock().push(event.clone());
    }
}
