//! Runtime types.

use commander_core::messages::{self, Locale, MessageId};
use commander_core::{ExecutionOutcome, PhaseResult};
use serde::Serialize;

use crate::ledger::{Budget, StopReason};
use crate::state::MissionState;

/// Digest entries kept for the effective goal of the next phase.
const MAX_DIGEST_ENTRIES: usize = 6;

/// What the planner is asked to accomplish.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionBrief {
    pub mission_id: String,
    pub goal: String,
    pub locale: Locale,
}

/// Per-mission mutable state. Never shared across missions.
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub mission_id: String,
    pub locale: Locale,
    pub budget: Budget,
    pub phases: Vec<PhaseResult>,
    /// Clipped notes from prior phases, oldest first.
    pub context: Vec<String>,
    /// Full result of the most recent successful phase.
    pub last_success: Option<ExecutionOutcome>,
    pub stop_reason: Option<StopReason>,
}

impl RuntimeState {
    pub fn new(mission_id: String, locale: Locale, budget: Budget) -> Self {
        Self {
            mission_id,
            locale,
            budget,
            phases: Vec::new(),
            context: Vec::new(),
            last_success: None,
            stop_reason: None,
        }
    }

    /// Sub-goal plus a bounded digest of prior phase outputs.
    pub fn effective_goal(&self, goal: &str) -> String {
        if self.context.is_empty() {
            return goal.to_string();
        }
        let start = self.context.len().saturating_sub(MAX_DIGEST_ENTRIES);
        let heading = messages::template(MessageId::PriorContextHeading, self.locale);
        let mut effective = format!("{goal}\n\n{heading}");
        for note in &self.context[start..] {
            effective.push_str("\n- ");
            effective.push_str(note);
        }
        effective
    }

    pub fn is_interrupted(&self) -> bool {
        self.stop_reason.as_ref().is_some_and(|s| s.is_interruption())
    }
}

/// Final report of a mission that reached `Done`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionReport {
    pub mission_id: String,
    pub status: MissionState,
    /// The planner's closing remarks.
    pub summary: String,
    /// Full result of the most recent successful phase.
    pub result: ExecutionOutcome,
    pub phases: Vec<PhaseResult>,
    pub budget: Budget,
    /// Set when execution stopped early due to cancellation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
