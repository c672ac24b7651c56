//! The `hire_agent` tool contract exposed to the planner.

use commander_core::{PhaseResult, TaskType, Wei};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ledger::Budget;

pub const HIRE_TOOL_NAME: &str = "hire_agent";

/// Planner input for one hire.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HireRequest {
    pub goal: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_type: Option<String>,
}

impl HireRequest {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn preferring(mut self, task_type: impl Into<String>) -> Self {
        self.preferred_type = Some(task_type.into());
        self
    }
}

/// Compact view of a successful phase returned to the planner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSummary {
    pub index: usize,
    pub name: String,
    pub task_type: TaskType,
    pub spent_wei: Wei,
    /// Worker output clipped to 300 characters.
    pub summary: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HirePhase {
    Succeeded(PhaseSummary),
    Failed(PhaseResult),
}

/// Tool result. `phase` is absent when the hire was blocked before running.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HireResponse {
    pub ok: bool,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<HirePhase>,
    pub budget: Budget,
}

impl HireResponse {
    pub fn blocked(reason: String, budget: Budget) -> Self {
        Self {
            ok: false,
            blocked: true,
            reason: Some(reason),
            phase: None,
            budget,
        }
    }

    pub fn succeeded(summary: PhaseSummary, reason: Option<String>, budget: Budget) -> Self {
        Self {
            ok: true,
            blocked: reason.is_some(),
            reason,
            phase: Some(HirePhase::Succeeded(summary)),
            budget,
        }
    }

    pub fn failed(result: PhaseResult, reason: Option<String>, budget: Budget) -> Self {
        Self {
            ok: false,
            blocked: reason.is_some(),
            reason,
            phase: Some(HirePhase::Failed(result)),
            budget,
        }
    }

    /// Whether a phase actually ran for this call.
    pub fn ran(&self) -> bool {
        self.phase.is_some()
    }
}

/// JSON schema of the tool, for planners that advertise tools to a model.
pub fn tool_definition() -> serde_json::Value {
    let types: Vec<&str> = TaskType::all().iter().map(|t| t.as_str()).collect();
    json!({
        "name": HIRE_TOOL_NAME,
        "description": "Hire a worker agent to carry out one sub-goal of the mission. \
            Each hire is a paid phase; stop when the result says blocked.",
        "input_schema": {
            "type": "object",
            "properties": {
                "goal": { "type": "string", "minLength": 1, "description": "Sub-goal for the worker" },
                "name": { "type": "string", "description": "Short phase name" },
                "preferredType": { "type": "string", "enum": types }
            },
            "required": ["goal"]
        }
    })
}
