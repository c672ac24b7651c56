//! Phase execution collaborator boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ServiceInfo, TaskType};

/// What the orchestrator asks a worker to do for one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRequest {
    pub goal: String,
    pub task_type: Option<TaskType>,
    pub mission_id: String,
}

/// Outcome of one quote request against a candidate worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteAttempt {
    pub service_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a successful phase execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub service: ServiceInfo,
    /// Payment amount the worker accepted, as reported by settlement.
    /// Kept raw here; it is validated at the phase boundary.
    pub accepted_amount: Option<String>,
    pub content: String,
    pub receipt_verified: bool,
    #[serde(default)]
    pub attempts: Vec<QuoteAttempt>,
}

/// Executes one phase against some worker. Any error is a phase failure.
#[async_trait]
pub trait PhaseExecutor: Send + Sync {
    async fn execute(&self, request: PhaseRequest) -> Result<ExecutionOutcome>;
}
