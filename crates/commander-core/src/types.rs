//! Mission, phase and worker types.

use serde::{Deserialize, Serialize};

use crate::amount::Wei;

/// Category of work a worker service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Research,
    Analysis,
    Writing,
    Code,
    Data,
    Translation,
    General,
}

impl TaskType {
    pub fn all() -> &'static [TaskType] {
        &[
            TaskType::Research,
            TaskType::Analysis,
            TaskType::Writing,
            TaskType::Code,
            TaskType::Data,
            TaskType::Translation,
            TaskType::General,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Research => "research",
            TaskType::Analysis => "analysis",
            TaskType::Writing => "writing",
            TaskType::Code => "code",
            TaskType::Data => "data",
            TaskType::Translation => "translation",
            TaskType::General => "general",
        }
    }

    /// Lenient parse of a planner hint. Unknown hints yield `None`.
    pub fn parse_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();
        Self::all().iter().copied().find(|t| t.as_str() == hint)
    }

    /// Keyword classification of a free-text goal.
    pub fn infer(goal: &str) -> Self {
        let goal = goal.to_lowercase();
        let rules: &[(TaskType, &[&str])] = &[
            (TaskType::Translation, &["translate", "translation", "localize"]),
            (TaskType::Code, &["code", "implement", "function", "script", "debug", "refactor"]),
            (TaskType::Data, &["dataset", "csv", "scrape", "collect data", "table"]),
            (TaskType::Analysis, &["analyze", "analyse", "analysis", "compare", "evaluate", "assess"]),
            (TaskType::Writing, &["write", "draft", "summarize", "summary", "report", "article"]),
            (TaskType::Research, &["research", "find", "search", "investigate", "look up"]),
        ];
        rules
            .iter()
            .find(|(_, words)| words.iter().any(|w| goal.contains(w)))
            .map(|(t, _)| *t)
            .unwrap_or(TaskType::General)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delegated sub-task of a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub task_type: TaskType,
    pub goal: String,
}

/// Lifecycle of a single phase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Executing,
    Succeeded,
    Failed,
    TimedOut,
    Interrupted,
}

impl PhaseStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PhaseStatus::Pending | PhaseStatus::Executing)
    }
}

/// Outcome of one phase attempt, appended in `index` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    pub index: usize,
    pub phase: Phase,
    pub success: bool,
    pub status: PhaseStatus,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Direction of a worker's recent feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

/// Derived reputation of a worker service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reputation {
    /// Decayed average on the 0–5 display scale.
    pub score: f64,
    pub count: usize,
    pub trend: Trend,
    /// Most recent raw scores (0–100), oldest first, at most five.
    pub recent_scores: Vec<u8>,
    /// Unix seconds of the newest feedback entry.
    pub last_used_at: i64,
    pub qualified: bool,
}

/// A worker service as reported by discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub price: Wei,
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<Reputation>,
}
