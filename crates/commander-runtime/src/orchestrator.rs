//! Commander — runs a mission as a sequence of budgeted, delegated phases.
//!
//! A [`Planner`] drives the mission by calling [`MissionSession::hire`]
//! zero or more times. Every hire is gated by the ledger, raced against the
//! phase deadline and the cancellation signal, and settled into the ledger
//! before the call returns, so phases never overlap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use commander_core::messages::{self, MessageId};
use commander_core::{
    CommanderConfig, Error, ExecutionOutcome, Phase, PhaseExecutor, PhaseRequest, PhaseResult,
    PhaseStatus, Result, TaskType, Wei,
};
use tracing::{debug, info, warn};

use crate::cancel::CancelSignal;
use crate::ledger::{Budget, StopReason};
use crate::race::race_phase;
use crate::state::{MissionEvent, MissionState};
use crate::text::clip;
use crate::tool::{HireRequest, HireResponse, PhaseSummary};
use crate::trace::{TraceEvent, TraceSink, TracingSink};
use crate::types::{MissionBrief, MissionReport, RuntimeState};

const CONTEXT_NOTE_CHARS: usize = 1000;
const SUMMARY_CHARS: usize = 300;
const FALLBACK_PHASE_NAME: &str = "Fallback";
const DIRECT_PHASE_NAME: &str = "Direct";

/// Decides which phases to run. Returns its closing remarks.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, brief: &MissionBrief, session: &mut MissionSession) -> Result<String>;
}

/// Top-level mission runner.
pub struct Commander {
    executor: Arc<dyn PhaseExecutor>,
    planner: Option<Arc<dyn Planner>>,
    config: CommanderConfig,
    sink: Arc<dyn TraceSink>,
}

impl Commander {
    /// Commander without a planner; missions take the direct path.
    pub fn new(executor: Arc<dyn PhaseExecutor>, config: CommanderConfig) -> Self {
        Self {
            executor,
            planner: None,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &CommanderConfig {
        &self.config
    }

    /// Run one mission to completion.
    ///
    /// Fails with `Interrupted` or `AllPhasesFailed` when no phase
    /// succeeded; budget exhaustion alone never fails a mission.
    pub async fn run(&self, goal: &str, cancel: Option<CancelSignal>) -> Result<MissionReport> {
        let mission_id = uuid::Uuid::new_v4().to_string();
        let budget = Budget::build(&self.config.budget);
        self.sink.emit(&TraceEvent::MissionStarted {
            mission_id: mission_id.clone(),
            goal: goal.to_string(),
            budget: budget.clone(),
        });

        let result = self.run_mission(&mission_id, goal, cancel, budget).await;
        match &result {
            Ok(report) => self.sink.emit(&TraceEvent::MissionCompleted {
                mission_id: mission_id.clone(),
                phases: report.phases.len(),
                budget: report.budget.clone(),
            }),
            Err(e) => self.sink.emit(&TraceEvent::MissionFailed {
                mission_id: mission_id.clone(),
                error: e.to_string(),
            }),
        }
        result
    }

    async fn run_mission(
        &self,
        mission_id: &str,
        goal: &str,
        cancel: Option<CancelSignal>,
        budget: Budget,
    ) -> Result<MissionReport> {
        let mission = MissionState::NotStarted;
        if let Some(signal) = cancel.as_ref().filter(|c| c.is_cancelled()) {
            mission.transition(MissionEvent::Aborted)?;
            return Err(Error::Interrupted(cancel_reason(signal, &self.config)));
        }
        let mission = mission.transition(MissionEvent::Started)?;

        let Some(planner) = self.planner.clone() else {
            return self.run_direct(mission_id, goal, cancel, budget, mission).await;
        };

        let mut session = MissionSession {
            executor: Arc::clone(&self.executor),
            sink: Arc::clone(&self.sink),
            cancel: cancel.clone(),
            phase_timeout: self.config.phase_timeout(),
            state: RuntimeState::new(mission_id.to_string(), self.config.locale, budget),
        };
        let brief = MissionBrief {
            mission_id: mission_id.to_string(),
            goal: goal.to_string(),
            locale: self.config.locale,
        };

        let narrative = match planner.plan(&brief, &mut session).await {
            Ok(text) => text,
            Err(e @ Error::InvalidAmount(_)) => return Err(e),
            Err(e) => {
                warn!("Planner for mission {} stopped with error: {}", mission_id, e);
                String::new()
            }
        };

        let cancelled = cancel.as_ref().is_some_and(|c| c.is_cancelled());
        if session.state.phases.is_empty() && !cancelled {
            info!("Planner delegated nothing, running fallback phase for {}", mission_id);
            session.run_fallback(goal).await?;
        }

        let state = session.into_state();
        let interrupted = state.is_interrupted() || cancel.as_ref().is_some_and(|c| c.is_cancelled());

        let Some(result) = state.last_success.clone() else {
            let mission = mission.transition(MissionEvent::Failed { interrupted })?;
            debug!("Mission {} ended in {:?}", mission_id, mission);
            if interrupted {
                let reason = match &state.stop_reason {
                    Some(StopReason::Interrupted { reason }) => reason.clone(),
                    _ => cancel
                        .as_ref()
                        .map(|c| cancel_reason(c, &self.config))
                        .unwrap_or_default(),
                };
                return Err(Error::Interrupted(reason));
            }
            let last_error = state
                .phases
                .iter()
                .rev()
                .find_map(|p| p.error.clone())
                .unwrap_or_default();
            return Err(Error::AllPhasesFailed {
                attempts: state.phases.len(),
                last_error,
            });
        };

        let status = mission.transition(MissionEvent::Completed)?;
        let note = interrupted
            .then(|| messages::template(MessageId::StoppedEarlyNote, state.locale).to_string());
        let mut summary = if narrative.trim().is_empty() {
            clip(&result.content, CONTEXT_NOTE_CHARS)
        } else {
            narrative
        };
        if let Some(note) = &note {
            summary.push_str("\n\n");
            summary.push_str(note);
        }

        Ok(MissionReport {
            mission_id: state.mission_id,
            status,
            summary,
            result,
            phases: state.phases,
            budget: state.budget,
            note,
        })
    }

    /// Single execution with no planner and no ledger involvement.
    async fn run_direct(
        &self,
        mission_id: &str,
        goal: &str,
        cancel: Option<CancelSignal>,
        budget: Budget,
        mission: MissionState,
    ) -> Result<MissionReport> {
        info!("No planner configured, running mission {} directly", mission_id);
        let phase = Phase {
            name: DIRECT_PHASE_NAME.to_string(),
            task_type: TaskType::infer(goal),
            goal: goal.to_string(),
        };
        let request = PhaseRequest {
            goal: goal.to_string(),
            task_type: Some(phase.task_type),
            mission_id: mission_id.to_string(),
        };

        let outcome = race_phase(
            &phase.name,
            self.config.phase_timeout(),
            cancel.as_ref(),
            self.executor.execute(request),
        )
        .await;

        match outcome {
            Ok(result) => Ok(MissionReport {
                mission_id: mission_id.to_string(),
                status: mission.transition(MissionEvent::Completed)?,
                summary: clip(&result.content, CONTEXT_NOTE_CHARS),
                phases: vec![PhaseResult {
                    index: 0,
                    phase,
                    success: true,
                    status: PhaseStatus::Succeeded,
                    content: result.content.clone(),
                    error: None,
                }],
                result,
                budget,
                note: None,
            }),
            Err(Error::Interrupted(reason)) => {
                mission.transition(MissionEvent::Failed { interrupted: true })?;
                Err(Error::Interrupted(reason))
            }
            Err(e) => {
                mission.transition(MissionEvent::Failed { interrupted: false })?;
                Err(Error::AllPhasesFailed {
                    attempts: 1,
                    last_error: e.to_string(),
                })
            }
        }
    }
}

/// The planner's handle on a running mission. Owns the ledger and the
/// phase list for the lifetime of one mission.
pub struct MissionSession {
    executor: Arc<dyn PhaseExecutor>,
    sink: Arc<dyn TraceSink>,
    cancel: Option<CancelSignal>,
    phase_timeout: Duration,
    state: RuntimeState,
}

impl MissionSession {
    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn budget(&self) -> &Budget {
        &self.state.budget
    }

    pub fn phases(&self) -> &[PhaseResult] {
        &self.state.phases
    }

    fn into_state(self) -> RuntimeState {
        self.state
    }

    /// The `hire_agent` tool with JSON in and out.
    pub async fn hire_json(&mut self, input: serde_json::Value) -> Result<serde_json::Value> {
        let request: HireRequest = serde_json::from_value(input)?;
        let response = self.hire(request).await?;
        Ok(serde_json::to_value(response)?)
    }

    /// The `hire_agent` tool: run one phase for `request.goal`, or explain
    /// why no phase may run.
    pub async fn hire(&mut self, request: HireRequest) -> Result<HireResponse> {
        let goal = request.goal.trim();
        if goal.is_empty() {
            return Err(Error::InvalidInput("hire goal must not be empty".into()));
        }
        let locale = self.state.locale;

        if let Some(signal) = self.cancel.as_ref().filter(|c| c.is_cancelled()) {
            let stop = StopReason::Interrupted {
                reason: signal.reason().unwrap_or_else(|| {
                    messages::template(MessageId::CancelledByUser, locale).to_string()
                }),
            };
            let message = stop.message(locale);
            self.state.stop_reason.get_or_insert(stop);
            debug!("Hire blocked by cancellation: {}", message);
            return Ok(HireResponse::blocked(message, self.state.budget.clone()));
        }

        if let Some(block) = self.state.budget.block_reason(self.state.stop_reason.as_ref()) {
            let message = block.message(locale);
            debug!("Hire blocked: {}", message);
            return Ok(HireResponse::blocked(message, self.state.budget.clone()));
        }

        let index = self.state.phases.len();
        let task_type = request
            .preferred_type
            .as_deref()
            .and_then(TaskType::parse_hint)
            .unwrap_or_else(|| TaskType::infer(goal));
        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Phase {}", index + 1));
        let phase = Phase {
            name,
            task_type,
            goal: goal.to_string(),
        };

        self.run_phase(index, phase).await
    }

    /// Single phase for the mission goal exactly as given, when the planner
    /// delegated nothing.
    async fn run_fallback(&mut self, goal: &str) -> Result<HireResponse> {
        if let Some(block) = self.state.budget.block_reason(self.state.stop_reason.as_ref()) {
            let message = block.message(self.state.locale);
            debug!("Fallback blocked: {}", message);
            return Ok(HireResponse::blocked(message, self.state.budget.clone()));
        }
        let phase = Phase {
            name: FALLBACK_PHASE_NAME.to_string(),
            task_type: TaskType::infer(goal),
            goal: goal.to_string(),
        };
        self.run_phase(self.state.phases.len(), phase).await
    }

    async fn run_phase(&mut self, index: usize, phase: Phase) -> Result<HireResponse> {
        self.sink.emit(&TraceEvent::PhaseStarted {
            mission_id: self.state.mission_id.clone(),
            index,
            name: phase.name.clone(),
            budget: self.state.budget.clone(),
        });

        let request = PhaseRequest {
            goal: self.state.effective_goal(&phase.goal),
            task_type: Some(phase.task_type),
            mission_id: self.state.mission_id.clone(),
        };
        let outcome = race_phase(
            &phase.name,
            self.phase_timeout,
            self.cancel.as_ref(),
            self.executor.execute(request),
        )
        .await
        .and_then(|outcome| {
            let spent = realized_spend(&outcome)?;
            Ok((outcome, spent))
        });

        let response = match outcome {
            Ok((outcome, spent)) => self.settle_success(index, phase, outcome, spent)?,
            Err(err) => self.settle_failure(index, phase, err)?,
        };

        let last = self.state.phases.last();
        self.sink.emit(&TraceEvent::PhaseCompleted {
            mission_id: self.state.mission_id.clone(),
            index,
            name: last.map(|p| p.phase.name.clone()).unwrap_or_default(),
            success: response.ok,
            error: last.and_then(|p| p.error.clone()),
            budget: self.state.budget.clone(),
        });
        Ok(response)
    }

    fn settle_success(
        &mut self,
        index: usize,
        phase: Phase,
        outcome: ExecutionOutcome,
        spent: Wei,
    ) -> Result<HireResponse> {
        let locale = self.state.locale;
        self.state.context.push(format!(
            "[{}] {}",
            phase.name,
            clip(&outcome.content, CONTEXT_NOTE_CHARS)
        ));
        let summary = PhaseSummary {
            index,
            name: phase.name.clone(),
            task_type: phase.task_type,
            spent_wei: spent,
            summary: clip(&outcome.content, SUMMARY_CHARS),
            success: true,
        };
        self.state.phases.push(PhaseResult {
            index,
            phase,
            success: true,
            status: PhaseStatus::Succeeded,
            content: outcome.content.clone(),
            error: None,
        });

        let settled = self
            .state
            .budget
            .apply_spend(spent, self.state.stop_reason.clone())?;
        self.state.budget = settled.budget;
        self.state.stop_reason = settled.stop_reason;
        self.state.last_success = Some(outcome);

        let reason = self
            .state
            .budget
            .block_reason(self.state.stop_reason.as_ref())
            .map(|b| b.message(locale));
        Ok(HireResponse::succeeded(
            summary,
            reason,
            self.state.budget.clone(),
        ))
    }

    fn settle_failure(&mut self, index: usize, phase: Phase, err: Error) -> Result<HireResponse> {
        let locale = self.state.locale;
        let status = match &err {
            Error::PhaseTimeout { .. } => PhaseStatus::TimedOut,
            Error::Interrupted(_) => PhaseStatus::Interrupted,
            _ => PhaseStatus::Failed,
        };
        let error_text = err.to_string();
        self.state.context.push(format!(
            "[{}] {}",
            phase.name,
            messages::render(
                MessageId::PhaseFailedNote,
                locale,
                &[("error", clip(&error_text, CONTEXT_NOTE_CHARS).as_str())],
            )
        ));
        let result = PhaseResult {
            index,
            phase,
            success: false,
            status,
            content: String::new(),
            error: Some(error_text),
        };
        self.state.phases.push(result.clone());

        let prior = match err {
            Error::Interrupted(reason) => self
                .state
                .stop_reason
                .clone()
                .or(Some(StopReason::Interrupted { reason })),
            _ => self.state.stop_reason.clone(),
        };
        let settled = self.state.budget.apply_spend(Wei::ZERO, prior)?;
        self.state.budget = settled.budget;
        self.state.stop_reason = settled.stop_reason;

        let reason = self
            .state
            .budget
            .block_reason(self.state.stop_reason.as_ref())
            .map(|b| b.message(locale));
        Ok(HireResponse::failed(result, reason, self.state.budget.clone()))
    }
}

/// Spend reported by settlement; a malformed amount fails the phase.
fn realized_spend(outcome: &ExecutionOutcome) -> Result<Wei> {
    match outcome.accepted_amount.as_deref() {
        None => Ok(Wei::ZERO),
        Some(raw) => Wei::parse(raw)
            .map_err(|e| Error::Worker(format!("malformed payment amount from {}: {e}", outcome.service.id))),
    }
}

fn cancel_reason(signal: &CancelSignal, config: &CommanderConfig) -> String {
    signal
        .reason()
        .unwrap_or_else(|| messages::template(MessageId::CancelledByUser, config.locale).to_string())
}
