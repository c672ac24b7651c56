//! Subcommands. Each returns the text to print.

use std::path::Path;

use anyhow::{bail, Context};
use commander_core::{CommanderConfig, ServiceInfo, TaskType};
use commander_market::{FeedbackLog, ReputationEngine, ServiceRanker};
use commander_runtime::Budget;
use serde_json::json;
use tracing::info;

/// Effective budget and limits after environment overrides.
pub fn budget(config: &CommanderConfig) -> anyhow::Result<String> {
    let budget = Budget::build(&config.budget);
    let out = json!({
        "budget": budget,
        "remainingWei": budget.remaining_wei(),
        "phaseTimeoutMs": config.phase_timeout_ms,
        "minFeedbackSamples": config.min_feedback_samples,
        "locale": config.locale,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn reputation(
    feedback_path: &Path,
    service_id: &str,
    min_samples: usize,
    now: i64,
) -> anyhow::Result<String> {
    let log = FeedbackLog::load(feedback_path)?;
    let engine = ReputationEngine::new(min_samples);
    let out = match engine.for_service(&log, service_id, now) {
        Some(rep) => json!({ "serviceId": service_id, "reputation": rep }),
        None => json!({ "serviceId": service_id, "reputation": null }),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn rank(
    services_path: &Path,
    feedback_path: &Path,
    task_type: Option<&str>,
    min_samples: usize,
    now: i64,
) -> anyhow::Result<String> {
    let task_type = match task_type {
        Some(raw) => match TaskType::parse_hint(raw) {
            Some(t) => Some(t),
            None => bail!("Unknown task type: {}", raw),
        },
        None => None,
    };

    let raw = std::fs::read_to_string(services_path)
        .with_context(|| format!("Failed to read {}", services_path.display()))?;
    let mut services: Vec<ServiceInfo> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid services file {}", services_path.display()))?;

    let log = FeedbackLog::load(feedback_path)?;
    let engine = ReputationEngine::new(min_samples);
    for service in &mut services {
        service.reputation = engine.for_service(&log, &service.id, now);
    }

    let ranked = ServiceRanker::rank(&services, task_type);
    info!("Ranked {} of {} services", ranked.len(), services.len());
    Ok(serde_json::to_string_pretty(&ranked)?)
}

pub fn record(
    feedback_path: &Path,
    service_id: &str,
    score: &str,
    now: i64,
) -> anyhow::Result<String> {
    let score: u8 = score
        .trim()
        .parse()
        .with_context(|| format!("Score must be an integer 0-100, got {:?}", score))?;
    let mut log = FeedbackLog::load(feedback_path)?;
    log.record(service_id, score, now)?;
    log.save(feedback_path)?;
    Ok(format!(
        "Recorded {} for {} ({} entries)",
        score,
        service_id,
        log.len()
    ))
}
