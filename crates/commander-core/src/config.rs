//! Mission configuration, read once at mission start.
//!
//! Environment values fall back to their defaults when missing or
//! malformed. A config file named explicitly must be valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::messages::Locale;

pub const DEFAULT_MAX_PHASES: u32 = 6;
pub const DEFAULT_MAX_PER_PHASE_WEI: u128 = 20_000_000_000_000_000;
pub const DEFAULT_MAX_TOTAL_WEI: u128 = 60_000_000_000_000_000;
pub const DEFAULT_PHASE_TIMEOUT_MS: u64 = 45_000;
pub const DEFAULT_MIN_FEEDBACK_SAMPLES: usize = 3;

pub const ENV_MAX_PHASES: &str = "COMMANDER_MAX_PHASES";
pub const ENV_MAX_PER_PHASE_WEI: &str = "COMMANDER_MAX_PER_PHASE_WEI";
pub const ENV_MAX_TOTAL_WEI: &str = "COMMANDER_MAX_TOTAL_WEI";
pub const ENV_PHASE_TIMEOUT_MS: &str = "COMMANDER_PHASE_TIMEOUT_MS";
pub const ENV_MIN_FEEDBACK: &str = "COMMANDER_MIN_FEEDBACK";
pub const ENV_LOCALE: &str = "COMMANDER_LOCALE";

/// Raw budget ceiling overrides. Resolved (with per-field fallback) when a
/// budget is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverrides {
    #[serde(default)]
    pub max_phases: Option<String>,
    #[serde(default)]
    pub max_per_phase_wei: Option<String>,
    #[serde(default)]
    pub max_total_wei: Option<String>,
}

/// Top-level commander configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommanderConfig {
    #[serde(default)]
    pub budget: BudgetOverrides,
    #[serde(default = "default_timeout")]
    pub phase_timeout_ms: u64,
    #[serde(default = "default_min_feedback")]
    pub min_feedback_samples: usize,
    #[serde(default)]
    pub locale: Locale,
}

fn default_timeout() -> u64 {
    DEFAULT_PHASE_TIMEOUT_MS
}
fn default_min_feedback() -> usize {
    DEFAULT_MIN_FEEDBACK_SAMPLES
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            budget: BudgetOverrides::default(),
            phase_timeout_ms: DEFAULT_PHASE_TIMEOUT_MS,
            min_feedback_samples: DEFAULT_MIN_FEEDBACK_SAMPLES,
            locale: Locale::En,
        }
    }
}

impl CommanderConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let phase_timeout_ms = positive_or(lookup(ENV_PHASE_TIMEOUT_MS), ENV_PHASE_TIMEOUT_MS)
            .unwrap_or(DEFAULT_PHASE_TIMEOUT_MS);
        let min_feedback_samples = positive_or(lookup(ENV_MIN_FEEDBACK), ENV_MIN_FEEDBACK)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MIN_FEEDBACK_SAMPLES);
        let locale = lookup(ENV_LOCALE)
            .map(|code| Locale::from_code(&code))
            .unwrap_or_default();

        Self {
            budget: BudgetOverrides {
                max_phases: lookup(ENV_MAX_PHASES),
                max_per_phase_wei: lookup(ENV_MAX_PER_PHASE_WEI),
                max_total_wei: lookup(ENV_MAX_TOTAL_WEI),
            },
            phase_timeout_ms,
            min_feedback_samples,
            locale,
        }
    }

    /// Load configuration from a JSON file. Absent keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        if config.phase_timeout_ms == 0 {
            return Err(Error::Config("phaseTimeoutMs must be positive".into()));
        }
        if config.min_feedback_samples == 0 {
            return Err(Error::Config("minFeedbackSamples must be positive".into()));
        }
        Ok(config)
    }

    pub fn phase_timeout(&self) -> Duration {
        Duration::from_millis(self.phase_timeout_ms)
    }
}

fn positive_or(raw: Option<String>, key: &str) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
