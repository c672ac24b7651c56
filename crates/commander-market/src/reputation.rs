//! Reputation engine — decayed score, trend and qualification per worker.

use commander_core::config::DEFAULT_MIN_FEEDBACK_SAMPLES;
use commander_core::{Reputation, Trend};

use crate::feedback::{FeedbackEntry, FeedbackLog};

const SECONDS_PER_DAY: f64 = 86_400.0;
const HALF_LIFE_DAYS: f64 = 14.0;
const RECENT_WINDOW: usize = 5;
const TREND_WINDOW: usize = 3;
const TREND_MIN_ENTRIES: usize = 4;
/// Trend threshold in points on the 0–100 scale.
const TREND_THRESHOLD: f64 = 5.0;

/// Converts feedback history into a [`Reputation`].
#[derive(Debug, Clone)]
pub struct ReputationEngine {
    min_samples: usize,
}

impl Default for ReputationEngine {
    fn default() -> Self {
        Self {
            min_samples: DEFAULT_MIN_FEEDBACK_SAMPLES,
        }
    }
}

impl ReputationEngine {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    /// Reputation of one worker from its log, or `None` without feedback.
    pub fn for_service(&self, log: &FeedbackLog, service_id: &str, now: i64) -> Option<Reputation> {
        self.compute(&log.for_service(service_id), now)
    }

    /// Compute a reputation from time-ordered entries (oldest first).
    pub fn compute(&self, entries: &[FeedbackEntry], now: i64) -> Option<Reputation> {
        if entries.is_empty() {
            return None;
        }

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for entry in entries {
            let age_days = (now - entry.timestamp).max(0) as f64 / SECONDS_PER_DAY;
            let weight = 0.5f64.powf(age_days / HALF_LIFE_DAYS);
            weighted += weight * f64::from(entry.score);
            total_weight += weight;
        }
        let average = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };
        // 0–100 feedback scale → 0–5 display scale
        let score = (average / 20.0 * 100.0).round() / 100.0;

        let scores: Vec<u8> = entries.iter().map(|e| e.score).collect();
        let recent_scores = scores[scores.len().saturating_sub(RECENT_WINDOW)..].to_vec();
        let last_used_at = entries.iter().map(|e| e.timestamp).max().unwrap_or_default();

        Some(Reputation {
            score,
            count: entries.len(),
            trend: trend(&scores),
            recent_scores,
            last_used_at,
            qualified: entries.len() >= self.min_samples,
        })
    }
}

/// Mean of the last three scores against the mean of the (up to) three
/// before them.
fn trend(scores: &[u8]) -> Trend {
    if scores.len() < TREND_MIN_ENTRIES {
        return Trend::Stable;
    }
    let split = scores.len() - TREND_WINDOW;
    let recent = mean(&scores[split..]);
    let prior = mean(&scores[split.saturating_sub(TREND_WINDOW)..split]);
    let delta = recent - prior;
    if delta >= TREND_THRESHOLD {
        Trend::Up
    } else if delta <= -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Stable
    }
}

fn mean(scores: &[u8]) -> f64 {
    scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64
}
