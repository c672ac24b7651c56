//! Service ranker — blends reputation and price into a total order.

use std::cmp::Ordering;

use commander_core::{ServiceInfo, TaskType};
use serde::Serialize;
use tracing::debug;

const REPUTATION_WEIGHT: f64 = 0.7;
const PRICE_WEIGHT: f64 = 0.3;
const MAX_DISPLAY_SCORE: f64 = 5.0;

/// A candidate with its blended score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedService {
    pub service: ServiceInfo,
    pub score: f64,
    pub reputation_score: f64,
    pub price_score: f64,
    /// Reputation is missing or backed by too few samples.
    pub provisional: bool,
}

pub struct ServiceRanker;

impl ServiceRanker {
    /// Candidates offering `task_type`, or every candidate when none do.
    pub fn filter(candidates: &[ServiceInfo], task_type: Option<TaskType>) -> Vec<ServiceInfo> {
        let Some(task_type) = task_type else {
            return candidates.to_vec();
        };
        let matching: Vec<ServiceInfo> = candidates
            .iter()
            .filter(|s| s.task_type == task_type)
            .cloned()
            .collect();
        if matching.is_empty() {
            debug!(
                "No {} services among {} candidates, ranking all",
                task_type,
                candidates.len()
            );
            candidates.to_vec()
        } else {
            matching
        }
    }

    /// Filter by category, then sort by `0.7×reputation + 0.3×price`
    /// descending; ties go to the cheaper service.
    pub fn rank(candidates: &[ServiceInfo], task_type: Option<TaskType>) -> Vec<RankedService> {
        let pool = Self::filter(candidates, task_type);
        let Some(min) = pool.iter().map(|s| s.price).min() else {
            return Vec::new();
        };
        let max = pool.iter().map(|s| s.price).max().unwrap_or(min);
        let spread = max.saturating_sub(min);

        let mut ranked: Vec<RankedService> = pool
            .into_iter()
            .map(|service| {
                let price_score = if spread.is_zero() {
                    1.0
                } else {
                    max.saturating_sub(service.price).as_f64() / spread.as_f64()
                };
                let reputation_score = service
                    .reputation
                    .as_ref()
                    .map(|r| (r.score / MAX_DISPLAY_SCORE).clamp(0.0, 1.0))
                    .unwrap_or(0.0);
                let provisional = service.reputation.as_ref().map_or(true, |r| !r.qualified);
                RankedService {
                    score: REPUTATION_WEIGHT * reputation_score + PRICE_WEIGHT * price_score,
                    reputation_score,
                    price_score,
                    provisional,
                    service,
                }
            })
            .collect();

        ranked.sort_by(rank_order);
        ranked
    }
}

fn rank_order(a: &RankedService, b: &RankedService) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.service.price.cmp(&b.service.price))
}
