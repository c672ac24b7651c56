//! Budget ledger — phase count and cumulative spend against ceilings.
//!
//! `spent_wei` and `phase_count` only grow, and only through
//! [`Budget::apply_spend`], which every phase outcome goes through exactly
//! once. Exhaustion is advisory: it blocks the *next* phase, it never undoes
//! the spend that caused it.

use commander_core::config::{
    BudgetOverrides, DEFAULT_MAX_PER_PHASE_WEI, DEFAULT_MAX_PHASES, DEFAULT_MAX_TOTAL_WEI,
};
use commander_core::messages::{self, Locale, MessageId};
use commander_core::{Result, Wei};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ceilings and running totals for one mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    max_phases: u32,
    max_per_phase_wei: Wei,
    max_total_wei: Wei,
    spent_wei: Wei,
    phase_count: u32,
}

/// Latched reason that stops further hiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    Interrupted { reason: String },
    PhaseOverrun { spent: Wei, limit: Wei },
    BudgetExhausted { spent: Wei, max: Wei },
}

impl StopReason {
    pub fn message(&self, locale: Locale) -> String {
        match self {
            StopReason::Interrupted { reason } => {
                messages::render(MessageId::Interrupted, locale, &[("reason", reason.as_str())])
            }
            StopReason::PhaseOverrun { spent, limit } => messages::render(
                MessageId::PhaseOverrun,
                locale,
                &[("spent", spent.to_string().as_str()), ("limit", limit.to_string().as_str())],
            ),
            StopReason::BudgetExhausted { spent, max } => messages::render(
                MessageId::BudgetExhausted,
                locale,
                &[("spent", spent.to_string().as_str()), ("max", max.to_string().as_str())],
            ),
        }
    }

    pub fn is_interruption(&self) -> bool {
        matches!(self, StopReason::Interrupted { .. })
    }
}

/// Why the next phase may not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    Stopped(StopReason),
    PhaseLimit { count: u32, max: u32 },
    BudgetExhausted { spent: Wei, max: Wei },
}

impl BlockReason {
    pub fn message(&self, locale: Locale) -> String {
        match self {
            BlockReason::Stopped(stop) => stop.message(locale),
            BlockReason::PhaseLimit { count, max } => messages::render(
                MessageId::PhaseLimitReached,
                locale,
                &[("count", count.to_string().as_str()), ("max", max.to_string().as_str())],
            ),
            BlockReason::BudgetExhausted { spent, max } => messages::render(
                MessageId::BudgetExhausted,
                locale,
                &[("spent", spent.to_string().as_str()), ("max", max.to_string().as_str())],
            ),
        }
    }
}

/// Result of settling one phase into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendOutcome {
    pub budget: Budget,
    pub stop_reason: Option<StopReason>,
}

impl Budget {
    /// Build a fresh budget from configured ceilings. Malformed or
    /// non-positive overrides are ignored field by field.
    pub fn build(overrides: &BudgetOverrides) -> Self {
        let max_phases = overrides
            .max_phases
            .as_deref()
            .and_then(|raw| match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    warn!("Ignoring invalid max phases {:?}", raw);
                    None
                }
            })
            .unwrap_or(DEFAULT_MAX_PHASES);

        Self {
            max_phases,
            max_per_phase_wei: positive_amount(overrides.max_per_phase_wei.as_deref())
                .unwrap_or(Wei::from_u128(DEFAULT_MAX_PER_PHASE_WEI)),
            max_total_wei: positive_amount(overrides.max_total_wei.as_deref())
                .unwrap_or(Wei::from_u128(DEFAULT_MAX_TOTAL_WEI)),
            spent_wei: Wei::ZERO,
            phase_count: 0,
        }
    }

    /// Fresh budget with explicit ceilings.
    pub fn with_limits(max_phases: u32, max_per_phase_wei: Wei, max_total_wei: Wei) -> Self {
        Self {
            max_phases,
            max_per_phase_wei,
            max_total_wei,
            spent_wei: Wei::ZERO,
            phase_count: 0,
        }
    }

    pub fn max_phases(&self) -> u32 {
        self.max_phases
    }

    pub fn max_per_phase_wei(&self) -> Wei {
        self.max_per_phase_wei
    }

    pub fn max_total_wei(&self) -> Wei {
        self.max_total_wei
    }

    pub fn spent_wei(&self) -> Wei {
        self.spent_wei
    }

    pub fn phase_count(&self) -> u32 {
        self.phase_count
    }

    pub fn remaining_wei(&self) -> Wei {
        self.max_total_wei.saturating_sub(self.spent_wei)
    }

    /// First reason, in priority order, that the next phase may not run:
    /// a latched stop reason, the phase limit, then total exhaustion.
    pub fn block_reason(&self, stop_reason: Option<&StopReason>) -> Option<BlockReason> {
        if let Some(stop) = stop_reason {
            return Some(BlockReason::Stopped(stop.clone()));
        }
        if self.phase_count >= self.max_phases {
            return Some(BlockReason::PhaseLimit {
                count: self.phase_count,
                max: self.max_phases,
            });
        }
        if self.spent_wei >= self.max_total_wei {
            return Some(BlockReason::BudgetExhausted {
                spent: self.spent_wei,
                max: self.max_total_wei,
            });
        }
        None
    }

    /// Settle one phase attempt: count it and add its spend, whatever the
    /// ceilings say. A prior stop reason is carried through unchanged;
    /// otherwise a per-phase overrun or total exhaustion is reported.
    pub fn apply_spend(&self, phase_spent: Wei, prior: Option<StopReason>) -> Result<SpendOutcome> {
        let budget = Budget {
            spent_wei: self.spent_wei.checked_add(phase_spent)?,
            phase_count: self.phase_count.saturating_add(1),
            ..self.clone()
        };

        let stop_reason = match prior {
            Some(stop) => Some(stop),
            None if phase_spent > budget.max_per_phase_wei => Some(StopReason::PhaseOverrun {
                spent: phase_spent,
                limit: budget.max_per_phase_wei,
            }),
            None if budget.spent_wei >= budget.max_total_wei => Some(StopReason::BudgetExhausted {
                spent: budget.spent_wei,
                max: budget.max_total_wei,
            }),
            None => None,
        };

        debug!(
            "Ledger: phase {} settled, spent {} (+{}) of {}",
            budget.phase_count, budget.spent_wei, phase_spent, budget.max_total_wei
        );

        Ok(SpendOutcome {
            budget,
            stop_reason,
        })
    }

    /// [`Budget::apply_spend`] for a decimal amount string. A malformed
    /// amount fails with `InvalidAmount` and leaves nothing applied.
    pub fn apply_spend_str(&self, phase_spent: &str, prior: Option<StopReason>) -> Result<SpendOutcome> {
        self.apply_spend(Wei::parse(phase_spent)?, prior)
    }
}

fn positive_amount(raw: Option<&str>) -> Option<Wei> {
    let raw = raw?;
    match Wei::parse(raw.trim()) {
        Ok(amount) if !amount.is_zero() => Some(amount),
        _ => {
            warn!("Ignoring invalid budget amount {:?}", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commander_core::Error;

    fn wei(n: u128) -> Wei {
        Wei::from_u128(n)
    }

    fn overrides(phases: Option<&str>, per: Option<&str>, total: Option<&str>) -> BudgetOverrides {
        BudgetOverrides {
            max_phases: phases.map(String::from),
            max_per_phase_wei: per.map(String::from),
            max_total_wei: total.map(String::from),
        }
    }

    #[test]
    fn test_build_defaults() {
        let budget = Budget::build(&BudgetOverrides::default());
        assert_eq!(budget.max_phases(), 6);
        assert_eq!(budget.max_per_phase_wei().to_string(), "20000000000000000");
        assert_eq!(budget.max_total_wei().to_string(), "60000000000000000");
        assert_eq!(budget.spent_wei(), Wei::ZERO);
        assert_eq!(budget.phase_count(), 0);
    }

    #[test]
    fn test_build_ignores_bad_overrides_per_field() {
        let budget = Budget::build(&overrides(Some("0"), Some("12abc"), Some("500")));
        assert_eq!(budget.max_phases(), 6);
        assert_eq!(budget.max_per_phase_wei(), wei(DEFAULT_MAX_PER_PHASE_WEI));
        assert_eq!(budget.max_total_wei(), wei(500));

        let budget = Budget::build(&overrides(Some("-2"), Some("0"), Some("")));
        assert_eq!(budget.max_phases(), 6);
        assert_eq!(budget.max_per_phase_wei(), wei(DEFAULT_MAX_PER_PHASE_WEI));
        assert_eq!(budget.max_total_wei(), wei(DEFAULT_MAX_TOTAL_WEI));

        let budget = Budget::build(&overrides(Some(" 3 "), None, None));
        assert_eq!(budget.max_phases(), 3);
    }

    #[test]
    fn test_apply_spend_always_counts_and_adds() {
        let budget = Budget::with_limits(6, wei(50), wei(100));
        for (spend, prior) in [
            (wei(0), None),
            (wei(80), None),
            (wei(500), None),
            (wei(10), Some(StopReason::Interrupted { reason: "x".into() })),
        ] {
            let out = budget.apply_spend(spend, prior).unwrap();
            assert_eq!(out.budget.phase_count(), budget.phase_count() + 1);
            assert_eq!(out.budget.spent_wei(), budget.spent_wei().checked_add(spend).unwrap());
            assert_eq!(out.budget.max_total_wei(), budget.max_total_wei());
        }
    }

    #[test]
    fn test_total_exhaustion_scenario() {
        let budget = Budget::with_limits(6, wei(100), wei(10));
        let out = budget.apply_spend_str("12", None).unwrap();
        assert_eq!(out.budget.spent_wei().to_string(), "12");
        assert_eq!(out.budget.phase_count(), 1);
        assert!(matches!(out.stop_reason, Some(StopReason::BudgetExhausted { .. })));

        let block = out.budget.block_reason(None).unwrap();
        assert!(matches!(block, BlockReason::BudgetExhausted { .. }));
        assert!(block.message(Locale::En).contains("budget exhausted"));
    }

    #[test]
    fn test_per_phase_overrun_scenario() {
        let budget = Budget::with_limits(6, wei(50), wei(1_000));
        let out = budget.apply_spend(wei(80), None).unwrap();
        let stop = out.stop_reason.unwrap();
        assert_eq!(
            stop,
            StopReason::PhaseOverrun {
                spent: wei(80),
                limit: wei(50)
            }
        );
        assert!(stop.message(Locale::En).contains("per-phase limit"));
        // the overspend is recorded, not prevented
        assert_eq!(out.budget.spent_wei(), wei(80));
    }

    #[test]
    fn test_overrun_reported_before_exhaustion() {
        let budget = Budget::with_limits(6, wei(50), wei(60));
        let out = budget.apply_spend(wei(70), None).unwrap();
        assert!(matches!(out.stop_reason, Some(StopReason::PhaseOverrun { .. })));
    }

    #[test]
    fn test_prior_stop_reason_propagates() {
        let budget = Budget::with_limits(6, wei(50), wei(60));
        let prior = StopReason::Interrupted {
            reason: "user left".into(),
        };
        let out = budget.apply_spend(wei(70), Some(prior.clone())).unwrap();
        assert_eq!(out.stop_reason, Some(prior));
    }

    #[test]
    fn test_within_limits_has_no_stop_reason() {
        let budget = Budget::with_limits(6, wei(50), wei(100));
        let out = budget.apply_spend(wei(50), None).unwrap();
        assert!(out.stop_reason.is_none());
        assert!(out.budget.block_reason(None).is_none());
        assert_eq!(out.budget.remaining_wei(), wei(50));
    }

    #[test]
    fn test_malformed_amount_is_fatal() {
        let budget = Budget::with_limits(6, wei(50), wei(100));
        let err = budget.apply_spend_str("12.5", None).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_block_reason_priority() {
        let exhausted_and_full = Budget::with_limits(2, wei(100), wei(10))
            .apply_spend(wei(5), None)
            .unwrap()
            .budget
            .apply_spend(wei(5), None)
            .unwrap()
            .budget;
        assert!(matches!(
            exhausted_and_full.block_reason(None),
            Some(BlockReason::PhaseLimit { count: 2, max: 2 })
        ));

        let stop = StopReason::Interrupted {
            reason: "cancelled".into(),
        };
        assert_eq!(
            exhausted_and_full.block_reason(Some(&stop)),
            Some(BlockReason::Stopped(stop))
        );
    }

    #[test]
    fn test_fresh_budget_not_blocked() {
        assert!(Budget::build(&BudgetOverrides::default()).block_reason(None).is_none());
    }

    #[test]
    fn test_serializes_amounts_as_strings() {
        let budget = Budget::with_limits(6, wei(50), wei(100));
        let json = serde_json::to_value(&budget).unwrap();
        assert_eq!(json["maxPerPhaseWei"], "50");
        assert_eq!(json["spentWei"], "0");
        assert_eq!(json["phaseCount"], 0);
    }
}
