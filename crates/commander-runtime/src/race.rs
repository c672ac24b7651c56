//! Timeout / interrupt race for one phase.
//!
//! The phase operation, a deadline timer and the cancellation listener are
//! polled by a single `select!`. The first to resolve decides the outcome;
//! the other two are dropped with the `select!`, which disarms the timer and
//! detaches the listener on every exit path. A losing operation is dropped,
//! not awaited, so its result is ignored.

use std::future::Future;
use std::time::Duration;

use commander_core::messages::{self, Locale, MessageId};
use commander_core::{Error, Result};
use tracing::debug;

use crate::cancel::CancelSignal;

/// Run `operation` for phase `phase`, bounded by `deadline` and `cancel`.
///
/// When several sources are ready on the same poll, cancellation wins over
/// the deadline, and the deadline wins over the operation.
pub async fn race_phase<F, T>(
    phase: &str,
    deadline: Duration,
    cancel: Option<&CancelSignal>,
    operation: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let cancelled = async {
        match cancel {
            Some(signal) => signal.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => {
            let reason = cancel
                .and_then(|s| s.reason())
                .unwrap_or_else(|| messages::template(MessageId::CancelledByUser, Locale::En).to_string());
            debug!("Phase {} interrupted: {}", phase, reason);
            Err(Error::Interrupted(reason))
        }
        _ = tokio::time::sleep(deadline) => {
            debug!("Phase {} hit its {:?} deadline", phase, deadline);
            Err(Error::PhaseTimeout {
                phase: phase.to_string(),
                timeout_ms: deadline.as_millis() as u64,
            })
        }
        result = operation => result,
    }
}
