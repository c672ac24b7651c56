//! Cooperative cancellation signal carrying a reason.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Clonable cancellation handle. The first `cancel` wins; its reason is
/// what every listener sees.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<Mutex<Option<String>>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self, reason: impl Into<String>) {
        {
            let mut slot = self.reason.lock();
            if slot.is_none() {
                *slot = Some(reason.into());
            }
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason given to the first `cancel` call, if cancelled.
    pub fn reason(&self) -> Option<String> {
        if !self.is_cancelled() {
            return None;
        }
        self.reason.lock().clone()
    }

    /// Resolves once the signal fires. Dropping the future detaches it.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_reason_wins() {
        let signal = CancelSignal::new();
        assert!(!signal.is_cancelled());
        assert!(signal.reason().is_none());

        let clone = signal.clone();
        clone.cancel("user pressed stop");
        signal.cancel("second");
        assert!(signal.is_cancelled());
        assert_eq!(signal.reason().as_deref(), Some("user pressed stop"));
    }

    #[tokio::test]
    async fn test_cancelled_resolves() {
        let signal = CancelSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        signal.cancel("stop");
        handle.await.unwrap();
    }
}
