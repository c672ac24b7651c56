//! Ranked executor — runs a phase on the best worker that will quote.

use std::sync::Arc;

use async_trait::async_trait;
use commander_core::{
    Error, ExecutionOutcome, PhaseExecutor, PhaseRequest, QuoteAttempt, Result, ServiceInfo, Wei,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::feedback::FeedbackLog;
use crate::ranker::ServiceRanker;
use crate::reputation::ReputationEngine;

/// Price a worker offers for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub quote_id: String,
    pub service_id: String,
    pub amount: Wei,
}

/// What a worker returns after a paid request settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub content: String,
    pub accepted_amount: Option<String>,
    pub receipt_verified: bool,
}

/// Read-only snapshot of discoverable workers.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn services(&self) -> Result<Vec<ServiceInfo>>;
}

/// Talks to one worker: quote, then pay and execute.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    async fn quote(&self, service: &ServiceInfo, request: &PhaseRequest) -> Result<Quote>;

    async fn execute(
        &self,
        service: &ServiceInfo,
        quote: &Quote,
        request: &PhaseRequest,
    ) -> Result<WorkerResponse>;
}

/// [`PhaseExecutor`] that ranks discovered workers and falls through the
/// ranking until one accepts a quote.
pub struct RankedExecutor {
    directory: Arc<dyn ServiceDirectory>,
    client: Arc<dyn WorkerClient>,
    feedback: Arc<RwLock<FeedbackLog>>,
    engine: ReputationEngine,
}

impl RankedExecutor {
    pub fn new(
        directory: Arc<dyn ServiceDirectory>,
        client: Arc<dyn WorkerClient>,
        feedback: Arc<RwLock<FeedbackLog>>,
        engine: ReputationEngine,
    ) -> Self {
        Self {
            directory,
            client,
            feedback,
            engine,
        }
    }

    /// Discovered services with reputations attached from the feedback log.
    async fn candidates(&self) -> Result<Vec<ServiceInfo>> {
        let mut services = self.directory.services().await?;
        let now = chrono::Utc::now().timestamp();
        let log = self.feedback.read();
        for service in &mut services {
            service.reputation = self.engine.for_service(&log, &service.id, now);
        }
        Ok(services)
    }
}

#[async_trait]
impl PhaseExecutor for RankedExecutor {
    async fn execute(&self, request: PhaseRequest) -> Result<ExecutionOutcome> {
        let candidates = self.candidates().await?;
        let ranked = ServiceRanker::rank(&candidates, request.task_type);
        if ranked.is_empty() {
            return Err(Error::NoCandidates(format!(
                "no worker services discovered for mission {}",
                request.mission_id
            )));
        }

        let mut attempts = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let service = candidate.service;
            debug!(
                "Requesting quote from {} (score {:.3}{})",
                service.id,
                candidate.score,
                if candidate.provisional { ", provisional" } else { "" }
            );
            let quote = match self.client.quote(&service, &request).await {
                Ok(q) => q,
                Err(e) => {
                    warn!("Quote from {} failed: {}", service.id, e);
                    attempts.push(QuoteAttempt {
                        service_id: service.id.clone(),
                        ok: false,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };
            attempts.push(QuoteAttempt {
                service_id: service.id.clone(),
                ok: true,
                error: None,
            });

            info!("Hiring {} at {} wei", service.id, quote.amount);
            let response = self.client.execute(&service, &quote, &request).await?;
            return Ok(ExecutionOutcome {
                service,
                accepted_amount: response.accepted_amount,
                content: response.content,
                receipt_verified: response.receipt_verified,
                attempts,
            });
        }

        Err(Error::NoCandidates(format!(
            "all {} candidate(s) refused to quote",
            attempts.len()
        )))
    }
}
