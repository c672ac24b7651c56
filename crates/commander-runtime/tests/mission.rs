//! End-to-end missions against the ranked marketplace executor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use commander_core::{
    BudgetOverrides, CommanderConfig, Error, PhaseRequest, Result, ServiceInfo, TaskType, Wei,
};
use commander_market::{
    FeedbackLog, Quote, RankedExecutor, ReputationEngine, ServiceDirectory, WorkerClient,
    WorkerResponse,
};
use commander_runtime::tool::tool_definition;
use commander_runtime::{
    CancelSignal, Commander, MissionBrief, MissionSession, MissionState, Planner, RecordingSink,
    TraceEvent,
};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};

struct StaticDirectory(Vec<ServiceInfo>);

#[async_trait]
impl ServiceDirectory for StaticDirectory {
    async fn services(&self) -> Result<Vec<ServiceInfo>> {
        Ok(self.0.clone())
    }
}

/// Quotes each service at its list price unless it is in `refusing`.
#[derive(Default)]
struct MarketClient {
    refusing: Vec<&'static str>,
    hang: bool,
    hired: Mutex<Vec<String>>,
}

#[async_trait]
impl WorkerClient for MarketClient {
    async fn quote(&self, service: &ServiceInfo, _request: &PhaseRequest) -> Result<Quote> {
        if self.refusing.iter().any(|id| *id == service.id) {
            return Err(Error::Worker(format!("{} is busy", service.id)));
        }
        Ok(Quote {
            quote_id: format!("q-{}", service.id),
            service_id: service.id.clone(),
            amount: service.price,
        })
    }

    async fn execute(
        &self,
        service: &ServiceInfo,
        quote: &Quote,
        request: &PhaseRequest,
    ) -> Result<WorkerResponse> {
        self.hired.lock().push(service.id.clone());
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(WorkerResponse {
            content: format!("{} handled: {}", service.id, request.goal.lines().next().unwrap_or("")),
            accepted_amount: Some(quote.amount.to_string()),
            receipt_verified: true,
        })
    }
}

/// Drives the tool through its JSON surface, like a model would.
struct JsonPlanner {
    calls: Vec<Value>,
    results: Mutex<Vec<Value>>,
}

impl JsonPlanner {
    fn new(calls: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            calls,
            results: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Planner for JsonPlanner {
    async fn plan(&self, brief: &MissionBrief, session: &mut MissionSession) -> Result<String> {
        assert_eq!(tool_definition()["name"], "hire_agent");
        for call in &self.calls {
            let result = session.hire_json(call.clone()).await?;
            let blocked = result["blocked"] == true;
            self.results.lock().push(result);
            if blocked {
                break;
            }
        }
        Ok(format!("Finished: {}", brief.goal))
    }
}

fn service(id: &str, price: u128) -> ServiceInfo {
    ServiceInfo {
        id: id.into(),
        name: id.into(),
        endpoint: format!("https://{id}.example"),
        price: Wei::from_u128(price),
        task_type: TaskType::Research,
        reputation: None,
    }
}

fn feedback() -> Arc<RwLock<FeedbackLog>> {
    let now = chrono::Utc::now().timestamp();
    let mut log = FeedbackLog::new();
    for i in 0..4 {
        log.record("trusted", 95, now - i * 60).unwrap();
        log.record("cheap", 20, now - i * 60).unwrap();
    }
    Arc::new(RwLock::new(log))
}

fn commander(client: Arc<MarketClient>, total: &str) -> Commander {
    let executor = RankedExecutor::new(
        Arc::new(StaticDirectory(vec![service("cheap", 5), service("trusted", 9)])),
        client,
        feedback(),
        ReputationEngine::new(3),
    );
    let config = CommanderConfig {
        budget: BudgetOverrides {
            max_phases: Some("4".into()),
            max_per_phase_wei: Some("10".into()),
            max_total_wei: Some(total.into()),
        },
        ..CommanderConfig::default()
    };
    Commander::new(Arc::new(executor), config)
}

#[tokio::test]
async fn test_mission_hires_best_worker_until_budget_exhausted() {
    let client = Arc::new(MarketClient::default());
    let planner = JsonPlanner::new(vec![
        json!({"goal": "Research competitor pricing", "name": "Scout"}),
        json!({"goal": "Research supplier lead times", "preferredType": "research"}),
        json!({"goal": "Research anything else"}),
    ]);
    let sink = Arc::new(RecordingSink::new());
    let commander = commander(client.clone(), "12")
        .with_planner(planner.clone())
        .with_trace_sink(sink.clone());

    let report = commander.run("Market scan", None).await.unwrap();

    assert_eq!(report.status, MissionState::Done);
    assert_eq!(*client.hired.lock(), vec!["trusted", "trusted"]);
    assert_eq!(report.budget.spent_wei(), Wei::from_u128(18));
    assert_eq!(report.budget.phase_count(), 2);
    assert_eq!(report.result.service.id, "trusted");
    assert_eq!(report.summary, "Finished: Market scan");

    let results = planner.results.lock();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["ok"], true);
    assert_eq!(results[0]["blocked"], false);
    assert_eq!(results[0]["phase"]["spentWei"], "9");
    assert_eq!(results[1]["blocked"], true);
    assert!(results[1]["reason"]
        .as_str()
        .unwrap()
        .contains("budget exhausted"));

    let completed = sink
        .events()
        .iter()
        .filter(|e| matches!(e, TraceEvent::PhaseCompleted { success: true, .. }))
        .count();
    assert_eq!(completed, 2);
}

#[tokio::test]
async fn test_refused_quote_falls_through_ranking() {
    let client = Arc::new(MarketClient {
        refusing: vec!["trusted"],
        ..MarketClient::default()
    });
    let planner = JsonPlanner::new(vec![json!({"goal": "Research one thing"})]);
    let commander = commander(client.clone(), "100").with_planner(planner);

    let report = commander.run("Single lookup", None).await.unwrap();
    assert_eq!(report.result.service.id, "cheap");
    assert_eq!(report.result.attempts.len(), 2);
    assert!(!report.result.attempts[0].ok);
    assert_eq!(report.budget.spent_wei(), Wei::from_u128(5));
}

#[tokio::test]
async fn test_no_worker_quotes_fails_mission() {
    let client = Arc::new(MarketClient {
        refusing: vec!["trusted", "cheap"],
        ..MarketClient::default()
    });
    let commander = commander(client, "100").with_planner(JsonPlanner::new(Vec::new()));

    let err = commander.run("Research the impossible", None).await.unwrap_err();
    match err {
        Error::AllPhasesFailed {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 1);
            assert!(last_error.contains("refused to quote"));
        }
        other => panic!("expected AllPhasesFailed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_worker_runs() {
    let client = Arc::new(MarketClient {
        hang: true,
        ..MarketClient::default()
    });
    let signal = CancelSignal::new();
    let trigger = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.cancel("operator abort");
    });
    let planner = JsonPlanner::new(vec![
        json!({"goal": "Research slowly"}),
        json!({"goal": "never runs"}),
    ]);
    let commander = commander(client.clone(), "100").with_planner(planner.clone());

    let err = commander.run("Slow mission", Some(signal)).await.unwrap_err();
    assert!(matches!(err, Error::Interrupted(ref r) if r == "operator abort"));
    assert_eq!(client.hired.lock().len(), 1);

    let results = planner.results.lock();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["blocked"], true);
    assert_eq!(results[0]["phase"]["status"], "interrupted");
    assert_eq!(results[0]["budget"]["phaseCount"], 1);
}
