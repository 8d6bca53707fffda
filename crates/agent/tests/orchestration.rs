use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use carwise_agent::{Agent, AgentFactory, BuiltinAgentFactory, Orchestrator};
use carwise_core::config::{AppConfig, TraceConfig};
use carwise_core::{
    AgentBuildError, AgentError, InterfaceError, OrchestrationError, Payload, StepParams,
    TraceStore,
};
use serde_json::{json, Map, Value};

const EV_QUERY: &str = "Best EV under ₹15L in Delhi?";

fn agent_names(entries: &[carwise_core::TraceEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.agent.as_str()).collect()
}

struct OfflineRag;

#[async_trait]
impl Agent for OfflineRag {
    fn kind(&self) -> &str {
        "rag"
    }

    fn display_name(&self) -> &str {
        "Rag Agent"
    }

    async fn process(
        &self,
        _payload: Payload,
        _params: &StepParams,
    ) -> Result<Payload, AgentError> {
        Err(AgentError::Integration("vector store unreachable".to_string()))
    }
}

struct OfflineRagFactory(BuiltinAgentFactory);

impl AgentFactory for OfflineRagFactory {
    fn build(&self, kind: &str) -> Result<Arc<dyn Agent>, AgentBuildError> {
        if kind == "rag" {
            return Ok(Arc::new(OfflineRag));
        }
        self.0.build(kind)
    }
}

struct SlowAgent(&'static str);

#[async_trait]
impl Agent for SlowAgent {
    fn kind(&self) -> &str {
        self.0
    }

    fn display_name(&self) -> &str {
        self.0
    }

    async fn process(&self, payload: Payload, _params: &StepParams) -> Result<Payload, AgentError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(payload.with("action", json!(format!("{}_done", self.0))))
    }
}

struct SlowFactory;

impl AgentFactory for SlowFactory {
    fn build(&self, kind: &str) -> Result<Arc<dyn Agent>, AgentBuildError> {
        match kind {
            "owner" => Ok(Arc::new(SlowAgent("owner"))),
            "dealer" => Ok(Arc::new(SlowAgent("dealer"))),
            other => Err(AgentBuildError::Unavailable { kind: other.to_string() }),
        }
    }
}

#[tokio::test]
async fn ev_search_runs_the_full_car_search_chain() {
    let orchestrator = Orchestrator::default();
    let mut context = Map::new();
    context.insert("user_id".to_string(), json!("u-7"));

    let outcome = orchestrator.orchestrate(EV_QUERY, context).await.expect("chain should succeed");

    assert_eq!(
        agent_names(&outcome.agent_trace),
        vec!["Buyer Agent", "Rag Agent", "Valuation Agent", "Loan Agent", "Dealer Agent"]
    );
    let actions = outcome.agent_trace.iter().map(|entry| entry.action.as_str()).collect::<Vec<_>>();
    assert_eq!(
        actions,
        vec![
            "car_search",
            "knowledge_enhancement",
            "price_analysis",
            "financing_analysis",
            "dealer_processing"
        ]
    );
    assert!(outcome
        .agent_trace
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));

    let result = &outcome.result;
    assert!(result.contains_key("cars"));
    assert!(result.contains_key("summary"));
    assert!(result.contains_key("financing_options"));
    assert!(result.contains_key("insights"));
    assert!(result.contains_key("market_summary"));
    assert_eq!(result.get_str("query"), Some(EV_QUERY));
    assert_eq!(result.get_str("user_id"), Some("u-7"));

    let cars = result.get_array("cars").expect("cars should be present");
    let ids = cars.iter().map(|car| car["id"].as_str().unwrap_or_default()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["car_003", "car_001", "car_002"]);
    assert!(cars.iter().all(|car| car.get("market_value").is_some()));
    assert!(cars.iter().all(|car| car.get("expert_review").is_some()));
    assert_eq!(result.get_array("financing_options").map(Vec::len), Some(3));
}

#[tokio::test]
async fn sell_query_runs_the_valuation_chain() {
    let orchestrator = Orchestrator::default();

    let outcome = orchestrator
        .orchestrate("I want to sell my car", Map::new())
        .await
        .expect("chain should succeed");

    assert_eq!(
        agent_names(&outcome.agent_trace),
        vec!["Document Agent", "Valuation Agent", "Seller Agent"]
    );
    assert_eq!(outcome.result.get_str("action"), Some("seller_processing"));
    assert_eq!(
        outcome.result.get("market_summary"),
        Some(&json!({"message": "No cars to analyze"}))
    );
}

#[tokio::test]
async fn failing_second_step_aborts_and_keeps_first_entry() {
    let orchestrator = Orchestrator::new(
        Arc::new(OfflineRagFactory(BuiltinAgentFactory::new())),
        Arc::new(TraceStore::default()),
    );

    let error = orchestrator
        .orchestrate(EV_QUERY, Map::new())
        .await
        .expect_err("offline rag should abort the chain");

    let session_id = error.session_id().clone();
    match &error {
        OrchestrationError::StepFailed { step_index, agent, source, .. } => {
            assert_eq!(*step_index, 1);
            assert_eq!(agent, "rag");
            assert!(matches!(source, AgentError::Integration(_)));
        }
    }

    let trace = orchestrator.trace(&session_id);
    assert_eq!(agent_names(&trace), vec!["Buyer Agent"]);
    assert!(!orchestrator.registry().cached_kinds().contains(&"valuation".to_string()));

    let interface = error.into_interface("req-1");
    assert!(matches!(
        interface,
        InterfaceError::ServiceUnavailable { ref correlation_id, .. } if correlation_id == "req-1"
    ));
}

#[tokio::test]
async fn every_step_preserves_upstream_keys() {
    let orchestrator = Orchestrator::default();
    for (query, steps) in [
        (EV_QUERY, 5),
        ("What is the resale value of my car", 3),
        ("Car needs repair", 2),
        ("Please verify these papers", 1),
        ("hello", 1),
    ] {
        let mut context = Map::new();
        context.insert("channel".to_string(), json!("web"));

        let outcome = orchestrator.orchestrate(query, context).await.expect("chain should succeed");

        assert_eq!(outcome.agent_trace.len(), steps, "unexpected chain length for {query:?}");
        for key in ["query", "context", "channel", "action", "summary"] {
            assert!(outcome.result.contains_key(key), "{key} missing after {query:?}");
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_keep_separate_traces() {
    let orchestrator = Arc::new(Orchestrator::default());
    let queries = ["Best EV under ₹15L in Delhi?", "sell my car", "book a service", "hi"];

    let handles = (0..16)
        .map(|index| {
            let orchestrator = Arc::clone(&orchestrator);
            let query = queries[index % queries.len()];
            tokio::spawn(async move {
                let outcome = orchestrator
                    .orchestrate(query, Map::new())
                    .await
                    .expect("chain should succeed");
                (query, outcome)
            })
        })
        .collect::<Vec<_>>();

    let mut session_ids = HashSet::new();
    for handle in handles {
        let (query, outcome) = handle.await.expect("task should not panic");
        let expected = match query {
            "Best EV under ₹15L in Delhi?" => 5,
            "sell my car" => 3,
            "book a service" => 2,
            _ => 1,
        };
        assert_eq!(outcome.agent_trace.len(), expected);
        assert_eq!(orchestrator.trace(&outcome.session_id), outcome.agent_trace);
        assert!(session_ids.insert(outcome.session_id));
    }
    assert_eq!(session_ids.len(), 16);
    assert_eq!(orchestrator.registry().cached_kinds().len(), 8);
}

#[tokio::test]
async fn trace_capacity_evicts_oldest_session() {
    let config = AppConfig { trace: TraceConfig { max_sessions: 2 }, ..AppConfig::default() };
    let orchestrator = Orchestrator::from_config(&config);

    let first = orchestrator.orchestrate("hi", Map::new()).await.expect("first");
    let second = orchestrator.orchestrate("hi", Map::new()).await.expect("second");
    let third = orchestrator.orchestrate("hi", Map::new()).await.expect("third");

    assert!(orchestrator.trace(&first.session_id).is_empty());
    assert_eq!(orchestrator.trace(&second.session_id).len(), 1);
    assert_eq!(orchestrator.trace(&third.session_id).len(), 1);
}

#[tokio::test]
async fn overlapping_sessions_report_full_traces_when_store_is_smaller() {
    let orchestrator =
        Orchestrator::new(Arc::new(SlowFactory), Arc::new(TraceStore::with_capacity(1)));

    let (first, second) = tokio::join!(
        orchestrator.orchestrate("book a service", Map::new()),
        orchestrator.orchestrate("car needs repair", Map::new()),
    );
    let first = first.expect("first session should succeed");
    let second = second.expect("second session should succeed");

    for outcome in [&first, &second] {
        assert_eq!(agent_names(&outcome.agent_trace), vec!["owner", "dealer"]);
        let actions =
            outcome.agent_trace.iter().map(|entry| entry.action.as_str()).collect::<Vec<_>>();
        assert_eq!(actions, vec!["owner_done", "dealer_done"]);
    }
    assert_ne!(first.session_id, second.session_id);
}

#[tokio::test]
async fn oversized_budget_completes_the_search_chain() {
    let outcome = Orchestrator::default()
        .orchestrate("find a car under ₹999999999999999L", Map::new())
        .await
        .expect("chain should succeed");

    assert_eq!(outcome.agent_trace.len(), 5);
    assert_eq!(outcome.result.get("criteria"), Some(&json!({})));
}

#[tokio::test]
async fn caller_supplied_cars_with_extreme_years_are_appraised() {
    let mut context = Map::new();
    context.insert(
        "cars".to_string(),
        json!([
            {"id": "old", "make": "Kia", "model": "Rio", "price": 100_000, "year": i64::MIN},
            {"id": "new", "make": "Kia", "model": "EV9", "price": 100_000, "year": i64::MAX}
        ]),
    );

    let outcome = Orchestrator::default()
        .orchestrate("I want to sell my car", context)
        .await
        .expect("chain should succeed");

    assert_eq!(outcome.agent_trace.len(), 3);
    let cars = outcome.result.get_array("cars").expect("cars should be present");
    assert_eq!(cars[0]["market_value"], json!(4_000));
    assert_eq!(cars[1]["market_value"], json!(100_000));
}

#[tokio::test]
async fn outcome_serializes_with_rfc3339_timestamps() {
    let outcome = Orchestrator::default().orchestrate("hi", Map::new()).await.expect("chain");

    let value = serde_json::to_value(&outcome).expect("outcome should serialize");
    let session_id = value["session_id"].as_str().unwrap_or_default();
    assert!(session_id.starts_with("session_"));
    let timestamp = value["agent_trace"][0]["timestamp"].as_str().unwrap_or_default();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(matches!(value["result"], Value::Object(_)));
}
