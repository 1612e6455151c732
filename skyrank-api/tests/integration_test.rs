use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use skyrank_api::delay::{DelayStrategy, NoDelay};
use skyrank_api::events::{SearchPhase, ServerEvent};
use skyrank_api::session::Session;
use skyrank_api::{app, AppState};
use skyrank_core::Config;
use skyrank_offer::llm::ChatCompletionRequest;
use skyrank_offer::{OfferRanker, RankingError, RankingService};
use tokio::sync::mpsc;
use tower::ServiceExt;

struct FixedReply(&'static str);

#[async_trait]
impl RankingService for FixedReply {
    async fn complete(&self, _request: ChatCompletionRequest) -> Result<String, RankingError> {
        Ok(self.0.to_string())
    }
}

struct Exploding;

#[async_trait]
impl RankingService for Exploding {
    async fn complete(&self, _request: ChatCompletionRequest) -> Result<String, RankingError> {
        panic!("ranking backend exploded");
    }
}

/// Records each pause in line with the events emitted before it.
struct RecordingDelay {
    events: Mutex<mpsc::UnboundedReceiver<ServerEvent>>,
    log: Mutex<Vec<String>>,
}

impl RecordingDelay {
    fn flush(&self) {
        let mut events = self.events.lock().unwrap();
        let mut log = self.log.lock().unwrap();
        while let Ok(event) = events.try_recv() {
            let value = serde_json::to_value(&event).unwrap();
            let entry = match value["data"]["status"].as_str() {
                Some(status) => format!("{}:{}", event.name(), status),
                None => event.name().to_string(),
            };
            log.push(entry);
        }
    }
}

#[async_trait]
impl DelayStrategy for RecordingDelay {
    async fn pause(&self, phase: SearchPhase) {
        self.flush();
        self.log.lock().unwrap().push(format!("pause:{:?}", phase));
    }
}

fn test_state(service: Option<Arc<dyn RankingService>>) -> AppState {
    let config = Config::defaults().expect("default config");
    let ranker = OfferRanker::new(config.ranking.clone(), service);
    AppState::new(config, ranker, Arc::new(NoDelay))
}

fn open_session(state: AppState) -> (Session, mpsc::UnboundedReceiver<ServerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Session::connect(state, tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(serde_json::to_value(&event).expect("event serializes"));
    }
    events
}

fn names(events: &[Value]) -> Vec<&str> {
    events.iter().map(|e| e["event"].as_str().unwrap_or_default()).collect()
}

const SEARCH: &str =
    r#"{"event":"search","data":{"origin":"Paris","destination":"London","date":"2025-12-25","airline":"Air France"}}"#;

#[tokio::test]
async fn test_root_and_health_routes() {
    let app = app(test_state(None));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["endpoints"]["health"], "/health");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rankingConfigured"], false);
    assert_eq!(body["services"]["ranking"], "fallback");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = app(test_state(None));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_connect_acknowledges_with_session_id() {
    let (session, mut rx) = open_session(test_state(None));
    let events = drain(&mut rx);

    assert_eq!(names(&events), vec!["connection_ack"]);
    assert_eq!(events[0]["data"]["sessionId"], session.id().to_string());
}

#[tokio::test]
async fn test_search_with_empty_destination_is_rejected() {
    let (session, mut rx) = open_session(test_state(None));
    drain(&mut rx);

    session
        .handle_text(r#"{"event":"search","data":{"origin":"Paris","destination":"","date":"2025-12-25"}}"#)
        .await;

    let events = drain(&mut rx);
    assert_eq!(names(&events), vec!["search_error"]);
    assert_eq!(events[0]["data"]["error"], "Missing parameters");
    assert!(events[0]["data"]["message"].is_string());
}

#[tokio::test]
async fn test_search_flow_with_fallback_ranking() {
    let (session, mut rx) = open_session(test_state(None));
    drain(&mut rx);

    session.handle_text(SEARCH).await;

    let events = drain(&mut rx);
    assert_eq!(
        names(&events),
        vec!["search_status", "search_status", "search_complete"]
    );
    assert_eq!(events[0]["data"]["status"], "searching");
    assert_eq!(events[1]["data"]["status"], "analyzing");

    let complete = &events[2]["data"];
    assert_eq!(complete["status"], "completed");
    assert_eq!(complete["searchParams"]["origin"], "Paris");
    assert_eq!(complete["searchParams"]["airline"], "Air France");

    let result = &complete["data"];
    assert_eq!(result["success"], true);
    assert!(result["note"].is_string());
    let analyzed = result["totalFlightsAnalyzed"].as_u64().unwrap();
    assert!((8..=15).contains(&analyzed));
    assert!(events[1]["data"]["message"]
        .as_str()
        .unwrap()
        .starts_with(&analyzed.to_string()));

    let recs = result["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 5);
    for (i, rec) in recs.iter().enumerate() {
        assert_eq!(rec["aiAnalysis"]["rank"], (i + 1) as u64);
        assert!(rec["id"].as_str().unwrap().starts_with("FL"));
    }
}

#[tokio::test]
async fn test_search_pauses_between_phases() {
    let (tx, rx) = mpsc::unbounded_channel();
    let delay = Arc::new(RecordingDelay {
        events: Mutex::new(rx),
        log: Mutex::new(Vec::new()),
    });
    let config = Config::defaults().expect("default config");
    let ranker = OfferRanker::new(config.ranking.clone(), None);
    let state = AppState::new(config, ranker, delay.clone());
    let session = Session::connect(state, tx);

    session.handle_text(SEARCH).await;
    delay.flush();

    let log = delay.log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "connection_ack",
            "search_status:searching",
            "pause:Searching",
            "search_status:analyzing",
            "pause:Analyzing",
            "search_complete:completed",
        ]
    );
}

#[tokio::test]
async fn test_search_flow_with_model_ranking() {
    let service: Arc<dyn RankingService> = Arc::new(FixedReply(
        "```json\n{\"recommendations\":[{\"flight_id\":\"FL1000\",\"rank\":1,\"reason\":\"Preferred airline\",\"highlights\":[\"Air France\"]}]}\n```",
    ));
    let (session, mut rx) = open_session(test_state(Some(service)));
    drain(&mut rx);

    session.handle_text(SEARCH).await;

    let events = drain(&mut rx);
    let result = &events.last().unwrap()["data"]["data"];
    assert!(result.get("note").is_none());
    let recs = result["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["id"], "FL1000");
    assert_eq!(recs[0]["airline"], "Air France");
    assert_eq!(recs[0]["aiAnalysis"]["reason"], "Preferred airline");
}

#[tokio::test]
async fn test_panic_during_search_becomes_server_error() {
    let service: Arc<dyn RankingService> = Arc::new(Exploding);
    let (session, mut rx) = open_session(test_state(Some(service)));
    drain(&mut rx);

    session.handle_text(SEARCH).await;

    let events = drain(&mut rx);
    assert_eq!(
        names(&events),
        vec!["search_status", "search_status", "search_error"]
    );
    assert_eq!(events[2]["data"]["error"], "Server error");
    assert!(events[2]["data"]["message"]
        .as_str()
        .unwrap()
        .contains("ranking backend exploded"));

    // The session keeps working
    session
        .handle_text(r#"{"event":"get_flight_details","data":{"flightId":"FL1004"}}"#)
        .await;
    assert_eq!(names(&drain(&mut rx)), vec!["flight_details_response"]);
}

#[tokio::test]
async fn test_flight_details() {
    let (session, mut rx) = open_session(test_state(None));
    drain(&mut rx);

    session
        .handle_text(r#"{"event":"get_flight_details","data":{"flightId":"FL1003"}}"#)
        .await;
    let events = drain(&mut rx);
    assert_eq!(names(&events), vec!["flight_details_response"]);
    assert_eq!(events[0]["data"]["flightId"], "FL1003");
    assert_eq!(events[0]["data"]["bookingReady"], true);

    session
        .handle_text(r#"{"event":"get_flight_details","data":{}}"#)
        .await;
    let events = drain(&mut rx);
    assert_eq!(names(&events), vec!["flight_details_error"]);
    assert_eq!(events[0]["data"]["error"], "Missing flight id");
}

#[tokio::test]
async fn test_invalid_frame_reports_error() {
    let (session, mut rx) = open_session(test_state(None));
    drain(&mut rx);

    session.handle_text("not json").await;
    session.handle_text(r#"{"event":"book_flight","data":{}}"#).await;

    let events = drain(&mut rx);
    assert_eq!(names(&events), vec!["search_error", "search_error"]);
    assert_eq!(events[0]["data"]["error"], "Invalid event");
}

#[tokio::test]
async fn test_search_after_client_left_does_not_panic() {
    let (session, rx) = open_session(test_state(None));
    drop(rx);
    session.handle_text(SEARCH).await;
}
