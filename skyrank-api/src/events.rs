//! Wire events exchanged over the WebSocket. Every frame is a JSON text
//! message shaped `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use skyrank_core::{SearchCriteria, SearchRequest};
use skyrank_offer::RecommendationResult;

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Search(SearchRequest),
    GetFlightDetails(FlightDetailsRequest),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightDetailsRequest {
    pub flight_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ConnectionAck(ConnectionAck),
    SearchStatus(SearchStatus),
    SearchComplete(SearchComplete),
    SearchError(ErrorPayload),
    FlightDetailsResponse(FlightDetails),
    FlightDetailsError(ErrorPayload),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Searching,
    Analyzing,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAck {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchStatus {
    pub status: SearchPhase,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchComplete {
    pub status: SearchPhase,
    pub data: RecommendationResult,
    pub search_params: SearchCriteria,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    pub flight_id: String,
    pub message: String,
    pub booking_ready: bool,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>, message: Option<String>) -> Self {
        Self { error: error.into(), message }
    }
}

impl ServerEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ConnectionAck(_) => "connection_ack",
            ServerEvent::SearchStatus(_) => "search_status",
            ServerEvent::SearchComplete(_) => "search_complete",
            ServerEvent::SearchError(_) => "search_error",
            ServerEvent::FlightDetailsResponse(_) => "flight_details_response",
            ServerEvent::FlightDetailsError(_) => "flight_details_error",
        }
    }
}
