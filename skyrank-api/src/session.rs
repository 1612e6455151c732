use skyrank_core::{CoreError, SearchCriteria, SearchRequest};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::events::{
    ClientEvent, ConnectionAck, ErrorPayload, FlightDetails, FlightDetailsRequest, SearchComplete,
    SearchPhase, SearchStatus, ServerEvent,
};
use crate::state::AppState;

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// One client connection. Cheap to clone; every client event is handled on
/// its own clone.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    state: AppState,
    tx: EventSender,
}

impl Session {
    /// Open a session and acknowledge the connection.
    pub fn connect(state: AppState, tx: EventSender) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            state,
            tx,
        };
        info!(session_id = %session.id, "client connected");
        session.emit_or_log(ServerEvent::ConnectionAck(ConnectionAck {
            message: "Connected to the SkyRank server".to_string(),
            session_id: session.id.to_string(),
        }));
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Decode and dispatch one text frame.
    pub async fn handle_text(&self, text: &str) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "invalid client event");
                self.emit_or_log(ServerEvent::SearchError(ErrorPayload::new(
                    "Invalid event",
                    Some(e.to_string()),
                )));
            }
        }
    }

    pub async fn handle_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::Search(request) => self.search(request).await,
            ClientEvent::GetFlightDetails(request) => self.flight_details(request),
        }
    }

    async fn search(&self, request: SearchRequest) {
        let criteria = match request.validate() {
            Ok(criteria) => criteria,
            Err(e) => {
                let message = match e {
                    CoreError::ValidationError(msg) => msg,
                    other => other.to_string(),
                };
                debug!(session_id = %self.id, %message, "search rejected");
                self.emit_or_log(ServerEvent::SearchError(ErrorPayload::new(
                    "Missing parameters",
                    Some(message),
                )));
                return;
            }
        };

        info!(
            session_id = %self.id,
            origin = %criteria.origin,
            destination = %criteria.destination,
            date = %criteria.date,
            airline = ?criteria.airline,
            "search received"
        );

        // Run in a separate task so a panic surfaces as a JoinError
        let session = self.clone();
        let outcome = match tokio::spawn(async move { session.run_search(criteria).await }).await {
            Ok(result) => result,
            Err(e) => Err(GatewayError::from(e)),
        };

        match outcome {
            Ok(()) => info!(session_id = %self.id, "search completed"),
            Err(GatewayError::ChannelClosed) => {
                debug!(session_id = %self.id, "client left before the search completed")
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "search failed");
                self.emit_or_log(ServerEvent::SearchError(ErrorPayload::new(
                    "Server error",
                    Some(e.to_string()),
                )));
            }
        }
    }

    async fn run_search(&self, criteria: SearchCriteria) -> Result<(), GatewayError> {
        self.emit(status(
            SearchPhase::Searching,
            format!(
                "Searching flights from {} to {}...",
                criteria.origin, criteria.destination
            ),
        ))?;

        self.state.delay.pause(SearchPhase::Searching).await;
        let offers = self.state.generator.generate(&criteria);

        self.emit(status(
            SearchPhase::Analyzing,
            format!("{} flights found. Analyzing with AI...", offers.len()),
        ))?;

        self.state.delay.pause(SearchPhase::Analyzing).await;
        let result = self.state.ranker.recommend(&offers, &criteria).await;

        self.emit(ServerEvent::SearchComplete(SearchComplete {
            status: SearchPhase::Completed,
            data: result,
            search_params: criteria,
        }))
    }

    /// Details are not looked up; the id is echoed back as bookable.
    fn flight_details(&self, request: FlightDetailsRequest) {
        let flight_id = request
            .flight_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let event = match flight_id {
            Some(flight_id) => ServerEvent::FlightDetailsResponse(FlightDetails {
                flight_id,
                message: "Flight details available".to_string(),
                booking_ready: true,
            }),
            None => ServerEvent::FlightDetailsError(ErrorPayload::new("Missing flight id", None)),
        };
        self.emit_or_log(event);
    }

    fn emit(&self, event: ServerEvent) -> Result<(), GatewayError> {
        debug!(session_id = %self.id, event = event.name(), "emit");
        self.tx.send(event).map_err(|_| GatewayError::ChannelClosed)
    }

    fn emit_or_log(&self, event: ServerEvent) {
        if self.emit(event).is_err() {
            debug!(session_id = %self.id, "dropping event for closed session");
        }
    }
}

fn status(status: SearchPhase, message: String) -> ServerEvent {
    ServerEvent::SearchStatus(SearchStatus { status, message })
}
