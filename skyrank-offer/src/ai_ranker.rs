use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use skyrank_core::app_config::RankingConfig;
use skyrank_core::SearchCriteria;
use tracing::{debug, info, warn};

use crate::llm::{RankingError, RankingService};
use crate::models::{Analysis, FlightOffer, Recommendation, RecommendationResult};
use crate::prompt::build_ranking_request;

pub const TOP_N: usize = 5;
pub const FALLBACK_NOTE: &str = "Recommendations based on price and stops (fallback mode)";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid ranking JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Any reason the model path could not produce a result
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to format ranking request: {0}")]
    Format(serde_json::Error),
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    #[serde(default)]
    recommendations: Vec<Value>,
}

/// One model entry, read leniently so a malformed entry costs only itself.
struct RankedEntry<'a> {
    flight_id: &'a str,
    reason: String,
    highlights: Vec<String>,
}

impl<'a> RankedEntry<'a> {
    /// `None` unless the entry carries a string `flight_id`. A non-string
    /// `reason` reads as empty; non-string highlights are skipped.
    fn from_value(value: &'a Value) -> Option<Self> {
        let flight_id = value.get("flight_id")?.as_str()?;
        let reason = value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let highlights = value
            .get("highlights")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self { flight_id, reason, highlights })
    }
}

/// Picks the top offers, through the language model when one is configured
/// and through the stops-then-price heuristic otherwise.
pub struct OfferRanker {
    config: RankingConfig,
    service: Option<Arc<dyn RankingService>>,
}

impl OfferRanker {
    pub fn new(config: RankingConfig, service: Option<Arc<dyn RankingService>>) -> Self {
        Self { config, service }
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Rank offers for a search. Never fails: any model problem falls back
    /// to [`fallback_recommendations`].
    pub async fn recommend(
        &self,
        offers: &[FlightOffer],
        criteria: &SearchCriteria,
    ) -> RecommendationResult {
        let Some(service) = self.service.as_deref() else {
            debug!("ranking service not configured, using fallback ranking");
            return fallback_recommendations(offers);
        };

        match self.rank_with_model(service, offers, criteria).await {
            Ok(recommendations) => {
                info!(
                    offers = offers.len(),
                    recommended = recommendations.len(),
                    "model ranking succeeded"
                );
                RecommendationResult::new(recommendations, offers.len())
            }
            Err(e) => {
                warn!(error = %e, "model ranking failed, using fallback ranking");
                fallback_recommendations(offers)
            }
        }
    }

    /// Format, invoke, parse. Errors are returned to the caller untouched.
    pub async fn rank_with_model(
        &self,
        service: &dyn RankingService,
        offers: &[FlightOffer],
        criteria: &SearchCriteria,
    ) -> Result<Vec<Recommendation>, PipelineError> {
        let request =
            build_ranking_request(&self.config, offers, criteria).map_err(PipelineError::Format)?;
        let raw = service.complete(request).await?;
        debug!(bytes = raw.len(), "ranking response received");
        Ok(parse_ranking_response(&raw, offers)?)
    }
}

/// Strip a surrounding ```` ```json ```` or bare ```` ``` ```` fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let raw = raw.trim();
    let inner = if let Some((_, rest)) = raw.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some((_, rest)) = raw.split_once("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        raw
    };
    inner.trim()
}

/// Parse model output into recommendations over `offers`.
///
/// Only the first five entries are considered. Entries whose identifier is
/// missing, not a string, or unknown are dropped, and no backfill takes
/// place, so fewer than five recommendations may come back. List order is
/// authoritative: the model's own `rank` field is ignored and ranks are
/// renumbered 1..n in the order the model listed them.
pub fn parse_ranking_response(
    raw: &str,
    offers: &[FlightOffer],
) -> Result<Vec<Recommendation>, ParseError> {
    let response: RankingResponse = serde_json::from_str(strip_code_fence(raw))?;
    let by_id: HashMap<&str, &FlightOffer> = offers.iter().map(|o| (o.id.as_str(), o)).collect();

    let recommendations = response
        .recommendations
        .into_iter()
        .take(TOP_N)
        .filter_map(|value| {
            let entry = RankedEntry::from_value(&value)?;
            let offer = by_id.get(entry.flight_id)?;
            Some(((*offer).clone(), entry.reason, entry.highlights))
        })
        .enumerate()
        .map(|(i, (offer, reason, highlights))| Recommendation {
            offer,
            ai_analysis: Analysis {
                rank: (i + 1) as u8,
                reason,
                highlights,
            },
        })
        .collect();

    Ok(recommendations)
}

/// Deterministic ranking: fewest stops, then lowest price.
pub fn fallback_recommendations(offers: &[FlightOffer]) -> RecommendationResult {
    let mut sorted: Vec<&FlightOffer> = offers.iter().collect();
    sorted.sort_by_key(|o| (o.stops, o.price));

    let recommendations = sorted
        .into_iter()
        .take(TOP_N)
        .enumerate()
        .map(|(i, offer)| {
            let highlights = fallback_highlights(offer);
            let reason = if highlights.is_empty() {
                "Recommended for: good overall choice".to_string()
            } else {
                format!("Recommended for: {}", highlights.join(", "))
            };
            Recommendation {
                offer: offer.clone(),
                ai_analysis: Analysis {
                    rank: (i + 1) as u8,
                    reason,
                    highlights,
                },
            }
        })
        .collect();

    RecommendationResult::new(recommendations, offers.len()).with_note(FALLBACK_NOTE)
}

fn fallback_highlights(offer: &FlightOffer) -> Vec<String> {
    let mut highlights = Vec::new();
    if offer.is_direct() {
        highlights.push("direct flight".to_string());
    }
    if offer.price < 300 {
        highlights.push("highly competitive price".to_string());
    } else if offer.price < 500 {
        highlights.push("good value".to_string());
    }
    highlights
}
