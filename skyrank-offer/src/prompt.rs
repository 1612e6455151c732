//! Formats a batch of offers into a ranking request for the language model.

use skyrank_core::app_config::RankingConfig;
use skyrank_core::SearchCriteria;

use crate::llm::{ChatCompletionRequest, Message};
use crate::models::FlightOffer;

const SYSTEM_PROMPT: &str = "You are a travel expert and flight booking advisor.
Your job is to analyze flight offers and recommend the 5 best options.

Selection criteria:
1. Best value for money
2. Optimal flight duration
3. Number of stops (prefer direct flights)
4. Convenient departure and arrival times (avoid very early or very late flights unless worthwhile)
5. Reputable airline
6. Included services (baggage, meals, WiFi)

Give a concise, useful analysis for each recommendation.";

const RESPONSE_FORMAT: &str = r#"{
  "recommendations": [
    {
      "flight_id": "FL1001",
      "rank": 1,
      "reason": "Short, clear explanation",
      "highlights": ["strength 1", "strength 2"]
    }
  ]
}"#;

pub const NO_PREFERENCE: &str = "No preference";

pub fn build_ranking_request(
    config: &RankingConfig,
    offers: &[FlightOffer],
    criteria: &SearchCriteria,
) -> Result<ChatCompletionRequest, serde_json::Error> {
    let flights_json = serde_json::to_string_pretty(offers)?;

    let user = format!(
        "Search criteria:
- Origin: {origin}
- Destination: {destination}
- Date: {date}
- Preferred airline: {airline}

Available flight offers:
{flights_json}

Recommend the 5 best offers with a brief explanation (2-3 sentences) for each.
Answer with JSON only, in this format:
{RESPONSE_FORMAT}",
        origin = criteria.origin,
        destination = criteria.destination,
        date = criteria.date,
        airline = criteria.preferred_airline().unwrap_or(NO_PREFERENCE),
    );

    Ok(ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
        temperature: Some(config.temperature),
    })
}
