use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

/// Cabin class tiers, cheapest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CabinClass {
    Economy,
    #[serde(rename = "Premium Economy")]
    PremiumEconomy,
    Business,
    #[serde(rename = "First Class")]
    FirstClass,
}

impl CabinClass {
    pub const ALL: [CabinClass; 4] = [
        CabinClass::Economy,
        CabinClass::PremiumEconomy,
        CabinClass::Business,
        CabinClass::FirstClass,
    ];

    /// Multiplier applied to the base fare for this tier
    pub fn price_multiplier(&self) -> f64 {
        match self {
            CabinClass::Economy => 1.0,
            CabinClass::PremiumEconomy => 1.5,
            CabinClass::Business => 2.5,
            CabinClass::FirstClass => 4.0,
        }
    }

    /// Floored tier price for a base fare.
    pub fn apply_to(&self, base_price: u32) -> u32 {
        (base_price as f64 * self.price_multiplier()).floor() as u32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Baggage {
    pub carry_on: u8,
    pub checked: u8,
}

/// A synthetic flight offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    /// Human readable, e.g. `"5h 30m"`
    pub duration: String,
    pub duration_minutes: u32,
    pub price: u32,
    pub currency: String,
    pub stops: u8,
    pub cabin_class: CabinClass,
    pub available_seats: u32,
    pub baggage: Baggage,
    pub amenities: Vec<String>,
    pub booking_url: String,
}

impl FlightOffer {
    pub fn is_direct(&self) -> bool {
        self.stops == 0
    }
}

/// Why an offer was picked and where it ranks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Analysis {
    pub rank: u8,
    pub reason: String,
    pub highlights: Vec<String>,
}

/// An offer enriched with its ranking analysis. On the wire the offer fields
/// are flattened next to `aiAnalysis`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub offer: FlightOffer,
    pub ai_analysis: Analysis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
    pub total_flights_analyzed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RecommendationResult {
    pub fn new(recommendations: Vec<Recommendation>, total_flights_analyzed: usize) -> Self {
        Self {
            success: true,
            recommendations,
            total_flights_analyzed,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.note.is_some()
    }
}
