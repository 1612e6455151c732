pub mod models;
pub mod generator;
pub mod llm;
pub mod prompt;
pub mod ai_ranker;

pub use models::{CabinClass, FlightOffer, Recommendation, RecommendationResult};
pub use generator::OfferGenerator;
pub use ai_ranker::{fallback_recommendations, OfferRanker};
pub use llm::{OpenAiClient, RankingError, RankingService};
