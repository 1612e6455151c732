use std::sync::Arc;

use skyrank_core::Config;
use skyrank_offer::{OfferGenerator, OfferRanker, OpenAiClient, RankingService};

use crate::delay::{DelayStrategy, FixedDelay};

/// Shared, immutable application state. Cloned per request and per session.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<OfferGenerator>,
    pub ranker: Arc<OfferRanker>,
    pub delay: Arc<dyn DelayStrategy>,
}

impl AppState {
    /// Wire up components from settings. Without a ranking credential the
    /// ranker runs in fallback-only mode.
    pub fn from_config(config: Config) -> Self {
        let service: Option<Arc<dyn RankingService>> = if config.ranking.is_configured() {
            match OpenAiClient::new(&config.ranking) {
                Ok(client) => {
                    tracing::info!(
                        base_url = %client.base_url(),
                        model = %config.ranking.model,
                        "ranking service configured"
                    );
                    let client: Arc<dyn RankingService> = Arc::new(client);
                    Some(client)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build ranking client, using fallback ranking");
                    None
                }
            }
        } else {
            tracing::warn!("no ranking API key configured, using fallback ranking");
            None
        };

        let delay = Arc::new(FixedDelay::from_config(&config.gateway));
        let ranker = OfferRanker::new(config.ranking.clone(), service);
        Self::new(config, ranker, delay)
    }

    pub fn new(config: Config, ranker: OfferRanker, delay: Arc<dyn DelayStrategy>) -> Self {
        Self {
            config: Arc::new(config),
            generator: Arc::new(OfferGenerator::new()),
            ranker: Arc::new(ranker),
            delay,
        }
    }
}
