use std::time::Duration;

use async_trait::async_trait;
use skyrank_core::app_config::GatewayConfig;

use crate::events::SearchPhase;

/// Simulated upstream latency before each search phase.
#[async_trait]
pub trait DelayStrategy: Send + Sync {
    async fn pause(&self, phase: SearchPhase);
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    search: Duration,
    analysis: Duration,
}

impl FixedDelay {
    pub fn new(search: Duration, analysis: Duration) -> Self {
        Self { search, analysis }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            Duration::from_millis(config.search_delay_ms),
            Duration::from_millis(config.analysis_delay_ms),
        )
    }

    pub fn duration_for(&self, phase: SearchPhase) -> Duration {
        match phase {
            SearchPhase::Searching => self.search,
            SearchPhase::Analyzing => self.analysis,
            SearchPhase::Completed => Duration::ZERO,
        }
    }
}

#[async_trait]
impl DelayStrategy for FixedDelay {
    async fn pause(&self, phase: SearchPhase) {
        let d = self.duration_for(phase);
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

/// No latency. Used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl DelayStrategy for NoDelay {
    async fn pause(&self, _phase: SearchPhase) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_from_config() {
        let delay = FixedDelay::from_config(&GatewayConfig {
            search_delay_ms: 1000,
            analysis_delay_ms: 1500,
        });
        assert_eq!(delay.duration_for(SearchPhase::Searching), Duration::from_millis(1000));
        assert_eq!(delay.duration_for(SearchPhase::Analyzing), Duration::from_millis(1500));
        assert_eq!(delay.duration_for(SearchPhase::Completed), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let delay = FixedDelay::new(Duration::from_secs(1), Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        delay.pause(SearchPhase::Searching).await;
        delay.pause(SearchPhase::Analyzing).await;
        assert!(start.elapsed() >= Duration::from_millis(2500));
    }
}
