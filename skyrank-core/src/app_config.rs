use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub ranking: RankingConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Settings for the language-model ranking service.
#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_error_body_bytes: usize,
}

impl RankingConfig {
    /// True when a non-blank credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Simulated upstream latency between the search phases, in milliseconds.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub search_delay_ms: u64,
    pub analysis_delay_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        tracing::debug!(run_mode = %run_mode, "loading configuration");

        let s = Self::defaults_builder()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SKYRANK_SERVER__PORT=9000` sets `server.port`
            .add_source(
                config::Environment::with_prefix("SKYRANK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("ranking.api_key", env::var("OPENAI_API_KEY").ok())?
            .build()?;

        s.try_deserialize()
    }

    /// Built-in defaults only, without reading files or the environment.
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::defaults_builder()?.build()?.try_deserialize()
    }

    fn defaults_builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default(
                "cors.allowed_origins",
                vec!["http://localhost:3000", "http://127.0.0.1:3000"],
            )?
            .set_default("ranking.base_url", "https://api.openai.com/v1")?
            .set_default("ranking.model", "gpt-3.5-turbo")?
            .set_default("ranking.temperature", 0.3_f64)?
            .set_default("ranking.timeout_secs", 30_i64)?
            .set_default("ranking.max_error_body_bytes", 8192_i64)?
            .set_default("gateway.search_delay_ms", 1000_i64)?
            .set_default("gateway.analysis_delay_ms", 1500_i64)
    }
}
