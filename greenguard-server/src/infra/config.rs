use greenguard_core::SchedulerConfig;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_AGRO_BASE_URL: &str = "https://api.agromonitoring.com/agro/1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Fatal at startup; the process refuses to run without it.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// Server configuration loaded from environment variables (a `.env` file is
/// honoured when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,

    /// PostgreSQL connection string. Required.
    pub database_url: String,

    /// AgroMonitoring API key. Required.
    pub agro_api_key: String,
    pub agro_base_url: String,

    pub weather_interval_secs: u64,
    pub ndvi_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let agro_api_key = env::var("AGROMONITORING_API_KEY")
            .map_err(|_| ConfigError::Missing("AGROMONITORING_API_KEY"))?;

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .unwrap_or(8081),

            database_url,

            agro_api_key,
            agro_base_url: env::var("AGRO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AGRO_BASE_URL.to_string()),

            weather_interval_secs: env::var("WEATHER_INTERVAL_SEC")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3_600),
            ndvi_interval_secs: env::var("NDVI_INTERVAL_SEC")
                .unwrap_or_else(|_| "432000".to_string())
                .parse()
                .unwrap_or(5 * 86_400),
        })
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            weather_interval: Duration::from_secs(self.weather_interval_secs),
            ndvi_interval: Duration::from_secs(self.ndvi_interval_secs),
            ..SchedulerConfig::default()
        }
    }
}
