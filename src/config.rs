use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::cse::{DEFAULT_BASE_URL, SearchClient};
use crate::error::ConfigError;

/// Process settings. Read once at startup from flags, the environment and an
/// optional `.env` file, then handed to whatever needs them.
#[derive(Parser, Debug, Clone)]
#[command(name = "imarch", version, about = "Inline image search gateway")]
pub struct Config {
    /// Google API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Custom search engine id (cx)
    #[arg(long, env = "SEARCH_ENGINE_ID")]
    pub search_engine_id: String,

    #[arg(long, env = "SEARCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub search_base_url: String,

    /// Per-request timeout towards the provider, in seconds
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value_t = 10)]
    pub search_timeout_secs: u64,

    #[arg(long, env = "SAFE_SEARCH", default_value_t = false)]
    pub safe_search: bool,

    #[arg(long, env = "IMARCH_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Username shown in the help text
    #[arg(long, env = "BOT_USERNAME", default_value = "ImarchBot")]
    pub bot_username: String,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present
        Config::parse()
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn search_client(&self) -> Result<SearchClient, ConfigError> {
        SearchClient::builder(&self.google_api_key, &self.search_engine_id)
            .base_url(&self.search_base_url)
            .timeout(self.search_timeout())
            .build()
    }
}
