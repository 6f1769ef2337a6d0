//! Configuration for the bot process

use crate::error::{BotError, Result};

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Configuration for the bot, sourced from the environment
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Alpha Vantage API key
    pub alpha_vantage_api_key: String,

    /// Alpha Vantage endpoint override (tests, proxies)
    pub alpha_vantage_api_base: Option<String>,

    /// LINE channel access token for the reply API
    pub line_channel_access_token: String,

    /// LINE channel secret for webhook signature verification
    pub line_channel_secret: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// OpenAI API key
    pub openai_api_key: String,

    /// OpenAI endpoint override (compatible APIs)
    pub openai_api_base: Option<String>,

    /// Model used for ticker resolution
    pub openai_model: String,

    /// Address the webhook server binds to
    pub bind_addr: String,
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// Required: `ALPHA_VANTAGE_API_KEY`, `LINE_CHANNEL_ACCESS_TOKEN`,
    /// `LINE_CHANNEL_SECRET`, `DATABASE_URL`, `OPENAI_API_KEY`.
    /// Optional: `ALPHA_VANTAGE_API_BASE`, `OPENAI_API_BASE`,
    /// `OPENAI_MODEL` (default "gpt-3.5-turbo"), `BIND_ADDR`
    /// (default "0.0.0.0:8000").
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            alpha_vantage_api_key: required("ALPHA_VANTAGE_API_KEY")?,
            alpha_vantage_api_base: std::env::var("ALPHA_VANTAGE_API_BASE").ok(),
            line_channel_access_token: required("LINE_CHANNEL_ACCESS_TOKEN")?,
            line_channel_secret: required("LINE_CHANNEL_SECRET")?,
            database_url: required("DATABASE_URL")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_api_base: std::env::var("OPENAI_API_BASE").ok(),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.line_channel_secret.is_empty() {
            return Err(BotError::ConfigError(
                "LINE channel secret must not be empty".to_string(),
            ));
        }

        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(BotError::ConfigError(format!(
                "invalid bind address: {}",
                self.bind_addr
            )));
        }

        Ok(())
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| BotError::ConfigError(format!("{name} not set")))
}
