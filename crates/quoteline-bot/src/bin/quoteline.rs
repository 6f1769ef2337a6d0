//! Webhook server entry point

use quoteline_bot::platforms::LineClient;
use quoteline_bot::server::{AppState, serve};
use quoteline_bot::{
    AlphaVantageClient, BotConfig, PgHistoryStore, QueryPipeline, TickerResolver,
};
use quoteline_llm::{OpenAIConfig, OpenAIProvider};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = BotConfig::from_env()?;
    config.validate()?;

    let mut openai_config = OpenAIConfig::new(&config.openai_api_key);
    if let Some(api_base) = &config.openai_api_base {
        openai_config = openai_config.with_api_base(api_base);
    }
    let provider = Arc::new(OpenAIProvider::with_config(openai_config)?);

    let history = Arc::new(PgHistoryStore::connect(&config.database_url).await?);
    history.init_schema().await?;

    let resolver = TickerResolver::new(provider, history.clone(), &config.openai_model);

    let mut quotes = AlphaVantageClient::new(&config.alpha_vantage_api_key);
    if let Some(api_base) = &config.alpha_vantage_api_base {
        quotes = quotes.with_base_url(api_base);
    }

    let pipeline = QueryPipeline::new(resolver, Arc::new(quotes), history);
    let line = LineClient::new(&config.line_channel_access_token);

    let state = Arc::new(AppState {
        pipeline,
        line,
        channel_secret: config.line_channel_secret.clone(),
    });

    let addr = config.bind_addr.parse()?;
    info!(model = config.openai_model, "starting quoteline");
    serve(addr, state).await?;

    Ok(())
}
