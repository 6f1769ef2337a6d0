//! Per-message orchestration: intent branch, resolution, quote, reply text

use crate::api::QuoteSource;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::resolver::TickerResolver;
use std::sync::Arc;
use tracing::info;

/// Literal message that triggers a history replay
const HISTORY_KEYWORD: &str = "history";

/// Maximum number of records replayed per history request
const HISTORY_LIMIT: i64 = 5;

/// First line of a history reply
const HISTORY_HEADER: &str = "Your recent stock queries:";

/// Hint appended to every lookup reply
const HISTORY_HINT: &str = "Type 'history' to see your recent queries.";

/// Orchestrates one inbound message into one reply text
///
/// Stateless between invocations; the only branch is the `history` keyword
/// against the normalized input. Everything else, garbage and empty strings
/// included, is treated as a company query.
pub struct QueryPipeline {
    resolver: TickerResolver,
    quotes: Arc<dyn QuoteSource>,
    history: Arc<dyn HistoryStore>,
}

impl QueryPipeline {
    /// Create a new pipeline over its injected collaborators
    pub fn new(
        resolver: TickerResolver,
        quotes: Arc<dyn QuoteSource>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            resolver,
            quotes,
            history,
        }
    }

    /// Produce the reply text for one inbound message
    pub async fn handle(&self, user_id: &str, raw_text: &str) -> Result<String> {
        if raw_text.trim().to_lowercase() == HISTORY_KEYWORD {
            self.handle_history(user_id).await
        } else {
            self.handle_lookup(user_id, raw_text).await
        }
    }

    /// History replay: header, then up to five records with live prices
    async fn handle_history(&self, user_id: &str) -> Result<String> {
        let records = self.history.recent_records(user_id, HISTORY_LIMIT).await?;
        info!(user_id, count = records.len(), "history request");

        let mut reply = HISTORY_HEADER.to_string();
        for record in &records {
            // Live price every time; stored tickers are never cached prices
            let quote = self.quotes.global_quote(&record.ticker).await?;
            let line = match quote.price {
                Some(price) => {
                    format!("{} ({}): ${price:.2}", record.company_name, record.ticker)
                }
                None => format!(
                    "{} ({}): Price not available",
                    record.company_name, record.ticker
                ),
            };
            reply.push('\n');
            reply.push_str(&line);
        }

        Ok(reply)
    }

    /// Company query: resolve, fetch, format
    async fn handle_lookup(&self, user_id: &str, raw_text: &str) -> Result<String> {
        let ticker = self.resolver.resolve(user_id, raw_text).await?;
        let quote = self.quotes.global_quote(&ticker).await?;
        info!(user_id, ticker, price = ?quote.price, "quote lookup");

        let body = match quote.price {
            Some(price) => format!("Ticker: {ticker}\nCurrent Stock Price: ${price:.2}"),
            None => format!("Unable to retrieve current stock price for {ticker}."),
        };

        Ok(format!("{body}\n\n{HISTORY_HINT}"))
    }
}
