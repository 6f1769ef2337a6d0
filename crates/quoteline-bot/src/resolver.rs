//! Company-description-to-ticker resolution

use crate::error::Result;
use crate::history::{HistoryStore, QueryRecord};
use chrono::Utc;
use quoteline_llm::{ChatMessage, ChatProvider, CompletionRequest, LlmError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed instruction for the ticker-lookup completion
const RESOLVE_INSTRUCTION: &str =
    "Given this company name or description, respond with only the ticker symbol.";

/// Token budget for a ticker answer
const RESOLVE_MAX_TOKENS: usize = 16;

/// Resolves a free-text company description to a ticker symbol
///
/// Resolution chain: stored record, then LLM lookup, then the deterministic
/// fallback rule. The first resolution for a `(user, company)` pair wins and
/// is reused verbatim ever after, even if the LLM would now answer
/// differently.
pub struct TickerResolver {
    provider: Arc<dyn ChatProvider>,
    history: Arc<dyn HistoryStore>,
    model: String,
}

impl TickerResolver {
    /// Create a new resolver
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        history: Arc<dyn HistoryStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            history,
            model: model.into(),
        }
    }

    /// Resolve a company description to a ticker for the given user
    ///
    /// Persists a new record on every first-time resolution; repeat queries
    /// return the stored ticker without touching the LLM.
    pub async fn resolve(&self, user_id: &str, company_name: &str) -> Result<String> {
        let company = normalize_company(company_name);

        if let Some(record) = self.history.find_record(user_id, &company).await? {
            debug!(user_id, company, ticker = record.ticker, "history hit");
            return Ok(record.ticker);
        }

        let ticker = match self.lookup_via_llm(&company).await {
            Ok(ticker) => ticker,
            // Rate-limit and upstream failures degrade to the fallback rule.
            // Other kinds (auth, malformed response) fail the whole request.
            Err(LlmError::RateLimitExceeded(_) | LlmError::RequestFailed(_)) => {
                let ticker = fallback_ticker(&company);
                warn!(company, ticker, "LLM unavailable, using fallback rule");
                ticker
            }
            Err(err) => return Err(err.into()),
        };

        let record = QueryRecord {
            user_id: user_id.to_string(),
            company_name: company,
            ticker: ticker.clone(),
            created_at: Utc::now(),
        };
        self.history.insert_record(&record).await?;

        Ok(ticker)
    }

    async fn lookup_via_llm(&self, company: &str) -> quoteline_llm::Result<String> {
        let request = CompletionRequest::builder(&self.model)
            .add_message(ChatMessage::system(RESOLVE_INSTRUCTION))
            .add_message(ChatMessage::user(company))
            .max_tokens(RESOLVE_MAX_TOKENS)
            // Factual extraction, keep it deterministic
            .temperature(0.0)
            .build();

        let response = self.provider.complete(request).await?;
        Ok(response.content.trim().to_uppercase())
    }
}

/// Normalized history key: trimmed, lowercased
pub fn normalize_company(company_name: &str) -> String {
    company_name.trim().to_lowercase()
}

/// Deterministic non-LLM ticker guess
///
/// First whitespace-delimited token of the input, uppercased. Empty input
/// yields an empty ticker rather than an error; the pipeline must always
/// produce some reply.
pub fn fallback_ticker(text: &str) -> String {
    text.split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MemoryHistoryStore, StubProvider};

    fn resolver_with(provider: StubProvider) -> (TickerResolver, Arc<MemoryHistoryStore>) {
        let history = Arc::new(MemoryHistoryStore::new());
        let resolver = TickerResolver::new(Arc::new(provider), history.clone(), "test-model");
        (resolver, history)
    }

    #[test]
    fn test_fallback_ticker() {
        assert_eq!(fallback_ticker("apple inc"), "APPLE");
        assert_eq!(fallback_ticker("tesla"), "TESLA");
        assert_eq!(fallback_ticker("  msft  "), "MSFT");
        assert_eq!(fallback_ticker(""), "");
        assert_eq!(fallback_ticker("   "), "");
    }

    #[test]
    fn test_normalize_company() {
        assert_eq!(normalize_company("  Apple Inc "), "apple inc");
    }

    #[tokio::test]
    async fn test_resolve_via_llm_stores_record() {
        let (resolver, history) = resolver_with(StubProvider::answering("aapl\n"));

        let ticker = resolver.resolve("user-1", "Apple Inc").await.unwrap();
        assert_eq!(ticker, "AAPL");

        // Exactly one record, keyed by the normalized company name
        let records = history.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_name, "apple inc");
        assert_eq!(records[0].ticker, "AAPL");
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_and_persists() {
        let provider = StubProvider::failing(|| LlmError::RateLimitExceeded("slow down".into()));
        let (resolver, history) = resolver_with(provider);

        let ticker = resolver.resolve("user-1", "apple inc").await.unwrap();
        assert_eq!(ticker, "APPLE");

        let records = history.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "APPLE");
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back() {
        let provider = StubProvider::failing(|| LlmError::RequestFailed("HTTP 500".into()));
        let (resolver, _) = resolver_with(provider);

        let ticker = resolver.resolve("user-1", "tesla motors").await.unwrap();
        assert_eq!(ticker, "TESLA");
    }

    #[tokio::test]
    async fn test_auth_error_propagates() {
        let provider = StubProvider::failing(|| LlmError::AuthenticationFailed);
        let (resolver, history) = resolver_with(provider);

        let result = resolver.resolve("user-1", "apple inc").await;
        assert!(result.is_err());
        // No record is written on a propagated failure
        assert!(history.records().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_query_skips_llm() {
        let provider = StubProvider::answering("AAPL");
        let calls = provider.call_counter();
        let (resolver, history) = resolver_with(provider);

        let first = resolver.resolve("user-1", "apple inc").await.unwrap();
        let second = resolver.resolve("user-1", "Apple Inc").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(history.records().len(), 1);
    }

    #[tokio::test]
    async fn test_same_company_different_users_resolve_separately() {
        let provider = StubProvider::answering("AAPL");
        let calls = provider.call_counter();
        let (resolver, history) = resolver_with(provider);

        resolver.resolve("user-1", "apple inc").await.unwrap();
        resolver.resolve("user-2", "apple inc").await.unwrap();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(history.records().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_resolves_to_empty_ticker() {
        let provider = StubProvider::failing(|| LlmError::RateLimitExceeded(String::new()));
        let (resolver, _) = resolver_with(provider);

        let ticker = resolver.resolve("user-1", "   ").await.unwrap();
        assert_eq!(ticker, "");
    }

    #[tokio::test]
    async fn test_non_ticker_answer_stored_verbatim() {
        // No validation of the LLM answer's shape; it is stored as-is
        // (uppercased) and later used literally in the quote lookup
        let (resolver, history) = resolver_with(StubProvider::answering("I think it is AAPL"));

        let ticker = resolver.resolve("user-1", "apple inc").await.unwrap();
        assert_eq!(ticker, "I THINK IT IS AAPL");
        assert_eq!(history.records()[0].ticker, "I THINK IT IS AAPL");
    }
}
