//! Alpha Vantage API client

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// A point-in-time price reading for a ticker
///
/// `price` is `None` when the provider did not return the expected field
/// path. That covers unknown tickers as well as rate-limit and error
/// payloads; the provider does not let us tell those apart, so neither do
/// we. A missing price is not an error and is distinct from a price of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalQuote {
    /// Ticker symbol the quote was requested for
    pub symbol: String,

    /// Current price, if the provider reported one
    pub price: Option<f64>,
}

/// Source of live quotes
///
/// Fronts the Alpha Vantage client so the pipeline can be tested with stubs.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current global quote for a ticker symbol
    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote>;
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the endpoint URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    /// Get global quote (current price data)
    ///
    /// One GET per call; no retry, no caching. History replay re-fetches
    /// live prices every time.
    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote> {
        let mut params = HashMap::new();
        params.insert("function", "GLOBAL_QUOTE");
        params.insert("symbol", symbol);
        params.insert("apikey", self.api_key.as_str());

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let data: serde_json::Value = response.json().await?;

        Ok(parse_global_quote(symbol, &data))
    }
}

/// Extract the price from a GLOBAL_QUOTE response body
///
/// The expected field path is `"Global Quote"."05. price"`, a string-encoded
/// decimal. Anything else yields `price: None`.
fn parse_global_quote(symbol: &str, data: &serde_json::Value) -> GlobalQuote {
    let price = data
        .get("Global Quote")
        .and_then(|quote| quote.get("05. price"))
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| raw.parse::<f64>().ok());

    GlobalQuote {
        symbol: symbol.to_string(),
        price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("test_key");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, BASE_URL);

        let client = AlphaVantageClient::new("test_key").with_base_url("http://localhost:9999");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_parse_full_payload() {
        let data = json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "05. price": "150.2500",
                "07. latest trading day": "2024-05-01"
            }
        });

        let quote = parse_global_quote("AAPL", &data);
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, Some(150.25));
    }

    #[test]
    fn test_parse_empty_quote_object() {
        // Unknown tickers come back as an empty "Global Quote" object
        let data = json!({ "Global Quote": {} });
        let quote = parse_global_quote("NOPE", &data);
        assert_eq!(quote.price, None);
    }

    #[test]
    fn test_parse_rate_limit_payload() {
        // Rate-limit notes carry no quote fields at all; they are treated
        // the same as an unknown ticker
        let data = json!({
            "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        });
        let quote = parse_global_quote("AAPL", &data);
        assert_eq!(quote.price, None);
    }

    #[test]
    fn test_parse_unparsable_price() {
        let data = json!({ "Global Quote": { "05. price": "n/a" } });
        let quote = parse_global_quote("AAPL", &data);
        assert_eq!(quote.price, None);
    }

    #[test]
    fn test_zero_price_is_present() {
        let data = json!({ "Global Quote": { "05. price": "0.0000" } });
        let quote = parse_global_quote("ZERO", &data);
        assert_eq!(quote.price, Some(0.0));
    }
}
