//! LINE stock-quote bot
//!
//! This crate implements a webhook bot for the LINE messaging platform. A
//! user sends a company name or description; the bot resolves it to a stock
//! ticker (LLM lookup with a deterministic fallback), fetches the current
//! price from Alpha Vantage, and replies. Every first-time resolution is
//! persisted per user, and the literal message `history` replays the five
//! most recent queries with live prices.
//!
//! # Architecture
//!
//! Request flow per inbound webhook delivery:
//!
//! - `server`: verifies the `X-Line-Signature` header and decodes events
//! - `pipeline`: branches on the `history` keyword vs. a company query
//! - `resolver`: history lookup, then LLM, then fallback rule
//! - `api`: Alpha Vantage GLOBAL_QUOTE client
//! - `history`: append-only per-user query records in PostgreSQL
//! - `platforms`: LINE reply API client and webhook payload types
//!
//! All collaborators are constructed once at startup and injected into the
//! pipeline; there is no process-global state.

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod platforms;
pub mod resolver;
pub mod server;

// Re-export main types for convenience
pub use api::{AlphaVantageClient, GlobalQuote, QuoteSource};
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use history::{HistoryStore, PgHistoryStore, QueryRecord};
pub use pipeline::QueryPipeline;
pub use resolver::TickerResolver;

#[cfg(test)]
pub(crate) mod testutil;
