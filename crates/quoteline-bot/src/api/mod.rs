//! Outbound quote API clients

pub mod alpha_vantage;

pub use alpha_vantage::{AlphaVantageClient, GlobalQuote, QuoteSource};
