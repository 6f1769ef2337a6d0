//! Shared stub implementations of the trait seams for unit tests

use crate::api::{GlobalQuote, QuoteSource};
use crate::error::Result;
use crate::history::{HistoryStore, QueryRecord};
use async_trait::async_trait;
use quoteline_llm::{ChatProvider, CompletionRequest, CompletionResponse, LlmError};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type ErrorFactory = Box<dyn Fn() -> LlmError + Send + Sync>;

/// Chat provider stub: fixed answer or fabricated error, with a call counter
pub struct StubProvider {
    answer: Option<String>,
    error: Option<ErrorFactory>,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(factory: impl Fn() -> LlmError + Send + Sync + 'static) -> Self {
        Self {
            answer: None,
            error: Some(Box::new(factory)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> quoteline_llm::Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(factory) = &self.error {
            return Err(factory());
        }

        Ok(CompletionResponse {
            content: self.answer.clone().unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// In-memory history store honoring the ordering and limit contract
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<QueryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<QueryRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn records(&self) -> Vec<QueryRecord> {
        self.records.lock().expect("history lock").clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn find_record(
        &self,
        user_id: &str,
        company_name: &str,
    ) -> Result<Option<QueryRecord>> {
        Ok(self
            .records
            .lock()
            .expect("history lock")
            .iter()
            .find(|r| r.user_id == user_id && r.company_name == company_name)
            .cloned())
    }

    async fn insert_record(&self, record: &QueryRecord) -> Result<()> {
        self.records
            .lock()
            .expect("history lock")
            .push(record.clone());
        Ok(())
    }

    async fn recent_records(&self, user_id: &str, limit: i64) -> Result<Vec<QueryRecord>> {
        let mut matching: Vec<QueryRecord> = self
            .records
            .lock()
            .expect("history lock")
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(matching)
    }
}

/// Quote source stub backed by a symbol-to-price table
///
/// Symbols absent from the table come back with `price: None`, the same as
/// an unknown ticker at the real provider.
#[derive(Default)]
pub struct StubQuoteSource {
    prices: HashMap<String, f64>,
}

impl StubQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

#[async_trait]
impl QuoteSource for StubQuoteSource {
    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuote> {
        Ok(GlobalQuote {
            symbol: symbol.to_string(),
            price: self.prices.get(symbol).copied(),
        })
    }
}
