//! Chat-completion client layer for quoteline
//!
//! This crate provides a minimal provider abstraction for text-only chat
//! completions. It includes:
//!
//! - Message and completion request/response types
//! - The [`ChatProvider`] trait the bot is injected with
//! - An OpenAI-compatible provider implementation

pub mod completion;
pub mod error;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{ChatMessage, CompletionRequest, CompletionResponse, Role};
pub use error::{LlmError, Result};
pub use provider::ChatProvider;
pub use providers::{OpenAIConfig, OpenAIProvider};
