//! Messaging platform integrations

pub mod line;

pub use line::{LineClient, WebhookEvent, WebhookPayload, sign, verify_signature};
