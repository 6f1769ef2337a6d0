//! Axum webhook server for LINE callbacks

use crate::pipeline::QueryPipeline;
use crate::platforms::{LineClient, WebhookPayload, verify_signature};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything a webhook delivery needs, built once at startup
pub struct AppState {
    pub pipeline: QueryPipeline,
    pub line: LineClient,
    pub channel_secret: String,
}

/// Build the router: the LINE callback plus a liveness probe
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind the listener and serve until ctrl-c
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

/// LINE webhook endpoint
///
/// The signature is checked over the raw body bytes before anything is
/// parsed or any work is done. LINE retries deliveries that do not get a
/// 2xx, so processing failures surface as 500.
async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = headers
        .get("x-line-signature")
        .and_then(|value| value.to_str().ok());

    let Some(signature) = signature else {
        warn!("callback without signature header");
        return (StatusCode::BAD_REQUEST, "missing signature");
    };

    if !verify_signature(&state.channel_secret, &body, signature) {
        warn!("callback with invalid signature");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("undecodable webhook payload: {err}");
            return (StatusCode::BAD_REQUEST, "invalid payload");
        }
    };

    for event in &payload.events {
        let Some((user_id, reply_token, text)) = event.as_text_message() else {
            continue;
        };

        let reply = match state.pipeline.handle(user_id, text).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(user_id, "failed to handle message: {err}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "processing failed");
            }
        };

        if let Err(err) = state.line.reply(reply_token, &reply).await {
            error!(user_id, "failed to send reply: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "reply failed");
        }
    }

    (StatusCode::OK, "OK")
}
