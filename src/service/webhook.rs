//! HTTP surface of the bot: the Slack events endpoint and a health check.
//!
//! Slack expects a 2xx for every delivery it should not retry, so anything
//! that is not a client error, a bad signature or an upstream failure is
//! acknowledged with `200 {}`.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{FixedOffset, Local, NaiveDate, Utc};
use serde_json::json;
use slack_morphism::{prelude::SlackSigningSecret, signature_verifier::SlackEventSignatureVerifier};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        catalog::Catalog,
        config::Config,
        error::HandlerError,
        types::{Res, Void},
    },
    interaction::event::{self, Outcome},
    service::chat::ChatClient,
};

/// Source of "today" for the weekend branch.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// A clock reading the server's local date.
pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

/// A clock reading the date at a fixed UTC offset.
pub fn offset_clock(offset_hours: i32) -> Res<Clock> {
    let offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| anyhow::anyhow!("Invalid UTC offset: {} hours.", offset_hours))?;

    Ok(Arc::new(move || Utc::now().with_timezone(&offset).date_naive()))
}

/// A clock that always returns `date`.
pub fn fixed_clock(date: NaiveDate) -> Clock {
    Arc::new(move || date)
}

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    chat: ChatClient,
    catalog: Arc<Catalog>,
    clock: Clock,
    verifier: Option<Arc<SlackEventSignatureVerifier>>,
}

impl WebhookState {
    pub fn new(chat: ChatClient, catalog: Arc<Catalog>) -> Self {
        Self {
            chat,
            catalog,
            clock: local_clock(),
            verifier: None,
        }
    }

    /// Use `clock` to decide the current day.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Require a valid Slack signature on every request.
    pub fn with_signing_secret(mut self, secret: &str) -> Self {
        let secret = SlackSigningSecret(secret.to_string());
        self.verifier = Some(Arc::new(SlackEventSignatureVerifier::new(&secret)));
        self
    }
}

/// Build the router serving the events endpoint at `events_path`.
pub fn router(state: WebhookState, events_path: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(events_path, post(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C.
#[instrument(skip_all)]
pub async fn serve(config: &Config, state: WebhookState) -> Void {
    let address = config.bind_address()?;
    let app = router(state, &config.events_path);

    let listener = TcpListener::bind(address).await?;
    info!("Listening for Slack events on http://{}{} ...", address, config.events_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }

            info!("Shutting down ...");
        })
        .await?;

    Ok(())
}

// Handlers.

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn events(State(state): State<WebhookState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(verifier) = &state.verifier
        && let Err(reason) = verify_signature(verifier, &headers, &body)
    {
        warn!("Rejecting request with a bad signature: {}", reason);
        return (StatusCode::UNAUTHORIZED, "Invalid request signature").into_response();
    }

    let today = (state.clock)();

    match event::handle_event(&body, today, &state.chat, &state.catalog).await {
        Ok(Outcome::Challenge(challenge)) => Json(json!({ "challenge": challenge })).into_response(),
        Ok(Outcome::Handled) => Json(json!({})).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Map a handler error to the response Slack sees.
pub fn error_response(err: &HandlerError) -> Response {
    let status = if err.is_idempotent() {
        StatusCode::OK
    } else if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, err.to_string()).into_response()
}

fn verify_signature(verifier: &SlackEventSignatureVerifier, headers: &HeaderMap, body: &[u8]) -> Result<(), String> {
    let hash = header(headers, SlackEventSignatureVerifier::SLACK_SIGNED_HASH_HEADER)?;
    let timestamp = header(headers, SlackEventSignatureVerifier::SLACK_SIGNED_TIMESTAMP)?;
    let body = std::str::from_utf8(body).map_err(|e| format!("body is not UTF-8: {}", e))?;

    verifier.verify(hash, body, timestamp).map_err(|e| e.to_string())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, String> {
    headers.get(name).and_then(|v| v.to_str().ok()).ok_or_else(|| format!("missing `{}` header", name))
}
