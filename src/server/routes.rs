//! REST endpoints: the honeypot conversation API, health, and the demo page.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::engagement::{EngagementEngine, InboundEvent};

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const CHAT_PAGE: &str = include_str!("chat.html");

/// Shared state for the honeypot routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngagementEngine>,
    pub api_key: Arc<SecretString>,
}

impl AppState {
    pub fn new(engine: Arc<EngagementEngine>, api_key: SecretString) -> Self {
        Self {
            engine,
            api_key: Arc::new(api_key),
        }
    }
}

// ── Protocol ────────────────────────────────────────────────────────────

/// Inbound envelope. Only `sessionId` and `message.text` reach the engine.
///
/// Other fields callers send (`timestamp`, `metadata`) are accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotRequest {
    pub session_id: String,
    pub message: MessageEnvelope,
    #[serde(default)]
    pub conversation_history: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub sender: Option<String>,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HoneypotResponse {
    pub status: String,
    pub reply: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "detail": detail.into() }))).into_response()
}

// ── Handlers ────────────────────────────────────────────────────────────

/// POST /honeypot
async fn honeypot(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<HoneypotRequest>, JsonRejection>,
) -> Response {
    let authorized = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.api_key.expose_secret());
    if !authorized {
        warn!("Rejected request with missing or invalid API key");
        return error_response(StatusCode::UNAUTHORIZED, "Invalid API key");
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Malformed honeypot request");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if request.session_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "sessionId must not be empty");
    }

    debug!(
        session_id = %request.session_id,
        sender = request.message.sender.as_deref().unwrap_or("unknown"),
        history = request.conversation_history.len(),
        "Honeypot message received"
    );

    let outcome = state
        .engine
        .handle(InboundEvent::new(request.session_id, request.message.text))
        .await;

    Json(HoneypotResponse {
        status: "success".to_string(),
        reply: outcome.reply,
    })
    .into_response()
}

/// GET /health
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "scam-honeypot",
        "sessions": state.engine.sessions().len().await,
    }))
}

/// GET / (demo chat page).
async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// Build the honeypot router.
pub fn honeypot_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health))
        .route("/honeypot", post(honeypot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
