use crate::agent::ChatAgent;
use crate::identity::uid_hash;
use crate::models::webhook::{ InboundMessage, Notification, VerifyParams, WebhookPayload };
use crate::server::dedupe::SeenMessages;
use crate::whatsapp::WhatsAppClient;
use axum::{
    routing::get,
    Router,
    extract::{ State, Query },
    response::IntoResponse,
    http::StatusCode,
    Json,
};
use log::{ error, info, warn };
use serde::Serialize;
use std::sync::Arc;

const RESET_COMMAND: &str = "/reset";
const RESET_REPLY: &str = "memory wiped";

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ChatAgent>,
    pub whatsapp: Arc<WhatsAppClient>,
    pub seen: Arc<SeenMessages>,
    pub verify_token: String,
    pub uid_salt: String,
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

fn status_response(code: StatusCode, status: &'static str) -> axum::response::Response {
    (code, Json(StatusBody { status })).into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_handler).post(inbound_handler))
        .with_state(state)
}

/// Meta's one-time subscription handshake: echo the challenge iff the
/// verify token matches.
async fn verify_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>
) -> impl IntoResponse {
    match verification_challenge(&params, &state.verify_token) {
        Some(challenge) => (StatusCode::OK, challenge),
        None => {
            warn!("Webhook verification rejected");
            (StatusCode::FORBIDDEN, "Forbidden".to_string())
        }
    }
}

fn verification_challenge(params: &VerifyParams, expected_token: &str) -> Option<String> {
    if params.mode.as_deref() != Some("subscribe") {
        return None;
    }
    if params.verify_token.as_deref() != Some(expected_token) {
        return None;
    }
    params.challenge.clone()
}

async fn inbound_handler(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>
) -> impl IntoResponse {
    let messages = match payload.extract() {
        Notification::Status => {
            return status_response(StatusCode::OK, "ignored_status");
        }
        Notification::Empty => {
            return status_response(StatusCode::OK, "no_message");
        }
        Notification::Messages(messages) => messages,
    };

    let mut processed_any = false;
    for message in &messages {
        if !state.seen.mark_seen_once(&message.message_id) {
            info!("Duplicate webhook delivery ignored");
            continue;
        }
        processed_any = true;

        if let Err(e) = process_message(&state, message).await {
            error!("Webhook processing failed: {}", e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR, "err");
        }
    }

    if processed_any {
        status_response(StatusCode::OK, "ok")
    } else {
        status_response(StatusCode::OK, "duplicate_ignored")
    }
}

async fn process_message(
    state: &AppState,
    message: &InboundMessage
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // The store is keyed by a salted hash, never the raw phone number.
    let uid = uid_hash(&state.uid_salt, &message.sender);

    if message.text.trim().eq_ignore_ascii_case(RESET_COMMAND) {
        state.agent.reset(&uid).await;
        deliver(state, &message.sender, RESET_REPLY).await;
        return Ok(());
    }

    let reply = state.agent.handle_message(&uid, &message.text).await?;
    deliver(state, &message.sender, &reply).await;
    Ok(())
}

/// Delivery failures are logged and swallowed: the webhook was processed
/// and Meta must not redeliver it.
async fn deliver(state: &AppState, recipient: &str, body: &str) {
    if let Err(e) = state.whatsapp.send(recipient, body).await {
        error!("Failed to deliver reply: {}", e);
    }
}
