//! HTTP surface of the bot: liveness, the OAuth redirect, and the Glip webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::types::{ChatMessage, Void, WebhookPayload},
    interaction::chat_message::handle_chat_message,
    runtime::Runtime,
};

/// Header carrying the shared secret on every webhook call.
pub const VERIFICATION_TOKEN_HEADER: &str = "verification-token";

/// Header Glip sends while registering the webhook; it must be echoed back.
pub const VALIDATION_TOKEN_HEADER: &str = "validation-token";

/// Build the router for the bot.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/oauth", get(oauth))
        .route("/webhook", post(webhook))
        .with_state(runtime)
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "Error": message }))).into_response()
}

async fn index() -> &'static str {
    "Hi, Bot is working!"
}

#[derive(Debug, Deserialize)]
struct OAuthQuery {
    code: Option<String>,
}

#[instrument(skip_all)]
async fn oauth(State(runtime): State<Runtime>, Query(query): Query<OAuthQuery>) -> Response {
    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        warn!("OAuth redirect without a code.");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Looks like we're not getting code.");
    };

    match complete_oauth(&runtime, &code).await {
        Ok(()) => info!("Authorized the bot."),
        Err(err) => error!("Failed to authorize the bot: {:#}", err),
    }

    "ok".into_response()
}

/// Exchange the code, persist the credential, and learn who the bot is.
async fn complete_oauth(runtime: &Runtime, code: &str) -> Void {
    let credential = runtime.chat.login(code, &runtime.config.oauth_redirect_uri()).await?;

    if let Err(err) = runtime.store.save_json(&runtime.config.credential_key, &credential).await {
        error!("Failed to store the token: {}", err);
    }

    runtime.refresh_identity().await
}

#[instrument(skip_all)]
async fn webhook(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Response {
    let token = headers.get(VERIFICATION_TOKEN_HEADER).and_then(|value| value.to_str().ok());

    if token != Some(runtime.config.glip_bot_verification_token.as_str()) {
        warn!("Webhook call with a bad verification token.");
        return json_error(StatusCode::BAD_REQUEST, "Bad Request.");
    }

    let message = parse_message(&body);
    let context = runtime.identity.snapshot().await;

    // Not awaited: the platform only needs the acknowledgement.
    handle_chat_message(message, context, runtime.intent.clone(), runtime.news.clone(), runtime.chat.clone());

    let mut response = "ok".into_response();

    if let Some(validation) = headers.get(VALIDATION_TOKEN_HEADER) {
        response.headers_mut().insert(VALIDATION_TOKEN_HEADER, validation.clone());
    }

    response
}

/// Lenient body parsing: anything unreadable is treated as "no message".
fn parse_message(body: &[u8]) -> Option<ChatMessage> {
    if body.is_empty() {
        return None;
    }

    match serde_json::from_slice::<WebhookPayload>(body) {
        Ok(payload) => payload.body,
        Err(err) => {
            debug!("Ignoring unreadable webhook body: {}", err);
            None
        }
    }
}

// Tests.
