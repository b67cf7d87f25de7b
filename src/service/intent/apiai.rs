//! api.ai (Dialogflow v1) implementation of the intent client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{Intent, IntentAction, Res},
};

use super::{GenericIntentClient, IntentClient};

/// Protocol version pinned by the v1 API.
const API_AI_PROTOCOL_VERSION: &str = "20150910";

// Extra methods on `IntentClient` applied by the api.ai implementation.

impl IntentClient {
    pub fn api_ai(config: &Config) -> Self {
        let client = ApiAiIntentClient::new(&config.api_ai_endpoint, &config.api_ai_token, &config.api_ai_lang);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiAiQuery<'a> {
    query: &'a str,
    session_id: &'a str,
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiAiResponse {
    result: Option<ApiAiResult>,
    status: Option<ApiAiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiAiResult {
    #[serde(default)]
    action: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAiStatus {
    code: u16,
    #[serde(default)]
    error_type: String,
    error_details: Option<String>,
}

// Structs.

/// api.ai intent client.
#[derive(Clone)]
pub struct ApiAiIntentClient {
    http: Client,
    endpoint: String,
    token: String,
    lang: String,
}

impl ApiAiIntentClient {
    /// Create a new api.ai client against `endpoint` (e.g. `https://api.api.ai/v1`).
    pub fn new(endpoint: &str, token: &str, lang: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            lang: lang.to_string(),
        }
    }
}

#[async_trait]
impl GenericIntentClient for ApiAiIntentClient {
    #[instrument(name = "ApiAiIntentClient::resolve_intent", skip(self))]
    async fn resolve_intent(&self, text: &str, session_id: &str) -> Res<Intent> {
        let body = ApiAiQuery {
            query: text,
            session_id,
            lang: &self.lang,
        };

        let response = self
            .http
            .post(format!("{}/query", self.endpoint))
            .query(&[("v", API_AI_PROTOCOL_VERSION)])
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("api.ai request failed with status {status}: {body}"));
        }

        let response: ApiAiResponse = response.json().await?;

        if let Some(status) = response.status.as_ref().filter(|status| status.code != 200) {
            return Err(anyhow::anyhow!(
                "api.ai returned {} ({}): {}",
                status.code,
                status.error_type,
                status.error_details.as_deref().unwrap_or("no details")
            ));
        }

        let Some(result) = response.result else {
            debug!("api.ai response has no result.");
            return Ok(Intent::none());
        };

        debug!("api.ai resolved action `{}` with parameters {:?}", result.action, result.parameters);

        Ok(Intent {
            action: IntentAction::from_action(&result.action),
            parameters: result.parameters,
        })
    }
}

// Tests.
