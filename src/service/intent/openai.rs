//! OpenAI implementation of the intent client.
//!
//! The model is asked for a strict JSON object `{action, query}` and the answer is
//! mapped onto an [`Intent`] with the query in the free-text parameter.

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, ResponseFormatJsonSchema, Role, TextConfig, TextResponseFormat,
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    types::{FREE_TEXT_PARAMETER, Intent, IntentAction, Res},
};

use super::{GenericIntentClient, IntentClient};

// Extra methods on `IntentClient` applied by the openai implementation.

impl IntentClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiIntentClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Types.

/// The JSON object the model is asked to return.
#[derive(Debug, Deserialize)]
struct ClassifiedIntent {
    action: IntentAction,
    query: Option<String>,
}

impl From<ClassifiedIntent> for Intent {
    fn from(classified: ClassifiedIntent) -> Self {
        let intent = Intent::new(classified.action);

        match classified.query {
            Some(query) if !query.trim().is_empty() => intent.with_parameter(FREE_TEXT_PARAMETER, query.trim()),
            _ => intent,
        }
    }
}

// Specific implementations.

/// OpenAI intent client implementation.
#[derive(Clone)]
pub struct OpenAiIntentClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiIntentClient {
    /// Create a new OpenAI intent client.
    #[instrument(name = "OpenAiIntentClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the classification input.
    fn build_intent_input(&self, text: &str, session_id: &str) -> Res<Input> {
        Ok(Input::Items(vec![
            InputItem::Message(
                InputMessageArgs::default()
                    .role(Role::Developer)
                    .content(format!("## Conversation\n\n`{session_id}`\n\n"))
                    .build()?,
            ),
            InputItem::Message(InputMessageArgs::default().role(Role::User).content(format!("# Chat Message\n\n{text}\n\n")).build()?),
        ]))
    }

    /// Helper function to make OpenAI API calls with retry logic and timeout handling.
    async fn call_openai_api(&self, request_builder: CreateResponseArgs) -> Res<Response> {
        const MAX_RETRIES: u32 = 2;
        const TIMEOUT: u64 = 30;
        const RETRY_DELAY_MS: u64 = 500;

        let mut retries = 0;

        loop {
            let request = request_builder.build()?;
            let result = timeout(Duration::from_secs(TIMEOUT), self.client.responses().create(request)).await;

            match result {
                Ok(Ok(response)) => {
                    info!("OpenAI API call succeeded after {} attempts", retries + 1);
                    return Ok(response);
                }
                Ok(Err(err)) => {
                    if retries >= MAX_RETRIES {
                        return Err(anyhow::anyhow!("OpenAI API call failed after {MAX_RETRIES} retries: {err}"));
                    }
                    retries += 1;
                    warn!("OpenAI API call failed, retrying {retries}/{MAX_RETRIES}: {err}");

                    let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(retries - 1));
                    tokio::time::sleep(delay).await;
                }
                Err(_) => {
                    if retries >= MAX_RETRIES {
                        return Err(anyhow::anyhow!("OpenAI API call timed out after {MAX_RETRIES} attempts"));
                    }
                    retries += 1;
                    warn!("OpenAI API call timed out, retrying {retries}/{MAX_RETRIES}");

                    let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(retries - 1));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl GenericIntentClient for OpenAiIntentClient {
    #[instrument(name = "OpenAiIntentClient::resolve_intent", skip(self))]
    async fn resolve_intent(&self, text: &str, session_id: &str) -> Res<Intent> {
        let input = self.build_intent_input(text, session_id)?;

        let mut request = CreateResponseArgs::default();
        request
            .instructions(self.config.intent_agent_system_directive.clone())
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_intent_model)
            .text(get_openai_text_config().clone())
            .input(input);

        // Add the temperature for the non-reasoning models.
        if self.config.openai_intent_model.starts_with("gpt") {
            request.temperature(self.config.openai_intent_temperature);
        }

        let response = self.call_openai_api(request).await?;

        parse_openai_response(&response)
    }
}

/// Parse the first structured answer out of an OpenAI response.
#[instrument(skip_all)]
pub fn parse_openai_response(response: &Response) -> Res<Intent> {
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => {
                            let classified: ClassifiedIntent = serde_json::from_str(&text.text)?;
                            return Ok(classified.into());
                        }
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unknown output: {output:#?}");
            }
        }
    }

    Err(anyhow::anyhow!("OpenAI response contained no message."))
}

// Statics.

static OPENAI_TEXT_CONFIG: OnceLock<TextConfig> = OnceLock::new();

fn get_openai_text_config() -> &'static TextConfig {
    OPENAI_TEXT_CONFIG.get_or_init(|| TextConfig {
        format: TextResponseFormat::JsonSchema(ResponseFormatJsonSchema {
            name: "NewsBotIntent".to_string(),
            description: Some("Classified intent of a chat message sent to the news bot.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["search_news", "top_news", "trending_topics", "none"]
                    },
                    "query": { "type": ["string", "null"] }
                },
                "required": ["action", "query"],
                "additionalProperties": false
            })),
            strict: Some(true),
        }),
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> Intent {
        serde_json::from_str::<ClassifiedIntent>(raw).unwrap().into()
    }

    #[test]
    fn test_classified_search_carries_query() {
        let intent = classify(r#"{"action": "search_news", "query": " cats "}"#);
        assert_eq!(intent.action, IntentAction::SearchNews);
        assert_eq!(intent.free_text().as_deref(), Some("cats"));
    }

    #[test]
    fn test_classified_null_query() {
        let intent = classify(r#"{"action": "trending_topics", "query": null}"#);
        assert_eq!(intent, Intent::new(IntentAction::TrendingTopics));
    }

    #[test]
    fn test_classified_unknown_action_is_none() {
        let intent = classify(r#"{"action": "tell_joke", "query": null}"#);
        assert_eq!(intent.action, IntentAction::None);
    }

    #[test]
    fn test_text_config_is_strict_schema() {
        let TextResponseFormat::JsonSchema(schema) = &get_openai_text_config().format else {
            panic!("expected a JSON schema format");
        };

        assert_eq!(schema.strict, Some(true));
        assert!(schema.schema.as_ref().unwrap().to_string().contains("trending_topics"));
    }
}
