//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{Res, Void};

/// Default RingCentral platform server.
fn default_glip_api_server() -> String {
    "https://platform.ringcentral.com".to_string()
}

/// Default Bing News v7 endpoint.
fn default_bing_news_endpoint() -> String {
    "https://api.cognitive.microsoft.com/bing/v7.0".to_string()
}

/// Default api.ai (Dialogflow v1) endpoint.
fn default_api_ai_endpoint() -> String {
    "https://api.api.ai/v1".to_string()
}

/// Default api.ai language.
fn default_api_ai_lang() -> String {
    "en".to_string()
}

/// Default OpenAI intent model to use.
fn default_openai_intent_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default sampling temperature for the OpenAI intent model.
fn default_openai_intent_temperature() -> f32 {
    0.0
}

/// Default max output tokens for the OpenAI intent model.
fn default_openai_max_tokens() -> u32 {
    1024
}

/// Default system directive for the intent agent.
fn default_intent_agent_system_directive() -> String {
    prompts::INTENT_AGENT_SYSTEM_DIRECTIVE.to_string()
}

fn default_store_endpoint() -> String {
    "mem://".to_string()
}

fn default_store_namespace() -> String {
    "news".to_string()
}

fn default_store_database() -> String {
    "bot".to_string()
}

/// Default key of the stored OAuth credential.
fn default_credential_key() -> String {
    "rc-oauth-token".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// How inbound text is turned into an intent.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStrategy {
    /// Classify text with the configured NLU service.
    #[default]
    Intent,
    /// Match literal command prefixes (`search news ...`, `top news`, `trending`).
    Literal,
}

/// Which NLU service backs the `intent` strategy.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntentProvider {
    /// api.ai (Dialogflow v1) agent.
    #[default]
    ApiAi,
    /// OpenAI Responses API with a structured output schema.
    OpenAi,
}

/// Configuration for the news bot.
#[derive(Debug, Clone)]
pub struct Config {
    /// The inner configuration.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Inner configuration for the news bot.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Glip app client ID (`NEWS_BOT_GLIP_CLIENT_ID`).
    pub glip_client_id: String,
    /// Glip app client secret (`NEWS_BOT_GLIP_CLIENT_SECRET`).
    pub glip_client_secret: String,
    /// RingCentral platform server (`NEWS_BOT_GLIP_API_SERVER`).
    #[serde(default = "default_glip_api_server")]
    pub glip_api_server: String,
    /// Public base URL of this bot; the OAuth redirect is `{glip_bot_server}/oauth` (`NEWS_BOT_GLIP_BOT_SERVER`).
    pub glip_bot_server: String,
    /// Shared secret Glip sends in the `verification-token` header (`NEWS_BOT_GLIP_BOT_VERIFICATION_TOKEN`).
    pub glip_bot_verification_token: String,
    /// Bing News subscription key (`NEWS_BOT_BING_NEWS_KEY`).
    pub bing_news_key: String,
    /// Bing News endpoint (`NEWS_BOT_BING_NEWS_ENDPOINT`).
    #[serde(default = "default_bing_news_endpoint")]
    pub bing_news_endpoint: String,
    /// How messages are classified (`NEWS_BOT_DISPATCH_STRATEGY`): `intent` or `literal`.
    #[serde(default)]
    pub dispatch_strategy: DispatchStrategy,
    /// NLU backend for the `intent` strategy (`NEWS_BOT_INTENT_PROVIDER`): `apiai` or `openai`.
    #[serde(default)]
    pub intent_provider: IntentProvider,
    /// api.ai client access token (`NEWS_BOT_API_AI_TOKEN`).
    #[serde(default)]
    pub api_ai_token: String,
    /// api.ai endpoint (`NEWS_BOT_API_AI_ENDPOINT`).
    #[serde(default = "default_api_ai_endpoint")]
    pub api_ai_endpoint: String,
    /// api.ai query language (`NEWS_BOT_API_AI_LANG`).
    #[serde(default = "default_api_ai_lang")]
    pub api_ai_lang: String,
    /// OpenAI API key (`NEWS_BOT_OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI intent model to use (`NEWS_BOT_OPENAI_INTENT_MODEL`).
    #[serde(default = "default_openai_intent_model")]
    pub openai_intent_model: String,
    /// Sampling temperature for the OpenAI intent model (`NEWS_BOT_OPENAI_INTENT_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_openai_intent_temperature")]
    pub openai_intent_temperature: f32,
    /// Max output tokens for the OpenAI intent model (`NEWS_BOT_OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Optional custom intent agent directive to override the default (`NEWS_BOT_INTENT_AGENT_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_intent_agent_system_directive")]
    pub intent_agent_system_directive: String,
    /// Token store connection URL (`NEWS_BOT_STORE_ENDPOINT`), e.g. `mem://` or `ws://localhost:8000`.
    #[serde(default = "default_store_endpoint")]
    pub store_endpoint: String,
    /// Token store root username (`NEWS_BOT_STORE_USERNAME`); sign-in is skipped when empty.
    #[serde(default)]
    pub store_username: String,
    /// Token store root password (`NEWS_BOT_STORE_PASSWORD`).
    #[serde(default)]
    pub store_password: String,
    /// Token store namespace (`NEWS_BOT_STORE_NAMESPACE`).
    #[serde(default = "default_store_namespace")]
    pub store_namespace: String,
    /// Token store database (`NEWS_BOT_STORE_DATABASE`).
    #[serde(default = "default_store_database")]
    pub store_database: String,
    /// Key under which the OAuth credential is stored (`NEWS_BOT_CREDENTIAL_KEY`).
    #[serde(default = "default_credential_key")]
    pub credential_key: String,
    /// Listen host (`NEWS_BOT_HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (`NEWS_BOT_PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    /// Load the configuration from the environment and an optional TOML file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("NEWS_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the values `serde` cannot check on its own.
    pub fn validate(&self) -> Void {
        if self.openai_intent_temperature < 0.0 || self.openai_intent_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI intent temperature must be between 0 and 2."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if self.dispatch_strategy == DispatchStrategy::Intent {
            match self.intent_provider {
                IntentProvider::ApiAi if self.api_ai_token.is_empty() => {
                    return Err(anyhow::anyhow!("An api.ai token is required when the `apiai` intent provider is selected."));
                }
                IntentProvider::OpenAi if self.openai_api_key.is_empty() => {
                    return Err(anyhow::anyhow!("An OpenAI API key is required when the `openai` intent provider is selected."));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Where the platform sends the user after authorizing the bot.
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/oauth", self.glip_bot_server.trim_end_matches('/'))
    }
}

// Tests.
