pub mod apiai;
pub mod literal;
pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tracing::{error, instrument};

use crate::base::{
    config::{Config, DispatchStrategy, IntentProvider},
    types::{Intent, Res},
};

// Traits.

/// Generic intent resolver trait that clients must implement.
///
/// This trait turns free chat text into an [`Intent`]. Implementing it allows different
/// NLU services (or no service at all) to drive the dispatcher.
#[async_trait]
pub trait GenericIntentClient: Send + Sync + 'static {
    /// Classify `text`.
    ///
    /// The `session_id` scopes conversational context (the bot uses the conversation's
    /// group ID), so follow-up questions in one conversation do not leak into another.
    async fn resolve_intent(&self, text: &str, session_id: &str) -> Res<Intent>;
}

// Structs.

/// Intent client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct IntentClient {
    inner: Arc<dyn GenericIntentClient>,
}

impl Deref for IntentClient {
    type Target = dyn GenericIntentClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl IntentClient {
    pub fn new(inner: Arc<dyn GenericIntentClient>) -> Self {
        Self { inner }
    }

    /// Build the resolver selected by the configured dispatch strategy and provider.
    pub fn from_config(config: &Config) -> Self {
        match (config.dispatch_strategy, config.intent_provider) {
            (DispatchStrategy::Literal, _) => Self::literal(),
            (DispatchStrategy::Intent, IntentProvider::ApiAi) => Self::api_ai(config),
            (DispatchStrategy::Intent, IntentProvider::OpenAi) => Self::openai(config),
        }
    }

    /// Resolve an intent, logging and swallowing any failure.
    ///
    /// `None` means "no actionable intent".
    #[instrument(skip(self))]
    pub async fn resolve(&self, text: &str, session_id: &str) -> Option<Intent> {
        match self.resolve_intent(text, session_id).await {
            Ok(intent) => Some(intent),
            Err(err) => {
                error!("Failed to resolve intent: {err:#}");
                None
            }
        }
    }
}
