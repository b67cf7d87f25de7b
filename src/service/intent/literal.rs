//! Literal command matching, for deployments without an NLU service.
//!
//! Recognized commands (case-insensitive):
//! - `search news <query>`
//! - `top news [<category>]`
//! - `trending`, `trending topics`, `trending news`

use std::sync::Arc;

use async_trait::async_trait;

use crate::base::types::{FREE_TEXT_PARAMETER, Intent, IntentAction, Res};

use super::{GenericIntentClient, IntentClient};

const SEARCH_NEWS_PREFIX: &str = "search news";
const TOP_NEWS_PREFIX: &str = "top news";
const TRENDING_COMMANDS: &[&str] = &["trending", "trending topics", "trending news"];

impl IntentClient {
    pub fn literal() -> Self {
        Self { inner: Arc::new(LiteralIntentClient) }
    }
}

/// Prefix-matching intent client.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiteralIntentClient;

impl LiteralIntentClient {
    /// Classify `text` without any I/O.
    pub fn classify(text: &str) -> Intent {
        let text = text.trim();

        if let Some(query) = strip_command(text, SEARCH_NEWS_PREFIX) {
            return with_free_text(IntentAction::SearchNews, query);
        }

        if let Some(category) = strip_command(text, TOP_NEWS_PREFIX) {
            return with_free_text(IntentAction::TopNews, category);
        }

        if TRENDING_COMMANDS.iter().any(|c| text.eq_ignore_ascii_case(c)) {
            return Intent::new(IntentAction::TrendingTopics);
        }

        Intent::none()
    }
}

#[async_trait]
impl GenericIntentClient for LiteralIntentClient {
    async fn resolve_intent(&self, text: &str, _session_id: &str) -> Res<Intent> {
        Ok(Self::classify(text))
    }
}

/// Strip `command` from the start of `text`, returning the (trimmed) remainder.
///
/// The command must be followed by whitespace or the end of the text, so `top newsletter`
/// is not `top news`.
fn strip_command<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let head = text.get(..command.len())?;
    if !head.eq_ignore_ascii_case(command) {
        return None;
    }

    let rest = &text[command.len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some(rest.trim())
}

fn with_free_text(action: IntentAction, text: &str) -> Intent {
    let intent = Intent::new(action);
    if text.is_empty() { intent } else { intent.with_parameter(FREE_TEXT_PARAMETER, text) }
}

// Tests.
