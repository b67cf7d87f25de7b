//! Common types shared across the news bot.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

/// Application error type.
pub type Err = anyhow::Error;
/// Application result type.
pub type Res<T> = Result<T, Err>;
/// Result with no value.
pub type Void = Res<()>;

/// The message type Glip uses for plain chat text.
pub const TEXT_MESSAGE_TYPE: &str = "TextMessage";

/// The intent parameter that carries free text (search query or category).
pub const FREE_TEXT_PARAMETER: &str = "any";

// Inbound chat.

/// Envelope of a Glip webhook call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// The message, absent for subscription and other non-message events.
    #[serde(default)]
    pub body: Option<ChatMessage>,
}

/// A chat message delivered by the Glip webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message type, e.g. `TextMessage` or `PersonJoined`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// The conversation the message was posted in.
    #[serde(default)]
    pub group_id: String,
    /// The person who posted the message.
    #[serde(default)]
    pub creator_id: String,
}

impl ChatMessage {
    /// Whether this message carries user text (as opposed to e.g. a "PersonJoined" event).
    pub fn is_text(&self) -> bool {
        self.kind == TEXT_MESSAGE_TYPE
    }
}

// Intents.

/// The actions the bot knows how to carry out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentAction {
    /// Search news for a subject.
    SearchNews,
    /// List the current top news, optionally for a category.
    TopNews,
    /// List trending topics.
    TrendingTopics,
    /// Nothing the bot can act on.
    #[default]
    #[serde(other)]
    None,
}

impl IntentAction {
    /// Map a classifier action name onto a known action; anything unknown is `None`.
    pub fn from_action(action: &str) -> Self {
        match action {
            "search_news" => Self::SearchNews,
            "top_news" => Self::TopNews,
            "trending_topics" => Self::TrendingTopics,
            _ => Self::None,
        }
    }
}

/// A classified user purpose, with any parameters the classifier extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// What the person asked for.
    pub action: IntentAction,
    /// Parameters extracted by the classifier, keyed by name.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Intent {
    /// An intent for `action` without parameters.
    pub fn new(action: IntentAction) -> Self {
        Self { action, parameters: Map::new() }
    }

    /// An intent that asks for nothing.
    pub fn none() -> Self {
        Self::new(IntentAction::None)
    }

    /// Add a parameter.
    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    /// Get a parameter as text.
    ///
    /// NLU services return either a plain string or a list of strings; the first
    /// non-empty string wins. Empty values are treated as absent.
    pub fn parameter(&self, name: &str) -> Option<String> {
        match self.parameters.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Array(values) => values.iter().filter_map(Value::as_str).map(str::trim).find(|s| !s.is_empty()).map(str::to_string),
            _ => None,
        }
    }

    /// The free-text parameter (search query or category).
    pub fn free_text(&self) -> Option<String> {
        self.parameter(FREE_TEXT_PARAMETER)
    }
}

// News.

/// Image attached to a news article or trending topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsImage {
    /// Full-size image.
    pub content_url: Option<String>,
    /// Image page or thumbnail.
    pub url: Option<String>,
}

/// A news article or trending topic, as returned by Bing News.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Headline or topic name.
    #[serde(default)]
    pub name: String,
    /// Article URL.
    pub url: Option<String>,
    /// Bing search page for the item.
    pub web_search_url: Option<String>,
    /// API link for more results.
    pub read_link: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Attached image.
    pub image: Option<NewsImage>,
    /// Publication time as sent by Bing.
    pub date_published: Option<String>,
}

/// Normalized news response: the items plus a "more results" link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsResults {
    /// The items, in source order.
    pub news: Vec<NewsItem>,
    /// Where to find more results, if anywhere.
    pub link: Option<String>,
}

impl NewsResults {
    /// No items and no link.
    pub fn empty() -> Self {
        Self::default()
    }
}

// Outbound chat.

/// Card author line.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAuthor {
    /// Display name.
    pub name: String,
    /// Link behind the name.
    pub uri: Option<String>,
}

/// Card footnote.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFootnote {
    /// Timestamp shown in the footnote.
    pub time: Option<String>,
}

/// A Glip card attachment.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Always `Card`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Markdown shown by clients that cannot render cards.
    pub fallback: String,
    /// Body text.
    pub text: Option<String>,
    /// Image URL.
    pub image_uri: Option<String>,
    /// Author line.
    pub author: CardAuthor,
    /// Footnote.
    pub footnote: Option<CardFootnote>,
}

/// A post to a Glip group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlipPost {
    /// Target conversation.
    pub group_id: String,
    /// Markdown text.
    pub text: String,
    /// Card attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Card>,
}

impl GlipPost {
    /// A plain-text post without attachments.
    pub fn text(group_id: &str, text: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            text: text.to_string(),
            attachments: Vec::new(),
        }
    }
}

/// A Glip person; the bot's own identity is one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Person ID.
    pub id: String,
    /// Other fields, kept as sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Credentials.

/// OAuth credential issued by the platform.
///
/// Fields the bot does not use are kept in `extra` so the stored blob round-trips intact.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Token type, normally `bearer`.
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Token used to get a new access token.
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires_in: Option<i64>,
    /// Granted scopes.
    pub scope: Option<String>,
    /// The extension that authorized the bot.
    pub owner_id: Option<String>,
    /// Platform endpoint ID.
    pub endpoint_id: Option<String>,
    /// When the platform issued this credential (set locally).
    pub issued_at: Option<DateTime<Utc>>,
    /// Other fields, kept as sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// Stamp the credential with its issue time.
    pub fn issued(mut self, now: DateTime<Utc>) -> Self {
        self.issued_at = Some(now);
        self
    }

    /// Whether the access token has expired.
    ///
    /// A credential without issue time or lifetime is assumed valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        expired(self.issued_at, self.expires_in, now)
    }

    /// Whether the refresh token can still be exchanged for a new access token.
    pub fn can_refresh(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty()) && !expired(self.issued_at, self.refresh_token_expires_in, now)
    }
}

fn expired(issued_at: Option<DateTime<Utc>>, lifetime_secs: Option<i64>, now: DateTime<Utc>) -> bool {
    // Treat tokens as expired a minute early to avoid racing the platform.
    const SKEW_SECS: i64 = 60;

    match (issued_at, lifetime_secs) {
        (Some(issued_at), Some(lifetime)) => issued_at + Duration::seconds(lifetime - SKEW_SECS) <= now,
        _ => false,
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_from_webhook_body() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "uuid": "1234",
            "event": "/restapi/v1.0/glip/posts",
            "body": {
                "id": "5678",
                "type": "TextMessage",
                "text": "ping",
                "groupId": "G1",
                "creatorId": "P1",
                "creationTime": "2018-01-01T00:00:00Z"
            }
        }))
        .unwrap();

        let message = payload.body.unwrap();
        assert!(message.is_text());
        assert_eq!(message.text, "ping");
        assert_eq!(message.group_id, "G1");
        assert_eq!(message.creator_id, "P1");
    }

    #[test]
    fn test_webhook_payload_without_body() {
        let payload: WebhookPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.body.is_none());
    }

    #[test]
    fn test_intent_action_from_action() {
        assert_eq!(IntentAction::from_action("search_news"), IntentAction::SearchNews);
        assert_eq!(IntentAction::from_action("top_news"), IntentAction::TopNews);
        assert_eq!(IntentAction::from_action("trending_topics"), IntentAction::TrendingTopics);
        assert_eq!(IntentAction::from_action("input.unknown"), IntentAction::None);
        assert_eq!(IntentAction::from_action(""), IntentAction::None);
    }

    #[test]
    fn test_intent_parameter_string_and_list() {
        let intent = Intent::new(IntentAction::SearchNews).with_parameter("any", "cats");
        assert_eq!(intent.free_text().as_deref(), Some("cats"));

        let intent = Intent::new(IntentAction::SearchNews).with_parameter("any", json!(["", "dogs", "cats"]));
        assert_eq!(intent.free_text().as_deref(), Some("dogs"));

        let intent = Intent::new(IntentAction::SearchNews).with_parameter("any", "  ");
        assert_eq!(intent.free_text(), None);

        assert_eq!(Intent::none().free_text(), None);
    }

    #[test]
    fn test_card_serialization_skips_missing_fields() {
        let card = Card {
            kind: "Card".to_string(),
            fallback: "[Title](https://example.com)".to_string(),
            text: None,
            image_uri: None,
            author: CardAuthor {
                name: "Title".to_string(),
                uri: None,
            },
            footnote: None,
        };

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Card",
                "fallback": "[Title](https://example.com)",
                "author": { "name": "Title" }
            })
        );
    }

    #[test]
    fn test_post_serialization() {
        let post = GlipPost::text("G1", "pong");
        assert_eq!(serde_json::to_value(&post).unwrap(), json!({ "groupId": "G1", "text": "pong" }));
    }

    #[test]
    fn test_credential_keeps_unknown_fields() {
        let raw = json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "refresh_token_expires_in": 604800,
            "owner_id": "42",
            "endpoint_id": "ep",
            "scope": "Glip",
            "custom": "kept"
        });

        let credential: Credential = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(credential.access_token, "at");
        assert_eq!(credential.extra.get("custom"), Some(&json!("kept")));
        assert_eq!(serde_json::to_value(&credential).unwrap(), raw);
    }

    #[test]
    fn test_credential_expiry() {
        let now = Utc::now();
        let credential = Credential {
            access_token: "at".to_string(),
            expires_in: Some(3600),
            refresh_token: Some("rt".to_string()),
            refresh_token_expires_in: Some(7200),
            ..Default::default()
        };

        // Without an issue time there is nothing to compare against.
        assert!(!credential.is_expired(now));

        let fresh = credential.clone().issued(now);
        assert!(!fresh.is_expired(now));
        assert!(fresh.can_refresh(now));

        let stale = credential.clone().issued(now - Duration::hours(1));
        assert!(stale.is_expired(now));
        assert!(stale.can_refresh(now));

        let dead = credential.issued(now - Duration::hours(3));
        assert!(dead.is_expired(now));
        assert!(!dead.can_refresh(now));
    }
}
