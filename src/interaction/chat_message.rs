//! Dispatching of inbound Glip chat messages.
//!
//! Every message is handled on its own detached task: the webhook acknowledges the
//! platform right away, and whatever happens here is only visible in the logs.

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, instrument};

use crate::{
    base::types::{ChatMessage, GlipPost, IntentAction, NewsResults, Void},
    interaction::cards,
    service::{chat::ChatClient, intent::IntentClient, news::NewsClient},
};

/// Liveness command answered without intent resolution.
pub const PING: &str = "ping";
pub const PONG: &str = "pong";

/// Read-only view of process state taken when a webhook arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchContext {
    /// The bot's own person ID, once known.
    pub bot_person_id: Option<String>,
}

impl DispatchContext {
    /// Whether `creator_id` is the bot itself.
    pub fn is_self(&self, creator_id: &str) -> bool {
        self.bot_person_id.as_deref() == Some(creator_id)
    }
}

/// Handles a chat message.
///
/// This spawns a new task so the caller never waits on intent resolution, news search,
/// or posting. The handle is returned for callers that want to wait (tests).
#[instrument(skip_all)]
pub fn handle_chat_message(message: Option<ChatMessage>, context: DispatchContext, intent: IntentClient, news: NewsClient, chat: ChatClient) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            // Process the message.
            let result = handle_chat_message_internal(message, &context, &intent, &news, &chat).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {:#}", err);
            }
        }
        .in_current_span(),
    )
}

#[instrument(skip_all)]
async fn handle_chat_message_internal(message: Option<ChatMessage>, context: &DispatchContext, intent: &IntentClient, news: &NewsClient, chat: &ChatClient) -> Void {
    let Some(message) = message else {
        debug!("Webhook carried no message.");
        return Ok(());
    };

    if context.is_self(&message.creator_id) {
        debug!("Skipping message authored by the bot.");
        return Ok(());
    }

    if !message.is_text() {
        debug!("Skipping `{}` message.", message.kind);
        return Ok(());
    }

    info!("Message from Glip: {}", message.text);

    if message.text == PING {
        send_reply(chat, &GlipPost::text(&message.group_id, PONG)).await;
        return Ok(());
    }

    // Classify the message.

    let Some(intent) = intent.resolve(&message.text, &message.group_id).await else {
        return Ok(());
    };

    info!("Resolved action `{:?}` with parameters {:?}", intent.action, intent.parameters);

    // Fetch the news.

    let (title, results): (String, NewsResults) = match intent.action {
        IntentAction::SearchNews => {
            let query = intent.free_text();
            let results = news.search_news(query.as_deref().unwrap_or_default()).await?;

            let title = match &query {
                Some(query) => format!("Related News about {query}:"),
                None => "Related News".to_string(),
            };

            (title, results)
        }
        IntentAction::TopNews => {
            let category = intent.free_text();
            let results = news.fetch_top_news(category.as_deref().unwrap_or_default()).await?;

            ("Current Top News:".to_string(), results)
        }
        IntentAction::TrendingTopics => {
            let results = news.fetch_trending_topics().await?;

            ("Trending topics:".to_string(), results)
        }
        IntentAction::None => {
            debug!("No action for message.");
            return Ok(());
        }
    };

    // Reply with the cards.

    let post = GlipPost {
        group_id: message.group_id,
        text: cards::header(&title, results.link.as_deref()),
        attachments: cards::to_cards(&results.news),
    };

    send_reply(chat, &post).await;

    Ok(())
}

/// Send a post, logging (not returning) any failure.
async fn send_reply(chat: &ChatClient, post: &GlipPost) {
    match chat.send_post(post).await {
        Ok(()) => info!("Sent to `{}` successfully.", post.group_id),
        Err(err) => error!("Failed to send to `{}`: {:#}", post.group_id, err),
    }
}

// Tests.
