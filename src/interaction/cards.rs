//! Formatting of news items into Glip card attachments.

use crate::base::types::{Card, CardAuthor, CardFootnote, NewsItem};

/// Most cards sent in a single reply.
pub const MAX_CARDS: usize = 5;

/// Map news items onto cards, keeping source order and at most [`MAX_CARDS`].
pub fn to_cards(news: &[NewsItem]) -> Vec<Card> {
    news.iter().take(MAX_CARDS).map(to_card).collect()
}

/// Map one news item onto a card.
pub fn to_card(item: &NewsItem) -> Card {
    let link = item.url.as_deref().or(item.web_search_url.as_deref()).or(item.read_link.as_deref());

    let fallback = match link {
        Some(link) => format!("[{}]({})", item.name, link),
        None => item.name.clone(),
    };

    let image_uri = item.image.as_ref().and_then(|image| image.content_url.clone().or_else(|| image.url.clone()));

    Card {
        kind: "Card".to_string(),
        fallback,
        text: item.description.clone(),
        image_uri,
        author: CardAuthor {
            name: item.name.clone(),
            uri: item.url.clone(),
        },
        footnote: item.date_published.clone().map(|time| CardFootnote { time: Some(time) }),
    }
}

/// Render a reply header, as a markdown link when there is somewhere to link to.
pub fn header(title: &str, link: Option<&str>) -> String {
    match link {
        Some(link) if !link.is_empty() => format!("[{title}]({link})"),
        _ => title.to_string(),
    }
}

// Tests.
