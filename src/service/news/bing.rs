//! Bing News (v7) implementation of the news client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::base::{
    config::Config,
    types::{NewsItem, NewsResults, Res},
};

use super::{GenericNewsClient, NewsClient};

/// Number of results requested from every endpoint.
pub const NEWS_COUNT: &str = "5";

/// Market requested from every endpoint.
pub const NEWS_MARKET: &str = "en-US";

/// Header carrying the subscription key.
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

// Extra methods on `NewsClient` applied by the bing implementation.

impl NewsClient {
    pub fn bing(config: &Config) -> Self {
        let client = BingNewsClient::new(&config.bing_news_endpoint, &config.bing_news_key);
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

/// The parts of a Bing News answer the bot cares about.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingNewsAnswer {
    #[serde(default)]
    value: Vec<NewsItem>,
    web_search_url: Option<String>,
    read_link: Option<String>,
}

/// Which "more results" link an endpoint reports.
#[derive(Debug, Clone, Copy)]
enum LinkKind {
    WebSearch,
    ReadLink,
    WebSearchOrReadLink,
}

impl BingNewsAnswer {
    fn into_results(self, link: LinkKind) -> NewsResults {
        let link = match link {
            LinkKind::WebSearch => self.web_search_url,
            LinkKind::ReadLink => self.read_link,
            LinkKind::WebSearchOrReadLink => self.web_search_url.or(self.read_link),
        };

        NewsResults { news: self.value, link }
    }
}

// Structs.

/// Bing News client.
#[derive(Clone)]
pub struct BingNewsClient {
    http: Client,
    endpoint: String,
    key: String,
}

impl BingNewsClient {
    /// Create a new Bing News client against `endpoint` (e.g. `https://api.cognitive.microsoft.com/bing/v7.0`).
    pub fn new(endpoint: &str, key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    /// Issue a GET to `path` with `query`, and normalize the answer.
    async fn get(&self, path: &str, query: &[(&str, &str)], link: LinkKind) -> Res<NewsResults> {
        let url = format!("{}{}", self.endpoint, path);

        let response = self.http.get(&url).header(SUBSCRIPTION_KEY_HEADER, &self.key).query(query).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Bing News returned {status} for `{path}`: {body}");
            return Ok(NewsResults::empty());
        }

        let answer: BingNewsAnswer = response.json().await?;
        debug!("Bing News returned {} items for `{path}`.", answer.value.len());

        Ok(answer.into_results(link))
    }
}

#[async_trait]
impl GenericNewsClient for BingNewsClient {
    #[instrument(name = "BingNewsClient::fetch_top_news", skip(self))]
    async fn fetch_top_news(&self, category: &str) -> Res<NewsResults> {
        let mut query = vec![("count", NEWS_COUNT), ("mkt", NEWS_MARKET), ("originalImg", "true")];
        if !category.is_empty() {
            query.push(("category", category));
        }

        self.get("/news", &query, LinkKind::WebSearch).await
    }

    #[instrument(name = "BingNewsClient::search_news", skip(self))]
    async fn search_news(&self, query: &str) -> Res<NewsResults> {
        let query = [("q", query), ("count", NEWS_COUNT), ("mkt", NEWS_MARKET), ("originalImg", "true")];

        self.get("/news/search", &query, LinkKind::ReadLink).await
    }

    #[instrument(name = "BingNewsClient::fetch_trending_topics", skip(self))]
    async fn fetch_trending_topics(&self) -> Res<NewsResults> {
        let query = [("mkt", NEWS_MARKET), ("count", NEWS_COUNT)];

        self.get("/news/trendingtopics", &query, LinkKind::WebSearchOrReadLink).await
    }
}

// Tests.
