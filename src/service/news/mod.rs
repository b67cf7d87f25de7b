pub mod bing;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{NewsResults, Res};

// Traits.

/// Generic news search trait that clients must implement.
///
/// Every call returns at most a handful of items plus a link to more results.
/// An upstream that answers with a non-success status yields an empty result rather
/// than an error; errors are reserved for transport and decoding failures.
#[async_trait]
pub trait GenericNewsClient: Send + Sync + 'static {
    /// Fetch the current top headlines, optionally restricted to a category (empty means all).
    async fn fetch_top_news(&self, category: &str) -> Res<NewsResults>;

    /// Search news articles matching `query`.
    async fn search_news(&self, query: &str) -> Res<NewsResults>;

    /// Fetch the topics currently trending.
    async fn fetch_trending_topics(&self) -> Res<NewsResults>;
}

// Structs.

/// News client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct NewsClient {
    inner: Arc<dyn GenericNewsClient>,
}

impl Deref for NewsClient {
    type Target = dyn GenericNewsClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl NewsClient {
    pub fn new(inner: Arc<dyn GenericNewsClient>) -> Self {
        Self { inner }
    }
}
