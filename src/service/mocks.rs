//! `mockall` doubles of the service traits, shared by the unit tests.

use async_trait::async_trait;
use mockall::mock;

use crate::{
    base::types::{Credential, GlipPost, Intent, NewsResults, Person, Res, Void},
    service::{chat::GenericChatClient, intent::GenericIntentClient, news::GenericNewsClient},
};

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn login(&self, code: &str, redirect_uri: &str) -> Res<Credential>;
        async fn set_credential(&self, credential: Credential);
        async fn get_current_person(&self) -> Res<Person>;
        async fn send_post(&self, post: &GlipPost) -> Void;
    }
}

mock! {
    pub News {}

    #[async_trait]
    impl GenericNewsClient for News {
        async fn fetch_top_news(&self, category: &str) -> Res<NewsResults>;
        async fn search_news(&self, query: &str) -> Res<NewsResults>;
        async fn fetch_trending_topics(&self) -> Res<NewsResults>;
    }
}

mock! {
    pub Resolver {}

    #[async_trait]
    impl GenericIntentClient for Resolver {
        async fn resolve_intent(&self, text: &str, session_id: &str) -> Res<Intent>;
    }
}
