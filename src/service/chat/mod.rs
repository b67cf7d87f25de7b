pub mod glip;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Credential, GlipPost, Person, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with the chat platform:
/// authorizing the bot, learning who the bot is, and posting into conversations.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Exchange an OAuth authorization code for a credential.
    ///
    /// On success the credential becomes the one used for all later calls.
    async fn login(&self, code: &str, redirect_uri: &str) -> Res<Credential>;

    /// Install a previously stored credential.
    async fn set_credential(&self, credential: Credential);

    /// Get the person the current credential belongs to (i.e., the bot itself).
    async fn get_current_person(&self) -> Res<Person>;

    /// Post a message (with optional card attachments) to a group.
    async fn send_post(&self, post: &GlipPost) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
