//! Runtime services and shared state for the news bot.

use std::sync::Arc;

use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Credential, Person, Res, Void},
    },
    interaction::chat_message::DispatchContext,
    server,
    service::{
        chat::ChatClient,
        intent::IntentClient,
        news::NewsClient,
        store::{StoreError, TokenStore},
    },
};

/// The bot's own identity, learned after authorization.
///
/// Written at startup and on re-authorization; webhook calls only ever read a snapshot.
#[derive(Clone, Default)]
pub struct BotIdentity {
    inner: Arc<RwLock<Option<Person>>>,
}

impl BotIdentity {
    pub async fn set(&self, person: Person) {
        *self.inner.write().await = Some(person);
    }

    /// Take a read-only view for a single dispatch.
    pub async fn snapshot(&self) -> DispatchContext {
        DispatchContext {
            bot_person_id: self.inner.read().await.as_ref().map(|person| person.id.clone()),
        }
    }
}

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and every service client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// Where the OAuth credential is persisted.
    pub store: TokenStore,
    /// The news search client.
    pub news: NewsClient,
    /// The intent resolver selected by configuration.
    pub intent: IntentClient,
    /// The Glip chat client.
    pub chat: ChatClient,
    /// Who the bot is, once known.
    pub identity: BotIdentity,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the token store.
        let store = TokenStore::surreal(&config).await?;

        // Initialize the news client.
        let news = NewsClient::bing(&config);

        // Initialize the intent resolver.
        let intent = IntentClient::from_config(&config);

        // Initialize the chat client.
        let chat = ChatClient::glip(&config, store.clone());

        Ok(Self {
            config,
            store,
            news,
            intent,
            chat,
            identity: BotIdentity::default(),
        })
    }

    /// Pick up a credential stored by an earlier run, if any.
    ///
    /// Nothing here is fatal: the bot keeps serving unauthenticated until `/oauth` completes.
    #[instrument(skip_all)]
    pub async fn restore_session(&self) {
        let credential = match self.store.load_json::<Credential>(&self.config.credential_key).await {
            Ok(credential) => credential,
            Err(StoreError::NotFound(_)) => {
                info!("Token not found.");
                return;
            }
            Err(err) => {
                warn!("Failed to load the stored token: {}", err);
                return;
            }
        };

        self.chat.set_credential(credential).await;

        if let Err(err) = self.refresh_identity().await {
            warn!("Failed to fetch the bot identity: {:#}", err);
        }
    }

    /// Ask the platform who the bot is and remember it.
    #[instrument(skip_all)]
    pub async fn refresh_identity(&self) -> Void {
        let person = self.chat.get_current_person().await?;
        info!("Bot identity is `{}`.", person.id);

        self.identity.set(person).await;

        Ok(())
    }

    /// Restore the session and serve HTTP until Ctrl-C.
    pub async fn start(&self) -> Void {
        self.restore_session().await;

        let app = server::router(self.clone());

        let address = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&address).await?;
        info!("Listening on {address} ...");

        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        info!("Shut down.");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", err);
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        base::config::ConfigInner,
        service::mocks::{MockChat, MockNews, MockResolver},
    };

    async fn runtime_with(chat: MockChat) -> Runtime {
        let config = Config {
            inner: Arc::new(ConfigInner {
                credential_key: "rc-oauth-token".to_string(),
                ..Default::default()
            }),
        };

        Runtime {
            config,
            store: TokenStore::surreal_memory().await.unwrap(),
            news: NewsClient::new(Arc::new(MockNews::new())),
            intent: IntentClient::new(Arc::new(MockResolver::new())),
            chat: ChatClient::new(Arc::new(chat)),
            identity: BotIdentity::default(),
        }
    }

    fn person(id: &str) -> Person {
        Person {
            id: id.to_string(),
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_snapshot_follows_identity() {
        let identity = BotIdentity::default();
        assert_eq!(identity.snapshot().await.bot_person_id, None);

        identity.set(person("bot-1")).await;
        assert_eq!(identity.snapshot().await.bot_person_id.as_deref(), Some("bot-1"));
    }

    #[tokio::test]
    async fn test_restore_without_stored_token() {
        // No credential means no platform calls at all.
        let runtime = runtime_with(MockChat::new()).await;

        runtime.restore_session().await;

        assert_eq!(runtime.identity.snapshot().await.bot_person_id, None);
    }

    #[tokio::test]
    async fn test_restore_with_stored_token() {
        let mut chat = MockChat::new();
        chat.expect_set_credential().withf(|credential| credential.access_token == "stored").times(1).return_const(());
        chat.expect_get_current_person().times(1).returning(|| Ok(person("bot-2")));

        let runtime = runtime_with(chat).await;
        let credential = Credential {
            access_token: "stored".to_string(),
            ..Default::default()
        };
        runtime.store.save_json("rc-oauth-token", &credential).await.unwrap();

        runtime.restore_session().await;

        assert_eq!(runtime.identity.snapshot().await.bot_person_id.as_deref(), Some("bot-2"));
    }

    #[tokio::test]
    async fn test_restore_survives_identity_failure() {
        let mut chat = MockChat::new();
        chat.expect_set_credential().times(1).return_const(());
        chat.expect_get_current_person().times(1).returning(|| Err(anyhow::anyhow!("401 Unauthorized")));

        let runtime = runtime_with(chat).await;
        runtime.store.save_json("rc-oauth-token", &Credential::default()).await.unwrap();

        runtime.restore_session().await;

        assert_eq!(runtime.identity.snapshot().await.bot_person_id, None);
    }
}
