//! SurrealDB implementation of the token store.
//!
//! The `any` engine lets the connection URL pick the backend: `mem://` keeps the
//! store in-process (handy for tests and single-shot deployments), `ws://` or `wss://`
//! talks to a SurrealDB server so the credential survives restarts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{config::Config, types::Res};

use super::{GenericTokenStore, StoreError, StoreResult, TokenStore};

/// Table holding the stored blobs.
const TOKEN_TABLE: &str = "token";

// Extra methods on `TokenStore` applied by the surreal implementation.

impl TokenStore {
    /// Connect to the SurrealDB instance described by the configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealTokenStore::new(
            &config.store_endpoint,
            &config.store_username,
            &config.store_password,
            &config.store_namespace,
            &config.store_database,
        )
        .await?;

        Ok(Self { inner: Arc::new(client) })
    }

    /// Create an in-memory store.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealTokenStore::new("mem://", "", "", "news", "bot").await?;

        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// A stored blob; `data` is the JSON-serialized value.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<surrealdb::sql::Thing>,
    data: String,
}

/// SurrealDB token store.
#[derive(Clone)]
pub struct SurrealTokenStore {
    db: Surreal<Any>,
}

impl SurrealTokenStore {
    /// Connect, sign in (when a username is given), and select the namespace and database.
    #[instrument(name = "SurrealTokenStore::new", skip(username, password))]
    pub async fn new(endpoint: &str, username: &str, password: &str, namespace: &str, database: &str) -> Res<Self> {
        let db = any::connect(endpoint).await?;

        if !username.is_empty() {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(namespace).use_db(database).await?;

        info!("Token store initialized successfully.");

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericTokenStore for SurrealTokenStore {
    #[instrument(skip(self, data))]
    async fn save(&self, key: &str, data: &Value) -> StoreResult<()> {
        let record = TokenRecord {
            id: None,
            data: serde_json::to_string(data)?,
        };

        let _: Option<TokenRecord> = self
            .db
            .upsert((TOKEN_TABLE, key))
            .content(record)
            .await
            .map_err(|e| StoreError::Storage(format!("Fail to save data with key `{key}`: {e}")))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> StoreResult<Value> {
        let record: Option<TokenRecord> = self
            .db
            .select((TOKEN_TABLE, key))
            .await
            .map_err(|e| StoreError::Storage(format!("Fail to load data with key `{key}`: {e}")))?;

        let record = record.ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        Ok(serde_json::from_str(&record.data)?)
    }
}

// Tests.
