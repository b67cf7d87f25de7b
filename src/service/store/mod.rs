pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

// Errors.

/// Errors raised by a token store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing is stored under the key.
    #[error("No data found with key `{0}`.")]
    NotFound(String),

    /// The backend failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The stored blob is not valid JSON for the requested type.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// Traits.

/// Generic key-value store for opaque JSON blobs.
///
/// The bot only ever keeps one entry (its OAuth credential), so there is no expiry,
/// versioning or concurrency control: the last writer wins.
#[async_trait]
pub trait GenericTokenStore: Send + Sync + 'static {
    /// Serialize `data` and store it under `key`, replacing any previous value.
    async fn save(&self, key: &str, data: &Value) -> StoreResult<()>;

    /// Load the value stored under `key`.
    ///
    /// Fails with [`StoreError::NotFound`] if nothing is stored there.
    async fn load(&self, key: &str) -> StoreResult<Value>;
}

// Structs.

/// Token store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<dyn GenericTokenStore>,
}

impl Deref for TokenStore {
    type Target = dyn GenericTokenStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TokenStore {
    pub fn new(inner: Arc<dyn GenericTokenStore>) -> Self {
        Self { inner }
    }

    /// Store any serializable value under `key`.
    pub async fn save_json<T: Serialize + Sync>(&self, key: &str, data: &T) -> StoreResult<()> {
        let value = serde_json::to_value(data)?;
        self.save(key, &value).await
    }

    /// Load the value under `key` as `T`.
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<T> {
        let value = self.load(key).await?;
        Ok(serde_json::from_value(value)?)
    }
}
