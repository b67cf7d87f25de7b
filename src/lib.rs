//! Library root for `glip-news-bot`.
//!
//! The news bot is a Glip (RingCentral) chat bot that answers news questions:
//! - Searches news for a topic ("any news about cats?")
//! - Lists the current top news, optionally for a category
//! - Lists trending topics
//!
//! Free text is classified by an NLU service (api.ai or OpenAI) or, alternatively, by
//! literal command prefixes. Results come from Bing News and are posted back as cards.
//! The OAuth credential is kept in SurrealDB so the bot survives restarts.
//! Every service sits behind a trait so implementations can be swapped and mocked.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the bot:
/// - Installs the crypto provider
/// - Creates the runtime context with the store, news, intent, and chat clients
/// - Restores any stored session and serves HTTP until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting glip-news-bot ...");

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
