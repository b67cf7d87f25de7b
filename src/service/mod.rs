//! Service integrations for external APIs and clients.
//!
//! This module contains the services used by the news bot:
//! - Chat services (Glip)
//! - Intent resolution (api.ai, OpenAI, literal commands)
//! - News search (Bing News)
//! - Token storage (SurrealDB)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod intent;
pub mod news;
pub mod store;

#[cfg(test)]
pub(crate) mod mocks;
