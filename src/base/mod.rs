//! Core components, types, and utilities for the news bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System directives for LLM intent classification.
//! - Common types (chat messages, intents, news items, cards, credentials) and result handling.

pub mod config;
pub mod prompts;
pub mod types;
