//! Chat message handling for the news bot.
//!
//! This module provides functionality for reacting to Glip messages:
//! - Deciding whether a message is for the bot, and what it asks for
//! - Rendering news results into card attachments
//! - Posting the reply

pub mod cards;
pub mod chat_message;
