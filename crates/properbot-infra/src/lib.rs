//! Infrastructure implementations for ProperBot.
//!
//! Concrete backends for the traits defined in properbot-core: SQLite
//! repositories, the OpenAI-compatible LLM provider, the harvest service
//! client, plus config and secret loading.

pub mod config;
pub mod harvest;
pub mod llm;
pub mod secret;
pub mod sqlite;
