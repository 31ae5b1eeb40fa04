//! Business logic for ProperBot.
//!
//! This crate defines the trait seams (`LlmProvider`, `ChatRepository`,
//! `ListingSource`, `ListingCache`, `Tool`) and the structured-chat agent
//! that ties them together. Infrastructure implementations live in
//! properbot-infra; this crate never performs I/O itself.

pub mod agent;
pub mod chat;
pub mod listing;
pub mod llm;
pub mod memory;
pub mod tool;
