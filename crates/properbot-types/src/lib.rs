//! Shared domain types for ProperBot.
//!
//! This crate contains the domain types used across the ProperBot stack:
//! listings and structured queries, chat sessions, LLM request/response
//! shapes, agent actions, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror,
//! and schemars.

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod listing;
pub mod llm;
