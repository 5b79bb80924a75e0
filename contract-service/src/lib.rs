//! contract-service: turns a 30-day goal intake form into a commitment
//! contract by asking a chat-completion provider (OpenAI or OpenRouter).
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
