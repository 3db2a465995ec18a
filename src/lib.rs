//! chat-relay - authenticated chat endpoint backed by a hosted LLM
//!
//! `POST /api/chat` takes a conversation, forwards it to the completion
//! provider, buffers the streamed reply, stores the finished exchange in a
//! Redis-style key-value store, and answers with the reply as plain text.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod relay;
pub mod server;
pub mod storage;
pub mod utils;

pub use crate::config::Settings;
pub use crate::core::chat::{Chat, ChatMessage, Role};
pub use crate::error::{RelayError, RelayResult};
pub use crate::relay::{ChatRelay, ChatRequest};
pub use crate::server::{router, AppState};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
