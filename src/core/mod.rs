pub mod chat;
pub mod id;
pub mod llm;
pub mod prompt;
