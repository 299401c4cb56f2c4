//! Chat storage module
//!
//! Provides the JSON-file implementation of the document store.

pub mod json_store;

pub use json_store::{ConversationData, ConversationUpdate, Header, JsonChatStore, UpdateChannel};
