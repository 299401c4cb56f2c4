//! Handlers for server

pub mod rooms;
pub mod solver;
pub mod subscribe;
pub mod teachers;
pub mod threads;

// Re-export AppState from config
pub use crate::config::AppState;

use crate::error::{Error, Result};
use axum::http::HeaderMap;
use mathfluent_core::{Conversation, OutgoingMessage, Sender};
use serde::Deserialize;

/// Body of a message post
#[derive(Debug, Deserialize)]
pub struct PostMessageInput {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub client_token: Option<String>,
}

impl PostMessageInput {
    pub fn into_outgoing(self, conversation: Conversation) -> OutgoingMessage {
        OutgoingMessage {
            conversation,
            sender: self.sender,
            text: self.text,
            client_token: self.client_token,
        }
    }
}

/// User id from the `x-user` header
pub fn current_user(headers: &HeaderMap) -> Result<String> {
    headers
        .get("x-user")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(Error::Unauthorized)
}
