use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Most recent messages delivered per room snapshot.
pub const ROOM_SNAPSHOT_LIMIT: usize = 100;
/// Most recent messages delivered per direct-thread snapshot.
pub const THREAD_SNAPSHOT_LIMIT: usize = 50;
/// Prefix of client-synthesized message ids. Store ids never carry it.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Who sent a message, as shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The conversation a message belongs to. Exactly one association exists
/// per message, so this is an enum rather than two optional ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Conversation {
    Room(String),
    Thread(String),
}

impl Conversation {
    pub fn id(&self) -> &str {
        match self {
            Conversation::Room(id) | Conversation::Thread(id) => id,
        }
    }

    /// Bound on the number of messages in one live snapshot.
    pub fn snapshot_limit(&self) -> usize {
        match self {
            Conversation::Room(_) => ROOM_SNAPSHOT_LIMIT,
            Conversation::Thread(_) => THREAD_SNAPSHOT_LIMIT,
        }
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversation::Room(id) => write!(f, "room:{}", id),
            Conversation::Thread(id) => write!(f, "thread:{}", id),
        }
    }
}

/// Delivery status of a message as seen by the local view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    #[default]
    Sent,
    Failed,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Pending => write!(f, "pending"),
            MessageStatus::Sent => write!(f, "sent"),
            MessageStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A chat message, either persisted by the store or synthesized locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub conversation: Conversation,
    #[serde(default)]
    pub status: MessageStatus,
    /// Idempotency token attached by the sending client and echoed by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

impl Message {
    /// True for messages synthesized by this client and not yet replaced by
    /// the store's copy.
    pub fn is_local(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }

    /// Whether `server` is the store's echo of this local message.
    pub fn is_echoed_by(&self, server: &Message) -> bool {
        match (&self.client_token, &server.client_token) {
            (Some(local), Some(remote)) => local == remote,
            _ => self.sender.id == server.sender.id && self.text == server.text,
        }
    }
}

/// A message on its way to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub conversation: Conversation,
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomVisibility {
    #[default]
    Public,
    Private,
}

/// A community chat room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub visibility: RoomVisibility,
    #[serde(default)]
    pub ai_assistant: bool,
    pub created_by: String,
    pub members: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// A persistent conversation between exactly two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectThread {
    pub id: String,
    pub participants: [String; 2],
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Teacher,
}

/// The signed-in user held by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl User {
    /// Name shown in chat: the profile name, or the local part of the email.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn avatar_url(&self) -> String {
        format!("https://picsum.photos/seed/{}/40/40", self.email)
    }

    /// Sender identity attached to outgoing messages.
    pub fn as_sender(&self) -> Sender {
        Sender {
            id: self.id.clone(),
            name: self.display_name(),
            avatar: Some(self.avatar_url()),
        }
    }
}

/// Up to two initials for an avatar fallback, "U" when there is no name.
pub fn initials(name: Option<&str>) -> String {
    let words: Vec<&str> = name.unwrap_or_default().split_whitespace().collect();
    let first_char = |w: &str| w.chars().next().map(|c| c.to_uppercase().to_string());
    match words.as_slice() {
        [] => "U".to_string(),
        [only] => first_char(*only).unwrap_or_else(|| "U".to_string()),
        [first, .., last] => format!(
            "{}{}",
            first_char(*first).unwrap_or_default(),
            first_char(*last).unwrap_or_default()
        ),
    }
}
