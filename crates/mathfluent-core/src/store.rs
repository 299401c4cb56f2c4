//! The document store collaborator.

use crate::chat::{Snapshot, Subscription};
use crate::error::Result;
use crate::models::{ChatRoom, Conversation, DirectThread, Message, OutgoingMessage};
use crate::validation::ChatRoomForm;
use async_trait::async_trait;

/// Durable home of rooms, direct threads and their messages.
///
/// Snapshots are ordered by server timestamp ascending and bounded to the
/// most recent [`Conversation::snapshot_limit`] messages.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Create a room whose only member is its creator.
    async fn create_room(&self, form: &ChatRoomForm, creator_id: &str) -> Result<ChatRoom>;

    /// All rooms, newest first.
    async fn list_rooms(&self) -> Result<Vec<ChatRoom>>;

    /// Resolve the thread between two users, creating it on first use.
    async fn open_direct_thread(&self, user_a: &str, user_b: &str) -> Result<DirectThread>;

    /// Persist a message; the store assigns its id and timestamp.
    async fn append_message(&self, message: OutgoingMessage) -> Result<Message>;

    /// Current snapshot of a conversation.
    async fn snapshot(&self, conversation: &Conversation) -> Result<Snapshot>;

    /// Live snapshots: the current one first, then one per change.
    async fn subscribe(&self, conversation: &Conversation) -> Result<Subscription>;
}
