//! JSON-file document store
//!
//! Every room and direct thread is one JSON document holding its header and
//! its messages. Documents are cached in memory and written back atomically
//! after each change; subscribers are woken through a per-conversation
//! broadcast channel.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mathfluent_core::chat::direct_thread_id;
use mathfluent_core::models::{
    ChatRoom, Conversation, DirectThread, Message, MessageStatus, OutgoingMessage,
};
use mathfluent_core::{ChatRoomForm, ChatStore, CoreError, Snapshot, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Notification that a conversation changed.
#[derive(Clone, Debug)]
pub struct ConversationUpdate {
    pub conversation: Conversation,
    pub message_id: String,
}

/// Broadcast channel for one conversation
#[derive(Clone)]
pub struct UpdateChannel {
    pub tx: broadcast::Sender<ConversationUpdate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Header {
    Room(ChatRoom),
    Thread(DirectThread),
}

/// On-disk document of one conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationData {
    pub header: Header,
    /// Ascending by timestamp.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ConversationData {
    pub fn conversation(&self) -> Conversation {
        match &self.header {
            Header::Room(room) => Conversation::Room(room.id.clone()),
            Header::Thread(thread) => Conversation::Thread(thread.id.clone()),
        }
    }

    /// The most recent `limit` messages, oldest first.
    pub fn snapshot(&self, limit: usize) -> Snapshot {
        let start = self.messages.len().saturating_sub(limit);
        self.messages[start..].to_vec()
    }
}

type Document = Arc<RwLock<ConversationData>>;

pub struct JsonChatStore {
    config: ServerConfig,
    /// In-memory cache of every loaded document
    docs: RwLock<HashMap<Conversation, Document>>,
    /// Broadcast channels for each conversation
    channels: RwLock<HashMap<Conversation, UpdateChannel>>,
    /// Last timestamp handed out; appends never go backwards in time
    clock: Mutex<DateTime<Utc>>,
}

impl JsonChatStore {
    pub async fn new(config: ServerConfig) -> Result<Self> {
        config.ensure_dirs().await?;

        let store = Self {
            config,
            docs: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
        };

        store.load_existing(&store.config.rooms_dir).await?;
        store.load_existing(&store.config.threads_dir).await?;

        info!(
            "[Store] JSON store initialized with {} conversations",
            store.docs.read().await.len()
        );

        Ok(store)
    }

    fn doc_path(&self, conversation: &Conversation) -> PathBuf {
        let dir = match conversation {
            Conversation::Room(_) => &self.config.rooms_dir,
            Conversation::Thread(_) => &self.config.threads_dir,
        };
        dir.join(format!("{}.json", conversation.id()))
    }

    async fn load_existing(&self, dir: &Path) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read {:?}", dir))?;
        let mut count = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match load_from_disk(&path).await {
                Ok(data) => {
                    if let Header::Room(room) = &data.header {
                        self.observe(room.created_at);
                    }
                    if let Some(last) = data.messages.last() {
                        self.observe(last.timestamp);
                    }
                    self.docs
                        .write()
                        .await
                        .insert(data.conversation(), Arc::new(RwLock::new(data)));
                    count += 1;
                }
                Err(e) => warn!("[Store] Failed to load {:?}: {:#}", path, e),
            }
        }

        debug!("[Store] Loaded {} documents from {:?}", count, dir);
        Ok(())
    }

    /// Save a document atomically
    async fn save_to_disk(&self, data: &ConversationData) -> Result<()> {
        let path = self.doc_path(&data.conversation());
        let temp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        fs::write(&temp_path, json)
            .await
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }

    async fn get_doc(&self, conversation: &Conversation) -> Option<Document> {
        self.docs.read().await.get(conversation).cloned()
    }

    async fn require_doc(&self, conversation: &Conversation) -> mathfluent_core::Result<Document> {
        self.get_doc(conversation)
            .await
            .ok_or_else(|| CoreError::NotFound(conversation.to_string()))
    }

    /// Server timestamp for a new message, strictly after every earlier one.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let next = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = next;
        next
    }

    fn observe(&self, timestamp: DateTime<Utc>) {
        let mut last = self.clock.lock();
        if timestamp > *last {
            *last = timestamp;
        }
    }

    pub async fn get_channel(&self, conversation: &Conversation) -> UpdateChannel {
        let mut channels = self.channels.write().await;
        channels
            .entry(conversation.clone())
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(100);
                UpdateChannel { tx }
            })
            .clone()
    }

    async fn broadcast(&self, update: ConversationUpdate) {
        let channel = self.get_channel(&update.conversation).await;
        // No receivers is fine
        let _ = channel.tx.send(update);
    }

    /// Insert a new document, or return the existing one untouched.
    async fn insert_doc(&self, data: ConversationData) -> Result<Document> {
        let conversation = data.conversation();
        let mut docs = self.docs.write().await;
        if let Some(existing) = docs.get(&conversation) {
            return Ok(existing.clone());
        }
        self.save_to_disk(&data).await?;
        let doc = Arc::new(RwLock::new(data));
        docs.insert(conversation, doc.clone());
        Ok(doc)
    }
}

async fn load_from_disk(path: &Path) -> Result<ConversationData> {
    let content = fs::read_to_string(path).await?;
    let mut data: ConversationData = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {:?}", path))?;
    data.messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(data)
}

#[async_trait]
impl ChatStore for JsonChatStore {
    async fn create_room(
        &self,
        form: &ChatRoomForm,
        creator_id: &str,
    ) -> mathfluent_core::Result<ChatRoom> {
        form.validate()?;
        if creator_id.trim().is_empty() {
            return Err(CoreError::invalid("created_by", "Creator is required."));
        }

        let room = ChatRoom {
            id: Uuid::new_v4().simple().to_string(),
            name: form.room_name.trim().to_string(),
            description: form.normalized_description(),
            visibility: form.room_type,
            ai_assistant: form.enable_ai_assistant,
            created_by: creator_id.to_string(),
            members: BTreeSet::from([creator_id.to_string()]),
            created_at: self.next_timestamp(),
        };

        self.insert_doc(ConversationData {
            header: Header::Room(room.clone()),
            messages: Vec::new(),
        })
        .await
        .context("Failed to create chat room")?;

        info!("[Store] Created room {} ({})", room.id, room.name);
        Ok(room)
    }

    async fn list_rooms(&self) -> mathfluent_core::Result<Vec<ChatRoom>> {
        let docs: Vec<Document> = self.docs.read().await.values().cloned().collect();
        let mut rooms = Vec::new();
        for doc in docs {
            if let Header::Room(room) = &doc.read().await.header {
                rooms.push(room.clone());
            }
        }
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }

    async fn open_direct_thread(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> mathfluent_core::Result<DirectThread> {
        let valid = |id: &str| !id.trim().is_empty() && !id.contains(['/', '\\']);
        if !valid(user_a) || !valid(user_b) {
            return Err(CoreError::invalid(
                "participants",
                "Both users are required.",
            ));
        }

        let now = self.next_timestamp();
        let thread = DirectThread {
            id: direct_thread_id(user_a, user_b),
            participants: [user_a.to_string(), user_b.to_string()],
            created_at: now,
            last_message_at: now,
        };

        let doc = self
            .insert_doc(ConversationData {
                header: Header::Thread(thread),
                messages: Vec::new(),
            })
            .await
            .context("Failed to initialize direct message thread")?;

        let data = doc.read().await;
        match &data.header {
            // Ids containing '_' can collide: ("a_b", "c") and ("a", "b_c")
            Header::Thread(thread) => {
                let mut stored = thread.participants.clone();
                let mut requested = [user_a.to_string(), user_b.to_string()];
                stored.sort();
                requested.sort();
                if stored != requested {
                    return Err(CoreError::invalid(
                        "participants",
                        "Thread belongs to other users.",
                    ));
                }
                Ok(thread.clone())
            }
            Header::Room(_) => Err(CoreError::Store("thread id names a room".into())),
        }
    }

    async fn append_message(&self, message: OutgoingMessage) -> mathfluent_core::Result<Message> {
        let text = message.text.trim();
        if text.is_empty() {
            return Err(CoreError::invalid("text", "Message cannot be empty."));
        }
        let doc = self.require_doc(&message.conversation).await?;

        let stored = {
            let mut data = doc.write().await;
            let timestamp = self.next_timestamp();
            let stored = Message {
                id: Uuid::new_v4().simple().to_string(),
                text: text.to_string(),
                sender: message.sender,
                timestamp,
                conversation: message.conversation,
                status: MessageStatus::Sent,
                client_token: message.client_token,
            };

            let previous_header = data.header.clone();
            if let Header::Thread(thread) = &mut data.header {
                thread.last_message_at = timestamp;
            }
            data.messages.push(stored.clone());

            if let Err(e) = self.save_to_disk(&data).await {
                data.messages.pop();
                data.header = previous_header;
                return Err(e.context("Failed to send message").into());
            }
            stored
        };

        debug!(
            "[Store] Added message {} to {}",
            stored.id, stored.conversation
        );
        self.broadcast(ConversationUpdate {
            conversation: stored.conversation.clone(),
            message_id: stored.id.clone(),
        })
        .await;

        Ok(stored)
    }

    async fn snapshot(&self, conversation: &Conversation) -> mathfluent_core::Result<Snapshot> {
        let doc = self.require_doc(conversation).await?;
        let data = doc.read().await;
        Ok(data.snapshot(conversation.snapshot_limit()))
    }

    async fn subscribe(&self, conversation: &Conversation) -> mathfluent_core::Result<Subscription> {
        let doc = self.require_doc(conversation).await?;
        // Subscribe before the first read so no change falls in between
        let mut rx = self.get_channel(conversation).await.tx.subscribe();
        let limit = conversation.snapshot_limit();
        let label = conversation.to_string();

        info!("[Store] New subscription to {}", label);

        let stream = async_stream::stream! {
            let initial = doc.read().await.snapshot(limit);
            yield Ok::<_, CoreError>(initial);

            loop {
                match rx.recv().await {
                    Ok(update) => {
                        debug!("[Store] {} changed ({})", label, update.message_id);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("[Store] {} subscriber lagged by {}", label, skipped);
                        // Report the gap, then resync with a fresh snapshot
                        yield Err(CoreError::Subscription(format!(
                            "{} missed {} updates",
                            label, skipped
                        )));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let snapshot = doc.read().await.snapshot(limit);
                yield Ok::<_, CoreError>(snapshot);
            }
        };

        Ok(Subscription::new(conversation.clone(), stream))
    }
}
