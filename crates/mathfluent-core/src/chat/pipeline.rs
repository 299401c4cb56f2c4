//! Optimistic message sending for one chat view.
//!
//! A send shows up in the view immediately as a pending message under a
//! temporary id. The store call then marks it sent or failed, and the next
//! snapshot that contains the stored copy replaces it.

use super::merge::merge_snapshot;
use super::subscription::{Snapshot, Subscription};
use crate::error::Result;
use crate::models::{Conversation, Message, MessageStatus, OutgoingMessage, Sender, TEMP_ID_PREFIX};
use crate::store::ChatStore;
use chrono::Utc;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Non-blocking notification for the user (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// A send that has been shown locally and still awaits the store.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub temp_id: String,
    pub outgoing: OutgoingMessage,
}

/// Message list, input field and live subscription of one open conversation.
pub struct ChatView {
    store: Arc<dyn ChatStore>,
    sender: Sender,
    conversation: Option<Conversation>,
    subscription: Option<Subscription>,
    messages: Vec<Message>,
    input: String,
    in_flight: HashSet<String>,
    notices: Vec<Notice>,
}

impl ChatView {
    pub fn new(store: Arc<dyn ChatStore>, sender: Sender) -> Self {
        Self {
            store,
            sender,
            conversation: None,
            subscription: None,
            messages: Vec::new(),
            input: String::new(),
            in_flight: HashSet::new(),
            notices: Vec::new(),
        }
    }

    /// Switch to `conversation`, tearing down the previous subscription first.
    pub async fn open(&mut self, conversation: Conversation) -> Result<()> {
        self.close();
        info!("[ChatView] Opening {}", conversation);

        match self.store.subscribe(&conversation).await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                self.conversation = Some(conversation);
                Ok(())
            }
            Err(e) => {
                warn!("[ChatView] Failed to subscribe to {}: {}", conversation, e);
                self.notices
                    .push(Notice::new("Chat Error", "Could not initialize chat."));
                Err(e)
            }
        }
    }

    /// Leave the current conversation. Failed messages are forgotten too.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        if let Some(conversation) = self.conversation.take() {
            debug!("[ChatView] Closed {}", conversation);
        }
        self.messages.clear();
        self.in_flight.clear();
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// True while any send is awaiting the store. Only the submit control
    /// should be disabled by this; composing stays possible.
    pub fn is_sending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Show the current input as a pending message and clear the input.
    ///
    /// The text is trimmed the same way the store trims it. Returns `None`
    /// when the input is blank or no conversation is open.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        let conversation = self.conversation.clone()?;
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input.clear();
        let temp_id = format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4().simple());

        self.messages.push(Message {
            id: temp_id.clone(),
            text: text.clone(),
            sender: self.sender.clone(),
            timestamp: Utc::now(),
            conversation: conversation.clone(),
            status: MessageStatus::Pending,
            client_token: Some(temp_id.clone()),
        });
        self.in_flight.insert(temp_id.clone());
        debug!("[ChatView] Pending {} in {}", temp_id, conversation);

        Some(PendingSend {
            outgoing: OutgoingMessage {
                conversation,
                sender: self.sender.clone(),
                text,
                client_token: Some(temp_id.clone()),
            },
            temp_id,
        })
    }

    /// Reconcile a pending message with the outcome of its store call.
    ///
    /// Returns the resulting status, or `None` when the send no longer
    /// belongs to this view (it was closed or reopened since) and the
    /// outcome was dropped.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        outcome: Result<Message>,
    ) -> Option<MessageStatus> {
        if !self.in_flight.remove(&pending.temp_id) {
            debug!(
                "[ChatView] Dropping outcome of {} for a closed conversation",
                pending.temp_id
            );
            return None;
        }

        let status = match outcome {
            Ok(stored) => {
                debug!("[ChatView] {} stored as {}", pending.temp_id, stored.id);
                MessageStatus::Sent
            }
            Err(e) => {
                warn!("[ChatView] Failed to send {}: {}", pending.temp_id, e);
                self.input = pending.outgoing.text.clone();
                self.notices
                    .push(Notice::new("Error", "Could not send message."));
                MessageStatus::Failed
            }
        };

        // The entry is gone already if a snapshot echoed it before the ack.
        if let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == pending.temp_id && m.status == MessageStatus::Pending)
        {
            message.status = status;
        }
        Some(status)
    }

    /// Optimistically send the current input and wait for the store.
    pub async fn send(&mut self) -> Option<MessageStatus> {
        let pending = self.begin_send()?;
        let outcome = self.store.append_message(pending.outgoing.clone()).await;
        self.complete_send(pending, outcome)
    }

    /// Merge one store snapshot into the visible list.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.messages = merge_snapshot(&self.messages, snapshot);
    }

    /// Wait for the next snapshot and merge it.
    ///
    /// Returns the visible length after merging, or `None` once the
    /// subscription has ended. Delivery errors are logged and skipped.
    pub async fn next_delivery(&mut self) -> Option<usize> {
        loop {
            let next = self.subscription.as_mut()?.next().await;
            match next {
                Some(Ok(snapshot)) => {
                    self.apply_snapshot(snapshot);
                    return Some(self.messages.len());
                }
                Some(Err(e)) => {
                    warn!("[ChatView] Subscription delivery failed: {}", e);
                }
                None => {
                    debug!("[ChatView] Subscription ended");
                    self.subscription = None;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::models::{ChatRoom, DirectThread};
    use crate::validation::ChatRoomForm;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::sync::watch;

    /// Single-conversation store publishing snapshots over a watch channel.
    struct FakeStore {
        messages: Mutex<Vec<Message>>,
        tx: watch::Sender<Snapshot>,
        fail_sends: AtomicBool,
        publish_on_append: AtomicBool,
        fail_subscribe: AtomicBool,
        scripted: Mutex<Option<Vec<Result<Snapshot>>>>,
    }

    impl FakeStore {
        fn new() -> Arc<Self> {
            let (tx, _rx) = watch::channel(Vec::new());
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
                tx,
                fail_sends: AtomicBool::new(false),
                publish_on_append: AtomicBool::new(true),
                fail_subscribe: AtomicBool::new(false),
                scripted: Mutex::new(None),
            })
        }

        fn publish(&self) {
            let snapshot = self.messages.lock().unwrap().clone();
            self.tx.send_replace(snapshot);
        }

        fn push_foreign(&self, id: &str, sender: &str, text: &str) {
            self.messages.lock().unwrap().push(Message {
                id: id.to_string(),
                text: text.to_string(),
                sender: Sender {
                    id: sender.to_string(),
                    name: sender.to_string(),
                    avatar: None,
                },
                timestamp: Utc::now(),
                conversation: Conversation::Thread("u1_u2".into()),
                status: MessageStatus::Sent,
                client_token: None,
            });
        }
    }

    #[async_trait]
    impl ChatStore for FakeStore {
        async fn create_room(&self, _form: &ChatRoomForm, _creator: &str) -> Result<ChatRoom> {
            Err(CoreError::Store("unsupported".into()))
        }

        async fn list_rooms(&self) -> Result<Vec<ChatRoom>> {
            Ok(Vec::new())
        }

        async fn open_direct_thread(&self, _a: &str, _b: &str) -> Result<DirectThread> {
            Err(CoreError::Store("unsupported".into()))
        }

        async fn append_message(&self, message: OutgoingMessage) -> Result<Message> {
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(CoreError::Store("write rejected".into()));
            }
            let stored = Message {
                id: format!("m{}", self.messages.lock().unwrap().len() + 1),
                text: message.text,
                sender: message.sender,
                timestamp: Utc::now(),
                conversation: message.conversation,
                status: MessageStatus::Sent,
                client_token: message.client_token,
            };
            self.messages.lock().unwrap().push(stored.clone());
            if self.publish_on_append.load(Ordering::SeqCst) {
                self.publish();
            }
            Ok(stored)
        }

        async fn snapshot(&self, _conversation: &Conversation) -> Result<Snapshot> {
            Ok(self.messages.lock().unwrap().clone())
        }

        async fn subscribe(&self, conversation: &Conversation) -> Result<Subscription> {
            if self.fail_subscribe.load(Ordering::SeqCst) {
                return Err(CoreError::Subscription("listener refused".into()));
            }
            if let Some(deliveries) = self.scripted.lock().unwrap().take() {
                return Ok(Subscription::new(conversation.clone(), stream::iter(deliveries)));
            }
            let mut rx = self.tx.subscribe();
            let initial = rx.borrow_and_update().clone();
            let updates = stream::unfold(rx, |mut rx| async move {
                rx.changed().await.ok()?;
                let snapshot = rx.borrow_and_update().clone();
                Some((Ok::<_, CoreError>(snapshot), rx))
            });
            Ok(Subscription::new(
                conversation.clone(),
                stream::once(async move { Ok::<_, CoreError>(initial) }).chain(updates),
            ))
        }
    }

    fn me() -> Sender {
        Sender {
            id: "u1".into(),
            name: "Ada".into(),
            avatar: None,
        }
    }

    async fn open_view(store: &Arc<FakeStore>) -> ChatView {
        let mut view = ChatView::new(store.clone(), me());
        view.open(Conversation::Thread("u1_u2".into())).await.unwrap();
        assert_eq!(view.next_delivery().await, Some(0));
        view
    }

    #[tokio::test]
    async fn test_begin_send_is_immediate_and_pending() {
        let store = FakeStore::new();
        let mut view = open_view(&store).await;
        view.set_input("What is 2 + 2?");

        let before = view.messages().len();
        let pending = view.begin_send().unwrap();

        assert_eq!(view.messages().len(), before + 1);
        let shown = view.messages().last().unwrap();
        assert_eq!(shown.status, MessageStatus::Pending);
        assert_eq!(shown.text, "What is 2 + 2?");
        assert_eq!(shown.id, pending.temp_id);
        assert!(shown.is_local());
        assert_eq!(view.input(), "");
        assert!(view.is_sending());
    }

    #[tokio::test]
    async fn test_blank_input_does_not_send() {
        let store = FakeStore::new();
        let mut view = open_view(&store).await;
        view.set_input("   \n");
        assert!(view.begin_send().is_none());
        assert!(view.messages().is_empty());
        assert_eq!(view.input(), "   \n");
    }

    #[tokio::test]
    async fn test_no_conversation_does_not_send() {
        let store = FakeStore::new();
        let mut view = ChatView::new(store, me());
        view.set_input("hello");
        assert!(view.begin_send().is_none());
    }

    #[tokio::test]
    async fn test_success_then_echo_leaves_one_entry() {
        let store = FakeStore::new();
        let mut view = open_view(&store).await;
        view.set_input("hello");

        assert_eq!(view.send().await, Some(MessageStatus::Sent));
        assert!(!view.is_sending());
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].status, MessageStatus::Sent);
        assert!(view.messages()[0].is_local());

        assert_eq!(view.next_delivery().await, Some(1));
        let only = &view.messages()[0];
        assert_eq!(only.id, "m1");
        assert_eq!(only.text, "hello");
        assert!(!only.is_local());
    }

    #[tokio::test]
    async fn test_failure_marks_failed_and_restores_input() {
        let store = FakeStore::new();
        store.fail_sends.store(true, Ordering::SeqCst);
        let mut view = open_view(&store).await;
        view.set_input("lost words");

        assert_eq!(view.send().await, Some(MessageStatus::Failed));
        assert_eq!(view.input(), "lost words");
        assert_eq!(view.messages()[0].status, MessageStatus::Failed);
        assert!(!view.is_sending());

        let notices = view.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].description, "Could not send message.");

        // Other traffic does not wash the failed entry away.
        store.push_foreign("m1", "u2", "hi");
        store.publish();
        assert_eq!(view.next_delivery().await, Some(2));
        assert_eq!(view.messages()[0].id, "m1");
        assert_eq!(view.messages()[1].status, MessageStatus::Failed);
    }

    #[tokio::test]
    async fn test_pending_survives_unrelated_snapshot() {
        let store = FakeStore::new();
        store.publish_on_append.store(false, Ordering::SeqCst);
        let mut view = open_view(&store).await;

        view.set_input("first");
        let pending = view.begin_send().unwrap();

        store.push_foreign("m1", "u2", "meanwhile");
        store.publish();
        assert_eq!(view.next_delivery().await, Some(2));
        assert_eq!(view.messages()[1].status, MessageStatus::Pending);

        let outcome = store.append_message(pending.outgoing.clone()).await;
        assert_eq!(view.complete_send(pending, outcome), Some(MessageStatus::Sent));
        store.publish();
        view.next_delivery().await;

        let texts: Vec<_> = view.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["meanwhile", "first"]);
        assert!(view.messages().iter().all(|m| !m.is_local()));
    }

    #[tokio::test]
    async fn test_identical_rapid_sends_reconcile_separately() {
        let store = FakeStore::new();
        store.publish_on_append.store(false, Ordering::SeqCst);
        let mut view = open_view(&store).await;

        view.set_input("+1");
        let first = view.begin_send().unwrap();
        view.set_input("+1");
        let second = view.begin_send().unwrap();

        let outcome = store.append_message(first.outgoing.clone()).await;
        view.complete_send(first, outcome);
        store.publish();
        view.next_delivery().await;

        assert_eq!(view.messages().len(), 2);
        assert_eq!(view.messages()[1].id, second.temp_id);
        assert_eq!(view.messages()[1].status, MessageStatus::Pending);
        assert!(view.is_sending());
    }

    #[tokio::test]
    async fn test_switching_conversation_orphans_outcome() {
        let store = FakeStore::new();
        let mut view = open_view(&store).await;
        view.set_input("bye");
        let pending = view.begin_send().unwrap();

        view.open(Conversation::Room("algebra".into())).await.unwrap();
        assert!(view.messages().is_empty());
        assert!(!view.is_sending());

        let outcome = Err(CoreError::Store("timeout".into()));
        assert_eq!(view.complete_send(pending, outcome), None);
        assert_eq!(view.input(), "");
    }

    #[tokio::test]
    async fn test_returning_to_a_conversation_drops_stale_outcome() {
        let store = FakeStore::new();
        let mut view = open_view(&store).await;
        view.set_input("first visit");
        let pending = view.begin_send().unwrap();

        view.open(Conversation::Room("algebra".into())).await.unwrap();
        view.open(Conversation::Thread("u1_u2".into())).await.unwrap();
        view.set_input("draft");

        let outcome = Err(CoreError::Store("timeout".into()));
        assert_eq!(view.complete_send(pending, outcome), None);
        assert_eq!(view.input(), "draft");
        assert!(view.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_pending_text_is_trimmed_like_the_store() {
        let store = FakeStore::new();
        store.publish_on_append.store(false, Ordering::SeqCst);
        let mut view = open_view(&store).await;

        view.set_input("  hi \n");
        let mut pending = view.begin_send().unwrap();
        assert_eq!(view.messages()[0].text, "hi");
        assert_eq!(pending.outgoing.text, "hi");

        // Without a token the echo is matched on sender and text alone.
        pending.outgoing.client_token = None;
        let outcome = store.append_message(pending.outgoing.clone()).await;
        view.complete_send(pending, outcome);
        store.publish();
        assert_eq!(view.next_delivery().await, Some(1));
        assert!(!view.messages()[0].is_local());
    }

    #[tokio::test]
    async fn test_delivery_errors_are_skipped() {
        let store = FakeStore::new();
        let first = Message {
            id: "m1".into(),
            text: "a".into(),
            sender: me(),
            timestamp: Utc::now(),
            conversation: Conversation::Thread("u1_u2".into()),
            status: MessageStatus::Sent,
            client_token: None,
        };
        let second = Message {
            id: "m2".into(),
            text: "b".into(),
            ..first.clone()
        };
        *store.scripted.lock().unwrap() = Some(vec![
            Ok(vec![first.clone()]),
            Err(CoreError::Subscription("connection reset".into())),
            Ok(vec![first, second]),
        ]);

        let mut view = ChatView::new(store.clone(), me());
        view.open(Conversation::Thread("u1_u2".into())).await.unwrap();
        assert_eq!(view.next_delivery().await, Some(1));
        assert_eq!(view.next_delivery().await, Some(2));
        assert_eq!(view.messages()[1].text, "b");
        assert_eq!(view.next_delivery().await, None);
    }

    #[tokio::test]
    async fn test_open_failure_raises_chat_error_notice() {
        let store = FakeStore::new();
        store.fail_subscribe.store(true, Ordering::SeqCst);
        let mut view = ChatView::new(store.clone(), me());

        let result = view.open(Conversation::Room("algebra".into())).await;
        assert!(matches!(result, Err(CoreError::Subscription(_))));
        assert!(view.conversation().is_none());

        let notices = view.take_notices();
        assert_eq!(
            notices,
            vec![Notice::new("Chat Error", "Could not initialize chat.")]
        );
    }

    #[tokio::test]
    async fn test_close_cancels_subscription() {
        let store = FakeStore::new();
        let mut view = open_view(&store).await;
        view.close();
        assert!(view.conversation().is_none());
        assert_eq!(view.next_delivery().await, None);
    }
}
