//! Live snapshot subscriptions.
//!
//! A [`Subscription`] is a stream of full, ordered message lists for one
//! conversation. It is cancelled when dropped, so tearing down a view on
//! any path also tears down its subscription.

use crate::error::Result;
use crate::models::{Conversation, Message};
use futures::stream::{AbortHandle, Abortable, BoxStream};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

/// One delivery of the current ordered message list.
pub type Snapshot = Vec<Message>;

pub struct Subscription {
    conversation: Conversation,
    inner: Abortable<BoxStream<'static, Result<Snapshot>>>,
    handle: AbortHandle,
}

impl Subscription {
    pub fn new<S>(conversation: Conversation, stream: S) -> Self
    where
        S: Stream<Item = Result<Snapshot>> + Send + 'static,
    {
        let (inner, handle) = futures::stream::abortable(stream.boxed());
        Self {
            conversation,
            inner,
            handle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Handle that cancels this subscription from elsewhere.
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }

    /// Stop deliveries. The stream ends at its next poll.
    pub fn cancel(&self) {
        if !self.handle.is_aborted() {
            debug!("[Subscription] Cancelled {}", self.conversation);
            self.handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

impl Stream for Subscription {
    type Item = Result<Snapshot>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("conversation", &self.conversation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
