//! Live snapshot streams.
//!
//! Each line of the response body is one JSON array holding the current
//! ordered message list. Blank lines are keep-alives and carry no data.

use crate::config::AppState;
use crate::error::{Error, Result};
use axum::{body::Body, http::StatusCode, response::Response};
use bytes::Bytes;
use futures::StreamExt;
use mathfluent_core::Conversation;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const NDJSON: &str = "application/x-ndjson";

pub async fn snapshot_stream(state: &AppState, conversation: Conversation) -> Result<Response> {
    info!("[Subscribe] {}", conversation);

    let mut subscription = state.store.subscribe(&conversation).await?;
    let heartbeat = Duration::from_secs(state.heartbeat_secs.max(1));

    let stream = async_stream::stream! {
        let mut heartbeat_interval = tokio::time::interval(heartbeat);
        heartbeat_interval.tick().await;

        loop {
            tokio::select! {
                next = subscription.next() => match next {
                    Some(Ok(snapshot)) => match serde_json::to_vec(&snapshot) {
                        Ok(mut line) => {
                            line.push(b'\n');
                            yield Ok::<_, Infallible>(Bytes::from(line));
                        }
                        Err(e) => warn!("[Subscribe] Failed to encode snapshot: {}", e),
                    },
                    Some(Err(e)) => warn!("[Subscribe] Delivery failed: {}", e),
                    None => {
                        debug!("[Subscribe] {} ended", subscription.conversation());
                        break;
                    }
                },
                _ = heartbeat_interval.tick() => {
                    yield Ok::<_, Infallible>(Bytes::from_static(b"\n"));
                }
            }
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", NDJSON)
        .header("cache-control", "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| Error::Internal(format!("Failed to build response: {}", e)))
}
