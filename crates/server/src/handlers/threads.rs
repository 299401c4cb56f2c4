//! Direct message endpoints.

use super::{subscribe::snapshot_stream, PostMessageInput};
use crate::config::AppState;
use crate::error::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use mathfluent_core::{Conversation, DirectThread, Message};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct OpenThreadInput {
    pub user_id: String,
    pub peer_id: String,
}

/// POST /threads
///
/// Get-or-create; both orders of the pair resolve to the same thread.
pub async fn open_thread(
    State(state): State<AppState>,
    Json(input): Json<OpenThreadInput>,
) -> Result<Json<DirectThread>> {
    info!("POST /threads {} <-> {}", input.user_id, input.peer_id);
    let thread = state
        .store
        .open_direct_thread(&input.user_id, &input.peer_id)
        .await?;
    Ok(Json(thread))
}

/// GET /threads/{thread_id}/messages
pub async fn get_messages(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>> {
    let snapshot = state
        .store
        .snapshot(&Conversation::Thread(thread_id))
        .await?;
    Ok(Json(snapshot))
}

/// POST /threads/{thread_id}/messages
pub async fn post_message(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<PostMessageInput>,
) -> Result<(StatusCode, Json<Message>)> {
    info!("POST /threads/{}/messages", thread_id);
    let message = state
        .store
        .append_message(input.into_outgoing(Conversation::Thread(thread_id)))
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /threads/{thread_id}/subscribe
pub async fn subscribe(
    Path(thread_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    snapshot_stream(&state, Conversation::Thread(thread_id)).await
}
