//! Chat room endpoints.

use super::{current_user, subscribe::snapshot_stream, PostMessageInput};
use crate::config::AppState;
use crate::error::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use mathfluent_core::{ChatRoom, ChatRoomForm, Conversation, Message};
use tracing::info;

/// GET /rooms
///
/// Newest first.
pub async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<ChatRoom>>> {
    let rooms = state.store.list_rooms().await?;
    info!("GET /rooms ({} rooms)", rooms.len());
    Ok(Json(rooms))
}

/// POST /rooms
///
/// The `x-user` header names the creator, who becomes the only member.
pub async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ChatRoomForm>,
) -> Result<(StatusCode, Json<ChatRoom>)> {
    let creator = current_user(&headers)?;
    info!("POST /rooms by {}", creator);
    let room = state.store.create_room(&form, &creator).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /rooms/{room_id}/messages
pub async fn get_messages(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>> {
    let snapshot = state.store.snapshot(&Conversation::Room(room_id)).await?;
    Ok(Json(snapshot))
}

/// POST /rooms/{room_id}/messages
pub async fn post_message(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<PostMessageInput>,
) -> Result<(StatusCode, Json<Message>)> {
    info!("POST /rooms/{}/messages", room_id);
    let message = state
        .store
        .append_message(input.into_outgoing(Conversation::Room(room_id)))
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /rooms/{room_id}/subscribe
pub async fn subscribe(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    snapshot_stream(&state, Conversation::Room(room_id)).await
}
