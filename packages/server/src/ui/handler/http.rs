//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::infrastructure::dto::http::{
    CreateRoomResponse, DestroyRoomResponse, RoomDetailResponse, RoomSummaryDto,
};
use crate::usecase::{DestroyRoomError, GetRoomDetailError};
use crate::domain::RoomId;

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a new empty room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreateRoomResponse>, StatusCode> {
    match state.create_room_usecase.execute().await {
        Ok(room) => Ok(Json(CreateRoomResponse {
            room_id: room.id.into_string(),
            created: true,
        })),
        Err(e) => {
            tracing::error!("Failed to create room: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let summaries: Vec<RoomSummaryDto> = rooms.iter().map(Into::into).collect();
    Json(summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailResponse>, StatusCode> {
    match state.get_room_detail_usecase.execute(&room_id).await {
        Ok(room) => {
            // Domain Model から DTO への変換
            let response = RoomDetailResponse {
                room: (&room).into(),
                messages: room.messages.into_iter().map(Into::into).collect(),
            };
            Ok(Json(response))
        }
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

/// Destroy a room: notify connected clients, then delete it
pub async fn destroy_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<DestroyRoomResponse>, StatusCode> {
    // 形式不正なコードは存在し得ないルームとして扱う
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;
    match state.destroy_room_usecase.execute(&room_id).await {
        Ok(()) => Ok(Json(DestroyRoomResponse { destroyed: true })),
        Err(DestroyRoomError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}
