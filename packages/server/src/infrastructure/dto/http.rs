//! HTTP API レスポンス DTO 定義
//!
//! タイムスタンプは WebSocket DTO と異なり RFC 3339 文字列で返します。

use serde::{Deserialize, Serialize};

/// POST /rooms のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub created: bool,
}

/// DELETE /rooms/{room_id} のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyRoomResponse {
    pub destroyed: bool,
}

/// GET /rooms の要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub participant_count: usize,
    pub created_at: String,
}

/// GET /rooms/{room_id} のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDetailResponse {
    pub room: RoomMetaDto,
    pub messages: Vec<HttpMessageDto>,
}

/// ルームのメタ情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMetaDto {
    pub id: String,
    pub created_at: String,
    pub participant_count: usize,
}

/// HTTP レスポンス用のメッセージ情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMessageDto {
    pub id: String,
    pub sender_id: String,
    pub sender_nickname: String,
    pub content: String,
    pub timestamp: String,
}
