//! Conversion logic between DTOs and domain entities.

use utakata_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::entity;
use crate::infrastructure::dto::http;
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<entity::Participant> for dto::ParticipantDto {
    fn from(model: entity::Participant) -> Self {
        Self {
            id: model.id.to_string(),
            nickname: model.nickname.into_string(),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<entity::ChatMessage> for dto::MessageDto {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            id: model.id.to_string(),
            room_id: model.room_id.into_string(),
            // 匿名・システムメッセージは空文字列
            sender_id: model.sender_id.map(|id| id.to_string()).unwrap_or_default(),
            sender_nickname: model.sender_nickname.into_string(),
            content: model.content.into_string(),
            timestamp: model.timestamp.value(),
            read_by: Vec::new(),
            delivered_to: Vec::new(),
        }
    }
}

impl dto::ParticipantUpdateData {
    /// 参加者リストのスナップショットから participant_update ペイロードを構築する
    ///
    /// count はリストの長さから導出される（別管理のカウンタは持たない）。
    pub fn from_participants(participants: Vec<entity::Participant>) -> Self {
        let count = participants.len();
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
            count,
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<entity::ChatMessage> for http::HttpMessageDto {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            id: model.id.to_string(),
            sender_id: model.sender_id.map(|id| id.to_string()).unwrap_or_default(),
            sender_nickname: model.sender_nickname.into_string(),
            content: model.content.into_string(),
            timestamp: timestamp_to_jst_rfc3339(model.timestamp.value()),
        }
    }
}

impl From<&entity::Room> for http::RoomMetaDto {
    fn from(model: &entity::Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
            participant_count: model.participant_count(),
        }
    }
}

impl From<&entity::Room> for http::RoomSummaryDto {
    fn from(model: &entity::Room) -> Self {
        Self {
            room_id: model.id.as_str().to_string(),
            participant_count: model.participant_count(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}
