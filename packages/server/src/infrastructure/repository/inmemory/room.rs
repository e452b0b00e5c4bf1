//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ルームの内容（メッセージ履歴・参加者リスト）は Room 集約ごと Mutex の
//! 内側にあるため、複数のイベントハンドラから同時に呼ばれても
//! コレクションが壊れることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, Nickname, Participant, ParticipantId,
    RepositoryError, Room, RoomId, RoomRepository, Timestamp,
};

/// インメモリ Room Repository 実装
///
/// ルーム ID をキーに Room ドメインモデルを保持し、ドメイン層の
/// RoomRepository trait を実装します（依存性の逆転）。
pub struct InMemoryRoomRepository {
    /// ルーム ID → Room ドメインモデル
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.id) {
            return Err(RepositoryError::RoomAlreadyExists);
        }
        rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }

    async fn touch_activity(
        &self,
        room_id: &RoomId,
        now: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RepositoryError::RoomNotFound)?;
        room.touch(now);
        Ok(())
    }

    async fn delete_room(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .remove(room_id)
            .map(|_| ())
            .ok_or(RepositoryError::RoomNotFound)
    }

    async fn list_inactive_rooms(&self, now: Timestamp, threshold_minutes: i64) -> Vec<RoomId> {
        let rooms = self.rooms.lock().await;
        rooms
            .values()
            .filter(|room| room.is_idle(now, threshold_minutes))
            .map(|room| room.id.clone())
            .collect()
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        sender_id: Option<ParticipantId>,
        sender_nickname: Nickname,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RepositoryError::RoomNotFound)?;
        let message = ChatMessage::new(
            room_id.clone(),
            sender_id,
            sender_nickname,
            content,
            timestamp,
        );
        room.append_message(message.clone());
        room.touch(timestamp);
        Ok(message)
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let room = rooms.get(room_id).ok_or(RepositoryError::RoomNotFound)?;
        Ok(room.messages.clone())
    }

    async fn delete_messages(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RepositoryError::RoomNotFound)?;
        room.messages.clear();
        Ok(())
    }

    async fn add_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RepositoryError::RoomNotFound)?;
        let joined_at = participant.joined_at;
        room.add_participant(participant);
        room.touch(joined_at);
        Ok(())
    }

    async fn remove_participant(
        &self,
        room_id: &RoomId,
        connection: &ConnectionId,
        now: Timestamp,
    ) -> Result<Option<Participant>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RepositoryError::RoomNotFound)?;
        let removed = room.remove_participant(connection);
        if removed.is_some() {
            room.touch(now);
        }
        Ok(removed)
    }

    async fn list_participants(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Participant>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let room = rooms.get(room_id).ok_or(RepositoryError::RoomNotFound)?;
        Ok(room.participants.clone())
    }
}
