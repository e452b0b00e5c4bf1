//! UseCase: ルーム詳細取得処理

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム詳細を取得
    ///
    /// # Arguments
    ///
    /// * `room_id` - クライアントが指定したルームコード（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - メッセージ履歴と参加者を含むルームのスナップショット
    /// * `Err(GetRoomDetailError)` - ルームが存在しない
    pub async fn execute(&self, room_id: &str) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::new(room_id.to_string())
            .map_err(|_| GetRoomDetailError::RoomNotFound)?;
        self.repository
            .get_room(&room_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
