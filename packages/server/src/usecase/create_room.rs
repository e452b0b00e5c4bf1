//! UseCase: ルーム作成処理

use std::sync::Arc;

use utakata_shared::time::Clock;

use crate::domain::{RepositoryError, Room, RoomIdFactory, RoomRepository, Timestamp};

use super::error::CreateRoomError;

/// ルームコード衝突時の再試行回数
const MAX_CODE_ATTEMPTS: usize = 5;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// ルーム作成を実行
    ///
    /// サーバー側でルームコードを生成し、空のルームを Store に登録する。
    /// コードが既存ルームと衝突した場合は再生成する。
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 作成されたルーム
    /// * `Err(CreateRoomError)` - コードを確保できなかった場合
    pub async fn execute(&self) -> Result<Room, CreateRoomError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let room_id = RoomIdFactory::generate();
            let now = Timestamp::new(self.clock.now_jst_millis());
            let room = Room::new(room_id, now);

            match self.repository.create_room(room.clone()).await {
                Ok(()) => {
                    tracing::info!("Room '{}' created", room.id);
                    return Ok(room);
                }
                Err(RepositoryError::RoomAlreadyExists) => {
                    tracing::warn!("Room code '{}' collided, regenerating", room.id);
                    continue;
                }
                Err(e) => {
                    tracing::error!("Failed to create room: {}", e);
                    return Err(CreateRoomError::CodeAllocationFailed);
                }
            }
        }
        Err(CreateRoomError::CodeAllocationFailed)
    }
}
