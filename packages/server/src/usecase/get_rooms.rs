//! UseCase: ルーム一覧取得処理

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 全てのルームのスナップショットを取得
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.list_rooms().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomIdFactory, Timestamp};
    use crate::infrastructure::InMemoryRoomRepository;

    #[tokio::test]
    async fn test_get_rooms_returns_all_rooms() {
        // テスト項目: 作成した全てのルームが一覧に含まれる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let first = Room::new(RoomIdFactory::generate(), Timestamp::new(1_000));
        let second = Room::new(RoomIdFactory::generate(), Timestamp::new(2_000));
        repository.create_room(first.clone()).await.unwrap();
        repository.create_room(second.clone()).await.unwrap();
        let usecase = GetRoomsUseCase::new(repository);

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(rooms.len(), 2);
        let ids: Vec<_> = rooms.iter().map(|r| r.id.clone()).collect();
        assert!(ids.contains(&first.id));
        assert!(ids.contains(&second.id));
    }

    #[tokio::test]
    async fn test_get_rooms_with_empty_store() {
        // テスト項目: ルームが無い場合は空のリストが返る
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = GetRoomsUseCase::new(repository);

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        assert!(rooms.is_empty());
    }
}
