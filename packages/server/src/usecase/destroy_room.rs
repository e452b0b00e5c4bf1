//! UseCase: ルーム破棄処理
//!
//! HTTP の DELETE と Idle Reaper はどちらもこのユースケースを通ります。
//! 削除経路を1本化することで、通知とクリーンアップの手順が分岐ごとに
//! ずれることを防ぎます。
//!
//! ## 手順
//!
//! 1. 生きている接続へ room_destroyed を通知する
//! 2. Store からメッセージとルーム（参加者ごと）を削除する
//! 3. Registry のルーム束縛を解除する（接続自体は UNBOUND のまま残る）

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId, RoomRepository};
use crate::infrastructure::dto::websocket::{RoomDestroyedData, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomKeyLocks};

use super::error::DestroyRoomError;

/// ルーム破棄のユースケース
pub struct DestroyRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Connection Registry（接続とルームの対応）
    registry: Arc<ConnectionRegistry>,
    /// MessagePusher（イベント通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム単位のロック
    locks: Arc<RoomKeyLocks>,
}

impl DestroyRoomUseCase {
    /// 新しい DestroyRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        locks: Arc<RoomKeyLocks>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
            locks,
        }
    }

    /// ルーム破棄を実行
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 破棄に成功
    /// * `Err(DestroyRoomError)` - ルームが存在しない
    pub async fn execute(&self, room_id: &RoomId) -> Result<(), DestroyRoomError> {
        let _guard = self.locks.acquire(room_id).await;

        if self.repository.get_room(room_id).await.is_none() {
            return Err(DestroyRoomError::RoomNotFound);
        }

        // 1. 生きている接続へ通知（削除より先）
        let targets = self.registry.list_connections(room_id).await;
        let event = ServerEvent::RoomDestroyed {
            data: RoomDestroyedData {
                room_id: room_id.as_str().to_string(),
            },
        };
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &event.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast room_destroyed: {}", e);
        }

        // 2. Store から削除（メッセージが別コレクションの実装に備えて
        //    delete_messages を先に呼ぶ。ルーム削除で参加者も消える）
        if let Err(e) = self.repository.delete_messages(room_id).await {
            tracing::warn!("Failed to delete messages of room '{}': {}", room_id, e);
        }
        self.repository
            .delete_room(room_id)
            .await
            .map_err(|_| DestroyRoomError::RoomNotFound)?;

        // 3. Registry の束縛を解除し、ロックエントリも破棄する
        let dropped = self.registry.unbind_room(room_id).await;
        self.locks.remove(room_id).await;

        tracing::info!(
            "Room '{}' destroyed ({} connections unbound)",
            room_id,
            dropped.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionId, Nickname, Participant, ParticipantId, Room, RoomIdFactory, Timestamp,
    };
    use crate::infrastructure::{InMemoryRoomRepository, WebSocketMessagePusher};
    use tokio::sync::mpsc;

    struct TestHarness {
        repository: Arc<InMemoryRoomRepository>,
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: DestroyRoomUseCase,
    }

    fn create_harness() -> TestHarness {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DestroyRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            pusher.clone(),
            Arc::new(RoomKeyLocks::new()),
        );
        TestHarness {
            repository,
            registry,
            pusher,
            usecase,
        }
    }

    async fn create_room(harness: &TestHarness) -> RoomId {
        let room = Room::new(RoomIdFactory::generate(), Timestamp::new(1_000));
        let room_id = room.id.clone();
        harness.repository.create_room(room).await.unwrap();
        room_id
    }

    async fn join_room(
        harness: &TestHarness,
        room_id: &RoomId,
        nickname: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        harness.pusher.register_client(connection_id, tx).await;
        let participant = Participant::new(
            ParticipantId::generate(),
            Nickname::new(nickname),
            connection_id,
            Timestamp::new(1_000),
        );
        harness
            .repository
            .add_participant(room_id, participant.clone())
            .await
            .unwrap();
        harness
            .registry
            .bind(connection_id, room_id.clone(), participant)
            .await;
        (connection_id, rx)
    }

    #[tokio::test]
    async fn test_destroy_notifies_all_connections_then_deletes() {
        // テスト項目: room_destroyed が全接続に1通ずつ届き、ルームが消える
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (_conn_alice, mut rx_alice) = join_room(&harness, &room_id, "Alice").await;
        let (_conn_bob, mut rx_bob) = join_room(&harness, &room_id, "Bob").await;

        // when (操作):
        harness.usecase.execute(&room_id).await.unwrap();

        // then (期待する結果): 両方の接続に room_destroyed が1通ずつ届く
        for rx in [&mut rx_alice, &mut rx_bob] {
            let event: ServerEvent = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
            match event {
                ServerEvent::RoomDestroyed { data } => {
                    assert_eq!(data.room_id, room_id.as_str());
                }
                other => panic!("unexpected event: {:?}", other),
            }
            assert!(rx.try_recv().is_err());
        }
        // Store から消えている
        assert!(harness.repository.get_room(&room_id).await.is_none());
    }

    #[tokio::test]
    async fn test_destroy_unbinds_registry_entries() {
        // テスト項目: 破棄後、接続の束縛が解除され UNBOUND に戻る
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (conn_alice, _rx) = join_room(&harness, &room_id, "Alice").await;

        // when (操作):
        harness.usecase.execute(&room_id).await.unwrap();

        // then (期待する結果):
        assert!(harness.registry.lookup(&conn_alice).await.is_none());
        assert!(harness.registry.list_connections(&room_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_destroy_nonexistent_room_fails() {
        // テスト項目: 存在しないルームの破棄は RoomNotFound になる
        // given (前提条件):
        let harness = create_harness();

        // when (操作):
        let result = harness.usecase.execute(&RoomIdFactory::generate()).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), DestroyRoomError::RoomNotFound);
    }

    #[tokio::test]
    async fn test_destroy_is_not_repeatable() {
        // テスト項目: 同じルームを二度破棄すると二度目は RoomNotFound
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        harness.usecase.execute(&room_id).await.unwrap();

        // when (操作):
        let second = harness.usecase.execute(&room_id).await;

        // then (期待する結果):
        assert_eq!(second.unwrap_err(), DestroyRoomError::RoomNotFound);
    }
}
