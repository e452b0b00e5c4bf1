//! UseCase: ルーム退出・切断処理
//!
//! 明示的な leave_room イベントとトランスポート切断は同じ処理を通ります。
//! 切断は唯一のキャンセルシグナルであり、同じ接続に対して二度呼ばれても
//! 二度目は no-op になります（冪等性）。

use std::sync::Arc;

use utakata_shared::time::Clock;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRepository, Timestamp};
use crate::infrastructure::dto::websocket::{ParticipantUpdateData, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomKeyLocks};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Connection Registry（接続とルームの対応）
    registry: Arc<ConnectionRegistry>,
    /// MessagePusher（イベント通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム単位のロック
    locks: Arc<RoomKeyLocks>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        locks: Arc<RoomKeyLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
            locks,
            clock,
        }
    }

    /// ルーム退出を実行
    ///
    /// 接続がどのルームにも束縛されていなければ何もしない（冪等）。
    /// Store と Registry から参加者を取り除き、残った接続へ
    /// participant_update をブロードキャストする。ルーム自体は参加者が
    /// 0 人になっても削除しない（削除は Idle Reaper か明示的な破棄のみ）。
    ///
    /// # Returns
    ///
    /// 退出したルームの ID。束縛が無かった場合は None
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<RoomId> {
        // ロックを取るためにまず束縛先のルームを調べる
        let room_id = self.registry.lookup_room(&connection_id).await?;
        let _guard = self.locks.acquire(&room_id).await;

        // ロック獲得までの間に束縛が変わっていないか確認する
        let binding = self.registry.lookup(&connection_id).await?;
        if binding.room_id != room_id {
            return None;
        }

        let now = Timestamp::new(self.clock.now_jst_millis());

        // 1. Store から参加者を削除（leave はルームのアクティビティとして扱う）
        match self
            .repository
            .remove_participant(&room_id, &connection_id, now)
            .await
        {
            Ok(_) => {}
            Err(e) => {
                // ルームが既に破棄されていても Registry の束縛は掃除する
                tracing::warn!(
                    "Failed to remove participant for connection '{}' from room '{}': {}",
                    connection_id,
                    room_id,
                    e
                );
            }
        }

        // 2. Registry の束縛を解除
        self.registry.unbind(&connection_id).await;

        // 3. 残った接続へ participant_update をブロードキャスト
        let participants = self
            .repository
            .list_participants(&room_id)
            .await
            .unwrap_or_default();
        let event = ServerEvent::ParticipantUpdate {
            data: ParticipantUpdateData::from_participants(participants),
        };
        let targets = self.registry.list_connections(&room_id).await;
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &event.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast participant_update: {}", e);
        }

        tracing::info!("Connection '{}' left room '{}'", connection_id, room_id);
        Some(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Nickname, Participant, ParticipantId, Room, RoomIdFactory};
    use crate::infrastructure::{InMemoryRoomRepository, WebSocketMessagePusher};
    use tokio::sync::mpsc;
    use utakata_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - LeaveRoomUseCase::execute() メソッド
    // - Store と Registry の両方から参加者が消えること
    // - 残った接続への participant_update ブロードキャスト
    // - 冪等性（二度目の呼び出しが no-op であること）
    // - 最後の参加者が退出してもルームが削除されないこと
    // ========================================

    struct TestHarness {
        repository: Arc<InMemoryRoomRepository>,
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: LeaveRoomUseCase,
    }

    fn create_harness() -> TestHarness {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = LeaveRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            pusher.clone(),
            Arc::new(RoomKeyLocks::new()),
            Arc::new(FixedClock::new(5_000)),
        );
        TestHarness {
            repository,
            registry,
            pusher,
            usecase,
        }
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

    async fn create_room(harness: &TestHarness) -> RoomId {
        let room = Room::new(RoomIdFactory::generate(), Timestamp::new(1_000));
        let room_id = room.id.clone();
        harness.repository.create_room(room).await.unwrap();
        room_id
    }

    #[tokio::test]
    async fn test_leave_removes_participant_from_store_and_registry() {
        // テスト項目: 退出で Store と Registry の両方から参加者が消える
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (connection_id, _rx) = join_room(&harness, &room_id, "Alice").await;

        // when (操作):
        let left = harness.usecase.execute(connection_id).await;

        // then (期待する結果):
        assert_eq!(left, Some(room_id.clone()));
        assert!(harness.registry.lookup(&connection_id).await.is_none());
        let participants = harness
            .repository
            .list_participants(&room_id)
            .await
            .unwrap();
        assert!(participants.is_empty());
    }

    #[tokio::test]
    async fn test_leave_broadcasts_participant_update_to_remaining() {
        // テスト項目: 退出後、残った接続に participant_update が届く
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (_conn_alice, mut rx_alice) = join_room(&harness, &room_id, "Alice").await;
        let (conn_bob, _rx_bob) = join_room(&harness, &room_id, "Bob").await;

        // when (操作): Bob が退出する
        harness.usecase.execute(conn_bob).await;

        // then (期待する結果): Alice に count 1 の participant_update が届く
        let event: ServerEvent = serde_json::from_str(&rx_alice.recv().await.unwrap()).unwrap();
        match event {
            ServerEvent::ParticipantUpdate { data } => {
                assert_eq!(data.count, 1);
                assert_eq!(data.participants[0].nickname, "Alice");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        // テスト項目: 同じ接続の退出処理を二度呼んでも二度目は no-op
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (connection_id, _rx) = join_room(&harness, &room_id, "Alice").await;
        harness.usecase.execute(connection_id).await;

        // when (操作): 二度目の退出
        let second = harness.usecase.execute(connection_id).await;

        // then (期待する結果):
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_last_leave_does_not_delete_room() {
        // テスト項目: 最後の参加者が退出してもルームは残る
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (connection_id, _rx) = join_room(&harness, &room_id, "Alice").await;

        // when (操作):
        harness.usecase.execute(connection_id).await;

        // then (期待する結果): 参加者 0 人のままルームは取得できる
        let room = harness.repository.get_room(&room_id).await.unwrap();
        assert_eq!(room.participant_count(), 0);
    }

    #[tokio::test]
    async fn test_leave_advances_room_activity() {
        // テスト項目: 退出でルームの lastActivityAt が前進する
        // given (前提条件):
        let harness = create_harness();
        let room_id = create_room(&harness).await;
        let (connection_id, _rx) = join_room(&harness, &room_id, "Alice").await;

        // when (操作):
        harness.usecase.execute(connection_id).await;

        // then (期待する結果): FixedClock の時刻（5000）まで前進している
        let room = harness.repository.get_room(&room_id).await.unwrap();
        assert_eq!(room.last_activity_at.value(), 5_000);
    }
}
