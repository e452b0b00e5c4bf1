//! UseCase: 入力状態の通知処理
//!
//! typing_start / typing_stop はどちらもこのユースケースを通ります。
//! Store は変更しない（typing はルームのアクティビティとして扱わない）ため、
//! ブロードキャストの順序を守る目的でのみルームロックを取ります。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher};
use crate::infrastructure::dto::websocket::{ServerEvent, TypingUpdateData};
use crate::infrastructure::{ConnectionRegistry, RoomKeyLocks};

use super::error::SessionEventError;

/// 入力状態通知のユースケース
pub struct NotifyTypingUseCase {
    /// Connection Registry（接続とルームの対応）
    registry: Arc<ConnectionRegistry>,
    /// MessagePusher（イベント通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム単位のロック
    locks: Arc<RoomKeyLocks>,
}

impl NotifyTypingUseCase {
    /// 新しい NotifyTypingUseCase を作成
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        locks: Arc<RoomKeyLocks>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            locks,
        }
    }

    /// 入力状態の変化を通知する
    ///
    /// 自分の入力状態のエコーは無意味なので、送信者本人は配信対象から
    /// 除外される。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 通知元の接続
    /// * `is_typing` - true なら typing_start、false なら typing_stop
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        is_typing: bool,
    ) -> Result<(), SessionEventError> {
        let binding = self
            .registry
            .lookup(&connection_id)
            .await
            .ok_or(SessionEventError::NotJoined)?;

        let _guard = self.locks.acquire(&binding.room_id).await;

        let binding = self
            .registry
            .lookup(&connection_id)
            .await
            .ok_or(SessionEventError::NotJoined)?;

        let event = ServerEvent::TypingUpdate {
            data: TypingUpdateData {
                user_id: binding.participant.id.to_string(),
                nickname: binding.participant.nickname.as_str().to_string(),
                is_typing,
            },
        };

        // 送信者本人を除いた接続へブロードキャスト
        let targets: Vec<ConnectionId> = self
            .registry
            .list_connections(&binding.room_id)
            .await
            .into_iter()
            .filter(|id| *id != connection_id)
            .collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &event.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast typing_update: {}", e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MockMessagePusher, Nickname, Participant, ParticipantId, RoomId, RoomIdFactory, Timestamp,
    };
    use crate::infrastructure::WebSocketMessagePusher;
    use tokio::sync::mpsc;

    async fn bind_connection(
        registry: &ConnectionRegistry,
        room_id: &RoomId,
        nickname: &str,
    ) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        let participant = Participant::new(
            ParticipantId::generate(),
            Nickname::new(nickname),
            connection_id,
            Timestamp::new(1_000),
        );
        registry
            .bind(connection_id, room_id.clone(), participant)
            .await;
        connection_id
    }

    #[tokio::test]
    async fn test_typing_update_excludes_sender() {
        // テスト項目: typing_update が送信者以外にのみ届く
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = NotifyTypingUseCase::new(
            registry.clone(),
            pusher.clone(),
            Arc::new(RoomKeyLocks::new()),
        );
        let room_id = RoomIdFactory::generate();
        let conn_alice = bind_connection(&registry, &room_id, "Alice").await;
        let conn_bob = bind_connection(&registry, &room_id, "Bob").await;
        let (tx_alice, mut rx_alice) = mpsc::unbounded_channel();
        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        pusher.register_client(conn_alice, tx_alice).await;
        pusher.register_client(conn_bob, tx_bob).await;

        // when (操作): Alice が typing_start を送る
        usecase.execute(conn_alice, true).await.unwrap();

        // then (期待する結果): Bob にのみ届き、Alice 自身には届かない
        let event: ServerEvent = serde_json::from_str(&rx_bob.recv().await.unwrap()).unwrap();
        match event {
            ServerEvent::TypingUpdate { data } => {
                assert_eq!(data.nickname, "Alice");
                assert!(data.is_typing);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_typing_stop_sets_is_typing_false() {
        // テスト項目: typing_stop で is_typing が false になる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = NotifyTypingUseCase::new(
            registry.clone(),
            pusher.clone(),
            Arc::new(RoomKeyLocks::new()),
        );
        let room_id = RoomIdFactory::generate();
        let conn_alice = bind_connection(&registry, &room_id, "Alice").await;
        let conn_bob = bind_connection(&registry, &room_id, "Bob").await;
        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        pusher.register_client(conn_bob, tx_bob).await;

        // when (操作):
        usecase.execute(conn_alice, false).await.unwrap();

        // then (期待する結果):
        let event: ServerEvent = serde_json::from_str(&rx_bob.recv().await.unwrap()).unwrap();
        match event {
            ServerEvent::TypingUpdate { data } => assert!(!data.is_typing),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_typing_from_unbound_connection_fails() {
        // テスト項目: 未参加の接続からの typing は NotJoined になり、何も配信されない
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        // broadcast が一度も呼ばれないことをモックで検証する
        let mut mock_pusher = MockMessagePusher::new();
        mock_pusher.expect_broadcast().never();
        let usecase = NotifyTypingUseCase::new(
            registry,
            Arc::new(mock_pusher),
            Arc::new(RoomKeyLocks::new()),
        );

        // when (操作):
        let result = usecase.execute(ConnectionId::generate(), true).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), SessionEventError::NotJoined);
    }
}
