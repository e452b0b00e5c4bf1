//! UseCase: 既読通知の中継処理
//!
//! 既読状態はサーバーでは保持しません。message_read イベントは検証せずに
//! そのままルームへ中継されます（best-effort）。UI が「既読にした」ことを
//! 本人にも表示できるよう、送信者自身も配信対象に含まれます。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher};
use crate::infrastructure::dto::websocket::{MessageReadData, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomKeyLocks};

use super::error::SessionEventError;

/// 既読通知のユースケース
pub struct MarkMessageReadUseCase {
    /// Connection Registry（接続とルームの対応）
    registry: Arc<ConnectionRegistry>,
    /// MessagePusher（イベント通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム単位のロック
    locks: Arc<RoomKeyLocks>,
}

impl MarkMessageReadUseCase {
    /// 新しい MarkMessageReadUseCase を作成
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

    /// 既読通知をルームへ中継する
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 既読にした接続
    /// * `message_id` - 既読になったメッセージの ID（未検証のまま中継）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        message_id: String,
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

        let event = ServerEvent::MessageRead {
            data: MessageReadData {
                message_id,
                reader_id: binding.participant.id.to_string(),
                reader_nickname: binding.participant.nickname.as_str().to_string(),
            },
        };

        // 送信者本人を含む全接続へブロードキャスト
        let targets = self.registry.list_connections(&binding.room_id).await;
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &event.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast message_read: {}", e);
        }

        Ok(())
    }
}
