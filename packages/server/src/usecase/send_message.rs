//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ送信処理（履歴への追加、送信者を含む全員へのブロードキャスト）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：送信者を含む全接続に new_message が届く
//! - メッセージが Store に追加されてからブロードキャストされることを確認
//! - 空メッセージ・未参加接続からの送信が拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中の接続からの送信とブロードキャスト
//! - 異常系：未参加の接続、空白のみの本文
//! - エッジケース：送信者のみが接続している場合

use std::sync::Arc;

use utakata_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessagePusher, RoomRepository, Timestamp,
};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::{ConnectionRegistry, RoomKeyLocks};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
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

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
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

    /// メッセージ送信を実行
    ///
    /// Store への追加が完了してから、送信者を含むルームの全接続に
    /// new_message をブロードキャストする。
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信元の接続
    /// * `text` - メッセージ本文（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 追加されたメッセージ
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        text: String,
    ) -> Result<ChatMessage, SendMessageError> {
        let binding = self
            .registry
            .lookup(&connection_id)
            .await
            .ok_or(SendMessageError::NotJoined)?;
        let content = MessageContent::new(text).map_err(|_| SendMessageError::EmptyMessage)?;

        let _guard = self.locks.acquire(&binding.room_id).await;

        // ロック獲得までの間に退出・ルーム破棄が起きていないか確認する
        let binding = self
            .registry
            .lookup(&connection_id)
            .await
            .ok_or(SendMessageError::NotJoined)?;

        let now = Timestamp::new(self.clock.now_jst_millis());

        // 1. Store にメッセージを追加（ブロードキャストより先）
        let message = self
            .repository
            .append_message(
                &binding.room_id,
                Some(binding.participant.id),
                binding.participant.nickname.clone(),
                content,
                now,
            )
            .await
            .map_err(|_| SendMessageError::RoomNotFound)?;

        // 2. 送信者を含む全接続へ new_message をブロードキャスト
        let event = ServerEvent::NewMessage {
            data: message.clone().into(),
        };
        let targets = self.registry.list_connections(&binding.room_id).await;
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &event.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast new_message: {}", e);
        }

        tracing::debug!(
            "Message '{}' appended to room '{}' by '{}'",
            message.id,
            binding.room_id,
            binding.participant.nickname.as_str()
        );
        Ok(message)
    }
}
