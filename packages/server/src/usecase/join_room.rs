//! UseCase: ルーム参加処理
//!
//! ## 順序の保証
//!
//! 参加者本人へのスナップショット送信（room_joined）は、同じ join が
//! 引き起こす participant_update のブロードキャストより必ず先に行われます。
//! 両方をルームロックの内側で行うため、参加直後のメッセージ配信が
//! スナップショットを追い越すこともありません。

use std::sync::Arc;

use utakata_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, Nickname, Participant, ParticipantId, RoomId, RoomRepository,
    Timestamp,
};
use crate::infrastructure::dto::websocket::{ParticipantUpdateData, RoomJoinedData, ServerEvent};
use crate::infrastructure::{ConnectionRegistry, RoomKeyLocks};

use super::error::JoinRoomError;
use super::leave_room::LeaveRoomUseCase;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
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
    /// 既存の束縛を解除するための退出ユースケース
    leave_room_usecase: Arc<LeaveRoomUseCase>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        locks: Arc<RoomKeyLocks>,
        clock: Arc<dyn Clock>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
            locks,
            clock,
            leave_room_usecase,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `room_id` - クライアントが指定したルームコード（未検証の文字列）
    /// * `nickname` - 任意のニックネーム。省略時は "Anonymous"
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 参加に成功。参加者の新しい識別子
    /// * `Err(JoinRoomError)` - ルームが存在しない（コード不正も含む）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        nickname: Option<String>,
    ) -> Result<Participant, JoinRoomError> {
        // 形式不正なコードは存在し得ないルームとして扱う
        let room_id =
            RoomId::new(room_id.to_string()).map_err(|_| JoinRoomError::RoomNotFound)?;

        // 既に別のルーム（または同じルーム）に束縛されている場合は先に退出する。
        // 接続ハンドルは同時に1つのルームにしか束縛されない
        if self.registry.lookup(&connection_id).await.is_some() {
            self.leave_room_usecase.execute(connection_id).await;
        }

        let _guard = self.locks.acquire(&room_id).await;

        if self.repository.get_room(&room_id).await.is_none() {
            return Err(JoinRoomError::RoomNotFound);
        }

        let now = Timestamp::new(self.clock.now_jst_millis());
        let participant = Participant::new(
            ParticipantId::generate(),
            nickname
                .map(|raw| Nickname::new(&raw))
                .unwrap_or_default(),
            connection_id,
            now,
        );

        // 1. Store と Registry を同じイベント処理の中で更新する
        self.repository
            .add_participant(&room_id, participant.clone())
            .await
            .map_err(|_| JoinRoomError::RoomNotFound)?;
        self.registry
            .bind(connection_id, room_id.clone(), participant.clone())
            .await;

        // 2. 参加者本人へスナップショットを送信（participant_update より先）
        let messages = self
            .repository
            .list_messages(&room_id)
            .await
            .unwrap_or_default();
        let snapshot = ServerEvent::RoomJoined {
            data: RoomJoinedData {
                room_id: room_id.as_str().to_string(),
                participant: participant.clone().into(),
                messages: messages.into_iter().map(Into::into).collect(),
            },
        };
        if let Err(e) = self
            .message_pusher
            .push_to(&connection_id, &snapshot.to_json())
            .await
        {
            tracing::warn!(
                "Failed to send room_joined snapshot to '{}': {}",
                connection_id,
                e
            );
        }

        // 3. 参加者本人を含む全接続へ participant_update をブロードキャスト
        let participants = self
            .repository
            .list_participants(&room_id)
            .await
            .unwrap_or_default();
        let update = ServerEvent::ParticipantUpdate {
            data: ParticipantUpdateData::from_participants(participants),
        };
        let targets = self.registry.list_connections(&room_id).await;
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &update.to_json())
            .await
        {
            tracing::warn!("Failed to broadcast participant_update: {}", e);
        }

        tracing::info!(
            "Connection '{}' joined room '{}' as '{}'",
            connection_id,
            room_id,
            participant.nickname.as_str()
        );
        Ok(participant)
    }
}
