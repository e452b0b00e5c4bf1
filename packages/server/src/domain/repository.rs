//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatMessage, ConnectionId, MessageContent, Nickname, Participant, ParticipantId,
    RepositoryError, Room, RoomId, Timestamp,
};

/// Room Repository trait
///
/// ルーム・メッセージ・参加者を保持するストアへのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装
/// （インメモリ、将来的にはドキュメントストアなど）には依存しない。
///
/// ## 契約
///
/// - ルームの内容を変更する操作（参加者の追加・削除、メッセージの追加）は
///   渡されたタイムスタンプで `last_activity_at` も更新する
/// - `add_participant` は接続ハンドルに対して冪等（同じ接続の既存エントリを置き換える）
/// - `delete_room` はルームと参加者を削除する。メッセージが別コレクションに
///   ある実装に備えて `delete_messages` を独立した操作として公開する
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを新規作成する。同じ ID のルームが存在する場合はエラー
    async fn create_room(&self, room: Room) -> Result<(), RepositoryError>;

    /// ルームを取得する。存在しない場合は None
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// 全てのルームを取得する
    async fn list_rooms(&self) -> Vec<Room>;

    /// ルームの最終アクティビティ時刻を更新する
    async fn touch_activity(&self, room_id: &RoomId, now: Timestamp)
    -> Result<(), RepositoryError>;

    /// ルームを削除する（参加者も削除される）
    async fn delete_room(&self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// 最終アクティビティが閾値より古いルームの ID を取得する
    async fn list_inactive_rooms(&self, now: Timestamp, threshold_minutes: i64) -> Vec<RoomId>;

    /// メッセージをルームの履歴に追加する。ルームが存在しない場合はエラー
    async fn append_message(
        &self,
        room_id: &RoomId,
        sender_id: Option<ParticipantId>,
        sender_nickname: Nickname,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Result<ChatMessage, RepositoryError>;

    /// ルームのメッセージ履歴を追加順で取得する
    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// ルームのメッセージを全て削除する
    async fn delete_messages(&self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// 参加者を追加する（接続ハンドルに対して冪等）
    async fn add_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<(), RepositoryError>;

    /// 指定した接続に紐づく参加者を削除する。削除された参加者を返す
    async fn remove_participant(
        &self,
        room_id: &RoomId,
        connection: &ConnectionId,
        now: Timestamp,
    ) -> Result<Option<Participant>, RepositoryError>;

    /// ルームの参加者リストを取得する
    async fn list_participants(&self, room_id: &RoomId)
    -> Result<Vec<Participant>, RepositoryError>;
}
