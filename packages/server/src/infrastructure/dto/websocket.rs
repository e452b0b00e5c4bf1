//! WebSocket イベント DTO 定義
//!
//! インバウンド（[`ClientEvent`]）とアウトバウンド（[`ServerEvent`]）の
//! イベントを閉じたタグ付きユニオンとして定義します。境界で一度だけ
//! デシリアライズし、未知の type や欠けたフィールドはその時点で
//! プロトコルエラーとして扱います（UseCase 層には到達しない）。

use serde::{Deserialize, Serialize};

/// クライアントから届くイベント
///
/// ワイヤ形式: `{ "type": "...", ...fields }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// ルームへの参加要求
    JoinRoom {
        room_id: String,
        #[serde(default)]
        nickname: Option<String>,
    },
    /// ルームからの明示的な退出
    LeaveRoom,
    /// メッセージ送信
    SendMessage { message: String },
    /// 入力開始の通知
    TypingStart,
    /// 入力終了の通知
    TypingStop,
    /// 既読の通知
    MessageRead { message_id: String },
}

/// サーバーからクライアントへ送るイベント
///
/// ワイヤ形式: `{ "type": "...", "data": {...} }`（error のみ `"error": "..."`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// join の成功応答。参加者自身にのみ送られるスナップショット
    RoomJoined { data: RoomJoinedData },
    /// 参加者リストの変化（join / leave / disconnect 後の全員へ）
    ParticipantUpdate { data: ParticipantUpdateData },
    /// 新着メッセージ（送信者含む全員へ）
    NewMessage { data: MessageDto },
    /// 入力状態の変化（送信者以外へ）
    TypingUpdate { data: TypingUpdateData },
    /// 既読通知の中継（送信者含む全員へ）
    MessageRead { data: MessageReadData },
    /// ルームの破棄通知
    RoomDestroyed { data: RoomDestroyedData },
    /// 要求元の接続にのみ返すエラー
    Error { error: String },
}

impl ServerEvent {
    /// JSON テキストフレームへシリアライズする
    pub fn to_json(&self) -> String {
        // 文字列キーのみの構造なのでシリアライズは失敗しない
        serde_json::to_string(self).expect("ServerEvent serialization should not fail")
    }
}

/// 参加者情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub nickname: String,
    pub joined_at: i64,
}

/// メッセージ情報
///
/// `read_by` / `delivered_to` はクライアント側の投影用で、サーバーでは
/// 保持しない（常に空で送出される）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub room_id: String,
    /// 参加者 ID。匿名・システムメッセージでは空文字列
    pub sender_id: String,
    pub sender_nickname: String,
    pub content: String,
    pub timestamp: i64,
    pub read_by: Vec<String>,
    pub delivered_to: Vec<String>,
}

/// room_joined のペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedData {
    pub room_id: String,
    pub participant: ParticipantDto,
    /// 参加時点の全メッセージ履歴（追加順）
    pub messages: Vec<MessageDto>,
}

/// participant_update のペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantUpdateData {
    pub participants: Vec<ParticipantDto>,
    pub count: usize,
}

/// typing_update のペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUpdateData {
    pub user_id: String,
    pub nickname: String,
    pub is_typing: bool,
}

/// message_read のペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReadData {
    pub message_id: String,
    pub reader_id: String,
    pub reader_nickname: String,
}

/// room_destroyed のペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDestroyedData {
    pub room_id: String,
}
