//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// メッセージ本文が空（trim 後）
    #[error("message content must not be empty")]
    EmptyMessageContent,

    /// ルーム ID の形式が不正
    #[error("invalid room id: '{0}'")]
    InvalidRoomId(String),
}

/// Repository 操作のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// 対象のルームが存在しない
    #[error("room not found")]
    RoomNotFound,

    /// 同じ ID のルームが既に存在する
    #[error("room already exists")]
    RoomAlreadyExists,
}

/// メッセージ送信（push）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    /// 対象の接続が登録されていない
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    /// 送信チャンネルへの書き込みに失敗した
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
