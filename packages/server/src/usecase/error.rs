//! UseCase 層のエラー定義
//!
//! Display 文字列はそのままワイヤの error イベント・HTTP ステータスの
//! 決定に使われます。

use thiserror::Error;

/// ルーム参加のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinRoomError {
    /// 対象のルームが存在しない（ID の形式不正もここに含む）
    #[error("room not found")]
    RoomNotFound,
}

/// メッセージ送信のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendMessageError {
    /// ルームに参加していない接続からの送信
    #[error("you are not in a room")]
    NotJoined,

    /// 本文が空（trim 後）
    #[error("message must not be empty")]
    EmptyMessage,

    /// 参加中のルームが既に破棄されている
    #[error("room not found")]
    RoomNotFound,
}

/// typing / read receipt など、参加状態だけを前提とするイベントのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionEventError {
    /// ルームに参加していない接続からのイベント
    #[error("you are not in a room")]
    NotJoined,
}

/// ルーム作成のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateRoomError {
    /// 空いているルームコードを確保できなかった
    #[error("failed to allocate a room code")]
    CodeAllocationFailed,
}

/// ルーム破棄のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DestroyRoomError {
    /// 対象のルームが存在しない
    #[error("room not found")]
    RoomNotFound,
}

/// ルーム詳細取得のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GetRoomDetailError {
    /// 対象のルームが存在しない
    #[error("room not found")]
    RoomNotFound,
}
