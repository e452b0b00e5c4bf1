//! MessagePusher trait 定義
//!
//! 接続中のクライアントへイベントを送り届けるためのインターフェース。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// クライアントへの送信チャンネル
///
/// WebSocket 接続ごとに1本生成され、UI 層の送信タスクが受信側を保持する。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// 接続単位の送信（push_to）とファンアウト（broadcast）を提供する。
///
/// ## 契約
///
/// - `broadcast` は配信先ごとの失敗（切断済みの接続など）を握りつぶし、
///   残りの配信先への送信を継続する（fire-and-forget）
/// - `push_to` は単一の接続への送信で、失敗をエラーとして返す
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録する
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除する
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にイベントを送信する
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントをブロードキャストする
    ///
    /// 配信先のスナップショットは呼び出し側が作る。個別の送信失敗は
    /// ログに残して継続し、エラーにはしない。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
