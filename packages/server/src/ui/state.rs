//! Server state shared across HTTP and WebSocket handlers.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::usecase::{
    CreateRoomUseCase, DestroyRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
    LeaveRoomUseCase, MarkMessageReadUseCase, NotifyTypingUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// DestroyRoomUseCase（ルーム破棄のユースケース）
    pub destroy_room_usecase: Arc<DestroyRoomUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出・切断のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// NotifyTypingUseCase（入力状態通知のユースケース）
    pub notify_typing_usecase: Arc<NotifyTypingUseCase>,
    /// MarkMessageReadUseCase（既読通知のユースケース）
    pub mark_message_read_usecase: Arc<MarkMessageReadUseCase>,
    /// MessagePusher（接続の登録・解除とエラー送信に使う）
    pub message_pusher: Arc<dyn MessagePusher>,
}
