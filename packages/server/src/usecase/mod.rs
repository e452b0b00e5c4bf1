//! UseCase 層
//!
//! プロトコルの1操作につき1つの UseCase を定義します。
//! 各 UseCase は Repository / ConnectionRegistry / MessagePusher を組み合わせ、
//! ルーム単位のロックの内側で {Store の変更, Registry の更新, ブロードキャスト}
//! を1つの単位として実行します。

mod create_room;
mod destroy_room;
mod error;
mod get_room_detail;
mod get_rooms;
mod join_room;
mod leave_room;
mod read_receipt;
mod reap_idle_rooms;
mod send_message;
mod typing;

pub use create_room::CreateRoomUseCase;
pub use destroy_room::DestroyRoomUseCase;
pub use error::{
    CreateRoomError, DestroyRoomError, GetRoomDetailError, JoinRoomError, SendMessageError,
    SessionEventError,
};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use read_receipt::MarkMessageReadUseCase;
pub use reap_idle_rooms::{ReapIdleRoomsUseCase, spawn_idle_reaper};
pub use send_message::SendMessageUseCase;
pub use typing::NotifyTypingUseCase;
