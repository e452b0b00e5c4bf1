//! Server execution logic.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::domain::MessagePusher;
use crate::usecase::{
    CreateRoomUseCase, DestroyRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
    LeaveRoomUseCase, MarkMessageReadUseCase, NotifyTypingUseCase, ReapIdleRoomsUseCase,
    SendMessageUseCase, spawn_idle_reaper,
};

use super::{
    handler::{
        create_room, destroy_room, get_room_detail, get_rooms, health_check, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Ephemeral room chat server
///
/// Encapsulates the assembled use cases and runs the axum server together
/// with the idle-reaper background task.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(/* use cases */);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    create_room_usecase: Arc<CreateRoomUseCase>,
    /// DestroyRoomUseCase（ルーム破棄のユースケース）
    destroy_room_usecase: Arc<DestroyRoomUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出・切断のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// NotifyTypingUseCase（入力状態通知のユースケース）
    notify_typing_usecase: Arc<NotifyTypingUseCase>,
    /// MarkMessageReadUseCase（既読通知のユースケース）
    mark_message_read_usecase: Arc<MarkMessageReadUseCase>,
    /// ReapIdleRoomsUseCase（非アクティブルーム回収のユースケース）
    reap_idle_rooms_usecase: Arc<ReapIdleRoomsUseCase>,
    /// MessagePusher（接続の登録・解除）
    message_pusher: Arc<dyn MessagePusher>,
    /// Idle Reaper の起動間隔
    sweep_interval: Duration,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        create_room_usecase: Arc<CreateRoomUseCase>,
        destroy_room_usecase: Arc<DestroyRoomUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        notify_typing_usecase: Arc<NotifyTypingUseCase>,
        mark_message_read_usecase: Arc<MarkMessageReadUseCase>,
        reap_idle_rooms_usecase: Arc<ReapIdleRoomsUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            create_room_usecase,
            destroy_room_usecase,
            get_room_detail_usecase,
            get_rooms_usecase,
            join_room_usecase,
            leave_room_usecase,
            send_message_usecase,
            notify_typing_usecase,
            mark_message_read_usecase,
            reap_idle_rooms_usecase,
            message_pusher,
            sweep_interval,
        }
    }

    /// Run the chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            create_room_usecase: self.create_room_usecase,
            destroy_room_usecase: self.destroy_room_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
            get_rooms_usecase: self.get_rooms_usecase,
            join_room_usecase: self.join_room_usecase,
            leave_room_usecase: self.leave_room_usecase,
            send_message_usecase: self.send_message_usecase,
            notify_typing_usecase: self.notify_typing_usecase,
            mark_message_read_usecase: self.mark_message_read_usecase,
            message_pusher: self.message_pusher,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/rooms", post(create_room).get(get_rooms))
            .route(
                "/rooms/{room_id}",
                get(get_room_detail).delete(destroy_room),
            )
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Start the Idle Reaper on its fixed interval
        let reaper_task = spawn_idle_reaper(self.reap_idle_rooms_usecase, self.sweep_interval);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Utakata chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        reaper_task.abort();
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
