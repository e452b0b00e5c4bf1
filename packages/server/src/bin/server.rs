//! Ephemeral room chat server with WebSocket fan-out.
//!
//! Rooms are created over HTTP, joined over a WebSocket connection, and
//! reaped automatically after a period of inactivity.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin utakata-server
//! cargo run --bin utakata-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use utakata_server::{
    infrastructure::{
        ConnectionRegistry, InMemoryRoomRepository, RoomKeyLocks, WebSocketMessagePusher,
    },
    ui::Server,
    usecase::{
        CreateRoomUseCase, DestroyRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, MarkMessageReadUseCase, NotifyTypingUseCase,
        ReapIdleRoomsUseCase, SendMessageUseCase,
    },
};
use utakata_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "utakata-server")]
#[command(about = "Ephemeral room-based chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Minutes of inactivity after which a room is reaped
    #[arg(long, default_value = "10")]
    idle_threshold_minutes: i64,

    /// Seconds between idle-room sweeps
    #[arg(long, default_value = "300")]
    sweep_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository / Registry / Locks / MessagePusher / Clock
    // 2. UseCases
    // 3. Server

    // 1. Shared state
    let repository = Arc::new(InMemoryRoomRepository::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let locks = Arc::new(RoomKeyLocks::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let clock = Arc::new(SystemClock);

    // 2. UseCases
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(repository.clone(), clock.clone()));
    let destroy_room_usecase = Arc::new(DestroyRoomUseCase::new(
        repository.clone(),
        registry.clone(),
        message_pusher.clone(),
        locks.clone(),
    ));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository.clone()));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        repository.clone(),
        registry.clone(),
        message_pusher.clone(),
        locks.clone(),
        clock.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        registry.clone(),
        message_pusher.clone(),
        locks.clone(),
        clock.clone(),
        leave_room_usecase.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        registry.clone(),
        message_pusher.clone(),
        locks.clone(),
        clock.clone(),
    ));
    let notify_typing_usecase = Arc::new(NotifyTypingUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        locks.clone(),
    ));
    let mark_message_read_usecase = Arc::new(MarkMessageReadUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        locks.clone(),
    ));
    let reap_idle_rooms_usecase = Arc::new(ReapIdleRoomsUseCase::new(
        repository.clone(),
        destroy_room_usecase.clone(),
        clock.clone(),
        args.idle_threshold_minutes,
    ));

    // 3. Create and run the server
    let server = Server::new(
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
        Duration::from_secs(args.sweep_interval_secs),
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
