//! WebSocket connection handlers.
//!
//! A connection starts UNBOUND: it is registered with the MessagePusher at
//! upgrade time (so it can receive `error` events), and only binds to a room
//! when a `join_room` event arrives. Inbound frames are deserialized into the
//! closed [`ClientEvent`] union at this boundary; anything that does not parse
//! is answered with a generic `error` event on the offending connection only.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, MessagePusher};
use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives events from the rx channel and pushes them to
/// the WebSocket sender.
///
/// This is the outbound half of the connection: everything the use cases
/// produce for this connection (snapshots, broadcasts, errors) flows through
/// the channel and out of this task.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    state.message_pusher.register_client(connection_id, tx).await;
    tracing::info!("Connection '{}' opened", connection_id);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_client_event(&state_clone, connection_id, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping on '{}'", connection_id);
                }
                _ => {}
            }
        }
    });

    // Whichever half finishes first takes the other one down with it
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }

    // Disconnect path: leave the room (idempotent), then drop the channel.
    // Transport close is the only cancellation signal.
    state.leave_room_usecase.execute(connection_id).await;
    state.message_pusher.unregister_client(&connection_id).await;
    tracing::info!("Connection '{}' closed", connection_id);
}

/// Parse one inbound text frame and dispatch it to the matching use case.
///
/// Use-case errors and parse failures are reported to this connection only;
/// they never become broadcasts.
async fn dispatch_client_event(state: &Arc<AppState>, connection_id: ConnectionId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection_id, e);
            send_error(state, &connection_id, "invalid message format").await;
            return;
        }
    };

    tracing::debug!("Dispatching {:?} from '{}'", event, connection_id);
    match event {
        ClientEvent::JoinRoom { room_id, nickname } => {
            if let Err(e) = state
                .join_room_usecase
                .execute(connection_id, &room_id, nickname)
                .await
            {
                send_error(state, &connection_id, &e.to_string()).await;
            }
        }
        ClientEvent::LeaveRoom => {
            state.leave_room_usecase.execute(connection_id).await;
        }
        ClientEvent::SendMessage { message } => {
            if let Err(e) = state
                .send_message_usecase
                .execute(connection_id, message)
                .await
            {
                send_error(state, &connection_id, &e.to_string()).await;
            }
        }
        ClientEvent::TypingStart => {
            if let Err(e) = state.notify_typing_usecase.execute(connection_id, true).await {
                send_error(state, &connection_id, &e.to_string()).await;
            }
        }
        ClientEvent::TypingStop => {
            if let Err(e) = state
                .notify_typing_usecase
                .execute(connection_id, false)
                .await
            {
                send_error(state, &connection_id, &e.to_string()).await;
            }
        }
        ClientEvent::MessageRead { message_id } => {
            if let Err(e) = state
                .mark_message_read_usecase
                .execute(connection_id, message_id)
                .await
            {
                send_error(state, &connection_id, &e.to_string()).await;
            }
        }
    }
}

/// Send an error event to a single connection.
async fn send_error(state: &Arc<AppState>, connection_id: &ConnectionId, message: &str) {
    let event = ServerEvent::Error {
        error: message.to_string(),
    };
    if let Err(e) = state
        .message_pusher
        .push_to(connection_id, &event.to_json())
        .await
    {
        tracing::warn!("Failed to send error to '{}': {}", connection_id, e);
    }
}
