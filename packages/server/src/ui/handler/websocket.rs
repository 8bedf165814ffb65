//! WebSocket connection handler.
//!
//! One task pair per socket: the receive loop decodes client frames and
//! dispatches them to the `ChatService`; the pusher loop drains the
//! connection's outbound channel into the socket.

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

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, JoinRequest},
    infrastructure::dto::websocket::ClientFrame,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames addressed to this connection
/// * `sender` - WebSocket sink of this connection
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
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
    let connection_id = ConnectionIdFactory::generate();
    let (tx, rx) = mpsc::unbounded_channel();

    if let Err(e) = state.chat_service.on_connect(connection_id.clone(), tx).await {
        tracing::error!("Failed to register connection '{}': {}", connection_id, e);
        return;
    }

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", recv_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => dispatch(&recv_state, &recv_id, text.as_str()).await,
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.chat_service.on_disconnect(&connection_id).await {
        tracing::warn!("Disconnect of '{}' ignored: {}", connection_id, e);
    }
}

/// Decode one client frame and hand it to the chat service.
async fn dispatch(state: &AppState, id: &ConnectionId, text: &str) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Dropping unreadable frame from '{}': {}", id, e);
            return;
        }
    };

    match frame {
        ClientFrame::Join(payload) => {
            let request = JoinRequest::from(payload);
            if let Err(e) = state.chat_service.on_join(id, request).await {
                tracing::warn!("Join from '{}' failed: {}", id, e);
            }
        }
        ClientFrame::Message(payload) => {
            if let Err(e) = state.chat_service.on_message(id, payload.into_text()).await {
                tracing::debug!("Message from '{}' dropped: {}", id, e);
            }
        }
    }
}
