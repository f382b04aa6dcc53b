//! WebSocket handler relaying project events to companion clients.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use super::state::AppState;

/// WebSocket upgrade handler.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.subscribe();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(_) => continue,
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Drain incoming messages until the client hangs up.
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Text(text) = msg {
            debug!("Received WebSocket message: {}", text);
        }
    }

    send_task.abort();
    info!("WebSocket client disconnected");
}
