//! WebSocket telemetry endpoint
//!
//! Each client subscribes to the broadcast channel and receives every
//! event as a JSON text frame. Inbound frames are ignored apart from
//! close. A client that lags behind the channel buffer skips the
//! missed events and keeps receiving from the current position.

use crate::api::AppContext;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// GET /ws/:client_id
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(ctx): State<AppContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, ctx))
}

async fn handle_socket(mut socket: WebSocket, client_id: String, ctx: AppContext) {
    let mut events = ctx.state.subscribe_events();
    info!("WebSocket client {} connected", client_id);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!("Failed to serialize {}: {}", event.event_type(), e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client {} lagged, skipped {} events", client_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(other)) => {
                        debug!("Ignoring inbound frame from {}: {:?}", client_id, other);
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }

    info!("WebSocket client {} disconnected", client_id);
}
