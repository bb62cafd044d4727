//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::util::rate_limit::ConnectionRateLimiter;

use super::hub::{outbox, UPDATE_BUFFER};
use super::session::{Flow, Session};

/// WebSocket upgrade handler; authentication happens in-band via `connect`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (lanes, mut inbox) = outbox(UPDATE_BUFFER);

    let Some(mut session) =
        Session::open(state.commands.clone(), lanes, state.services.clone()).await
    else {
        error!("Game loop unavailable, refusing connection");
        return;
    };
    let conn_id = session.conn_id();
    info!(conn_id = %conn_id, "New WebSocket connection");

    // Writer task: outbound lanes -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(frame) = inbox.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(frame.to_string())).await {
                debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    let rate_limiter = ConnectionRateLimiter::new();

    // Reader loop: WebSocket -> session
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check() {
                    warn!(conn_id = %conn_id, "Rate limited inbound message");
                    continue;
                }
                if session.handle_text(&text).await == Flow::Stop {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    session.close().await;
    writer_handle.abort();

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
