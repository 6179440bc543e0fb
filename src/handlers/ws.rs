use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const TENANT_CHANNELS: [&str; 3] = ["dashboard", "comments", "posts"];

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /ws?token=... - live updates. Browsers cannot set headers on a
/// WebSocket handshake, so the JWT rides in the query string.
pub async fn upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let claims = validate_jwt(&query.token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;
    let user = AuthUser::from(claims);

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user, socket)))
}

async fn handle_socket(state: AppState, user: AuthUser, socket: WebSocket) {
    info!(user_id = %user.user_id, "websocket connected");
    let (mut sink, mut stream) = socket.split();

    // One forwarding task per subscription, all funneled into the sink
    // through an mpsc channel.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(64);

    let mut forwarders = Vec::new();
    forwarders.push(tokio::spawn(forward(
        state.hub.subscribe_user(user.user_id),
        tx.clone(),
    )));
    if let Some(tenant_id) = user.tenant_id {
        for channel in TENANT_CHANNELS {
            forwarders.push(tokio::spawn(forward(
                state.hub.subscribe_tenant(tenant_id, channel),
                tx.clone(),
            )));
        }
    }
    drop(tx);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if sink.send(Message::Text(event)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(msg))) => {
                        // Connectivity check: "hello:<name>" gets a greeting
                        // back; anything else is ignored.
                        if let Some(name) = msg.strip_prefix("hello:") {
                            let reply = format!("Hello, {}!", name.trim());
                            if sink.send(Message::Text(reply)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(user_id = %user.user_id, error = %e, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    for task in forwarders {
        task.abort();
    }
    info!(user_id = %user.user_id, "websocket disconnected");
}

async fn forward(
    mut rx: tokio::sync::broadcast::Receiver<String>,
    tx: tokio::sync::mpsc::Sender<String>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                // Slow consumer; drop the missed events and keep going.
                warn!(skipped, "websocket subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
