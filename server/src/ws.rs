use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

use billiards_shared::protocol::{ClientMsg, ServerMsg};

use crate::game_loop::{GameBroadcast, GameCommand};

/// Largest inbound frame or message accepted, in bytes
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Unparsable messages tolerated before the viewer is dropped
pub const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
    pub max_client_msgs_per_sec: u32,
    pub connection_semaphore: Arc<Semaphore>,
    /// Empty allows any origin
    pub allowed_origins: Vec<String>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Response {
    if !origin_allowed(&headers, &app_state.allowed_origins) {
        tracing::warn!(
            "Rejected connection from origin {:?}",
            headers.get(header::ORIGIN)
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    let permit = match app_state.connection_semaphore.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!("Rejected connection: server full");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    ws.max_message_size(MAX_MESSAGE_SIZE)
        .max_frame_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, app_state, permit))
}

fn origin_allowed(headers: &HeaderMap, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) {
        Some(origin) => allowed.iter().any(|a| a == origin),
        None => false,
    }
}

/// Fixed one-second window counter for inbound messages.
struct RateLimiter {
    max_per_sec: u32,
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    fn new(max_per_sec: u32) -> Self {
        Self {
            max_per_sec,
            window_start: Instant::now(),
            count: 0,
        }
    }

    /// Count one message. Returns false once the window's budget is spent.
    fn allow(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= Duration::from_secs(1) {
            self.window_start = now;
            self.count = 0;
        }
        self.count += 1;
        self.count <= self.max_per_sec
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();

    // Join the table
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::ViewerJoin { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send ViewerJoin command");
        return;
    }

    let (my_id, welcome) = match resp_rx.await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Failed to receive welcome");
            return;
        }
    };

    // Subscribe before sending the welcome so no broadcast falls in between
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    tracing::info!("Viewer {} connected", my_id);

    let sent = match serde_json::to_string(&ServerMsg::Welcome(welcome)) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            false
        }
    };

    if sent {
        let mut limiter = RateLimiter::new(app_state.max_client_msgs_per_sec);
        let mut parse_errors = 0u32;

        loop {
            tokio::select! {
                // Viewer -> Server
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !limiter.allow() {
                                tracing::warn!("Viewer {} exceeded message rate, disconnecting", my_id);
                                break;
                            }
                            let client_msg = match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(m) => m,
                                Err(_) => {
                                    parse_errors += 1;
                                    if parse_errors >= MAX_PARSE_ERRORS {
                                        tracing::warn!("Viewer {} sent too many bad messages, disconnecting", my_id);
                                        break;
                                    }
                                    continue;
                                }
                            };
                            let cmd = match client_msg {
                                ClientMsg::TriggerDown => GameCommand::TriggerDown { id: my_id },
                                ClientMsg::TriggerUp { origin, direction } => GameCommand::TriggerUp {
                                    id: my_id,
                                    origin,
                                    direction,
                                },
                                ClientMsg::Activity => GameCommand::Activity,
                            };
                            if app_state.game_tx.send(cmd).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::warn!("Viewer {} socket error: {}", my_id, e);
                            break;
                        }
                        _ => {} // Ignore ping/pong/binary
                    }
                }

                // Server -> Viewer (broadcast)
                result = broadcast_rx.recv() => {
                    match result {
                        Ok(broadcast) => {
                            let msg = match broadcast {
                                GameBroadcast::TableState(m) => ServerMsg::TableState(m),
                                GameBroadcast::Pocketed(m) => ServerMsg::Pocketed(m),
                                GameBroadcast::ShotFired(m) => ServerMsg::ShotFired(m),
                            };
                            if let Ok(json) = serde_json::to_string(&msg) {
                                if sink.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Viewer {} lagged by {} messages", my_id, n);
                            // Next table_state supersedes whatever was skipped
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .game_tx
        .send(GameCommand::ViewerLeave { id: my_id })
        .await;
    tracing::info!("Viewer {} disconnected", my_id);
}
