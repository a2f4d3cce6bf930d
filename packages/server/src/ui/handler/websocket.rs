//! WebSocket connection handler: the synchronization protocol dispatcher.
//!
//! Per-connection state machine: CONNECTING → JOINED → CLOSED. The room must
//! exist at connect time or the upgrade is refused. Once joined, inbound
//! messages are dispatched by their `type` field; unrecognized types are
//! discarded so newer clients keep working against this server.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{
        ChatText, ConnectionId, DomainError, PlaybackState, PusherChannel, PusherEvent,
        RoomCode, SessionId, Username,
    },
    infrastructure::dto::websocket::{
        ChatMessage, ChatRequest, ErrorMessage, InboundEnvelope, JoinRequest, MessageType,
        PongMessage, RoleMessage, SyncMessage, UserJoinedMessage, UserLeftMessage,
    },
    ui::state::AppState,
    usecase::{ConnectSessionError, JoinRoomError, SyncPlaybackError},
};

/// Transient per-connection state.
///
/// `session_id` is unset until the first join message; `is_host` is
/// recomputed on every join so a reloading host gets its role back.
#[derive(Debug, Clone)]
struct SessionState {
    room_code: RoomCode,
    connection_id: ConnectionId,
    session_id: Option<SessionId>,
    username: Username,
    is_host: bool,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_code): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let room_code = match RoomCode::try_from(room_code) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!("Rejecting connection with invalid room code: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let connection_id = ConnectionId::generate();

    // Create a channel for this client to receive fan-out messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Verify the room exists and register the session with its broadcast
    // group before upgrading
    let snapshot = match state
        .connect_session_usecase
        .execute(&room_code, connection_id, tx.clone())
        .await
    {
        Ok(snapshot) => snapshot,
        Err(ConnectSessionError::RoomNotFound) => {
            tracing::warn!("Connection refused: room '{}' not found", room_code);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(ConnectSessionError::Storage(e)) => {
            tracing::error!("Registry lookup failed for room '{}': {}", room_code, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    tracing::info!(
        "Connection '{}' accepted for room '{}'",
        connection_id,
        room_code
    );

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, state, room_code, connection_id, tx, rx, snapshot)
    }))
}

/// Spawns a task that receives fan-out events from the rx channel and pushes
/// them to the WebSocket sender.
///
/// A `Close` event force-closes the socket; the room was torn down while
/// this session was still connected.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PusherEvent>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PusherEvent::Message(msg) => {
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                PusherEvent::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room_code: RoomCode,
    connection_id: ConnectionId,
    tx: PusherChannel,
    rx: mpsc::UnboundedReceiver<PusherEvent>,
    snapshot: PlaybackState,
) {
    let (mut sender, mut receiver) = socket.split();

    // Send the playback snapshot first so late joiners start at the room's
    // current position instead of zero
    let snapshot_msg = SyncMessage {
        r#type: MessageType::Sync,
        current_time: snapshot.current_time(),
        is_playing: snapshot.is_playing(),
    };
    let snapshot_json = serde_json::to_string(&snapshot_msg).unwrap();
    if let Err(e) = sender.send(Message::Text(snapshot_json.into())).await {
        tracing::error!(
            "Failed to send snapshot to connection '{}': {}",
            connection_id,
            e
        );
        // 受付済みのセッションをグループに残さない
        state
            .disconnect_session_usecase
            .execute(&room_code, &connection_id, false, None)
            .await;
        return;
    }

    let session = Arc::new(Mutex::new(SessionState {
        room_code: room_code.clone(),
        connection_id,
        session_id: None,
        username: Username::anonymous(),
        is_host: false,
    }));

    // Spawn a task to forward fan-out events to this client
    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to receive messages from this client
    let session_clone = session.clone();
    let state_clone = state.clone();
    let tx_clone = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let closing =
                        handle_text(&text, &state_clone, &session_clone, &tx_clone).await;
                    if closing {
                        break;
                    }
                }
                Message::Ping(_) => {
                    // Transport-level ping/pong is handled by the WebSocket
                    // protocol itself; the app-level ping is a JSON message
                    tracing::debug!("Received transport ping");
                }
                Message::Close(_) => {
                    tracing::debug!("Client requested close");
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

    // Disconnect: host departure starts the room's grace period, an
    // identified viewer notifies the remaining members. The group removal
    // inside the usecase happens exactly once either way.
    let session = session.lock().await;
    let user_left_message = if !session.is_host && session.session_id.is_some() {
        let left_msg = UserLeftMessage {
            r#type: MessageType::UserLeft,
            username: session.username.as_str().to_string(),
        };
        Some(serde_json::to_string(&left_msg).unwrap())
    } else {
        None
    };
    state
        .disconnect_session_usecase
        .execute(
            &session.room_code,
            &session.connection_id,
            session.is_host,
            user_left_message,
        )
        .await;

    tracing::info!(
        "Connection '{}' disconnected from room '{}'",
        session.connection_id,
        session.room_code
    );
}

/// Queue a reply to this connection only
fn reply(tx: &PusherChannel, json: String) {
    if tx.send(PusherEvent::Message(json)).is_err() {
        tracing::warn!("Failed to queue reply, connection is closing");
    }
}

fn reply_error(tx: &PusherChannel, message: &str) {
    let error_json = serde_json::to_string(&ErrorMessage::new(message)).unwrap();
    reply(tx, error_json);
}

/// Dispatch one inbound text frame. Returns `true` when the connection must
/// close (terminal error).
async fn handle_text(
    text: &str,
    state: &Arc<AppState>,
    session: &Arc<Mutex<SessionState>>,
    tx: &PusherChannel,
) -> bool {
    let envelope: InboundEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Undecodable message: {}", e);
            reply_error(tx, "Invalid message format");
            return false;
        }
    };

    match envelope.r#type.as_str() {
        "ping" => {
            // Latency probe; reply to the sender only
            let pong = serde_json::to_string(&PongMessage {
                r#type: MessageType::Pong,
            })
            .unwrap();
            reply(tx, pong);
            false
        }
        "join" => handle_join(text, state, session, tx).await,
        "sync" => {
            handle_sync(text, state, session, tx).await;
            false
        }
        "chat" => {
            handle_chat(text, state, session, tx).await;
            false
        }
        other => {
            // 前方互換のため未知の種別は黙って捨てる
            tracing::debug!("Ignoring message with unknown type '{}'", other);
            false
        }
    }
}

async fn handle_join(
    text: &str,
    state: &Arc<AppState>,
    session: &Arc<Mutex<SessionState>>,
    tx: &PusherChannel,
) -> bool {
    let request: JoinRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Malformed join message: {}", e);
            reply_error(tx, "Invalid join message");
            return false;
        }
    };

    let session_id = match SessionId::try_from(request.session_id) {
        Ok(session_id) => session_id,
        Err(e) => {
            reply_error(tx, &e.to_string());
            return false;
        }
    };
    let username = match request.username {
        Some(name) => match Username::try_from(name) {
            Ok(username) => username,
            Err(e) => {
                reply_error(tx, &e.to_string());
                return false;
            }
        },
        None => Username::anonymous(),
    };

    let (room_code, connection_id) = {
        let session = session.lock().await;
        (session.room_code.clone(), session.connection_id)
    };

    match state.join_room_usecase.execute(&room_code, &session_id).await {
        Ok(outcome) => {
            {
                let mut session = session.lock().await;
                session.session_id = Some(session_id);
                session.username = username.clone();
                session.is_host = outcome.is_host;
            }

            // Reply with the resolved role, then tell everyone else
            let role_msg = RoleMessage {
                r#type: MessageType::Role,
                is_host: outcome.is_host,
                video_url: outcome.video_url.as_str().to_string(),
            };
            reply(tx, serde_json::to_string(&role_msg).unwrap());

            let joined_msg = UserJoinedMessage {
                r#type: MessageType::UserJoined,
                username: username.as_str().to_string(),
            };
            let joined_json = serde_json::to_string(&joined_msg).unwrap();
            state
                .join_room_usecase
                .broadcast_user_joined(&room_code, &connection_id, &joined_json)
                .await;

            tracing::info!(
                "'{}' joined room '{}' as {}",
                username.as_str(),
                room_code,
                if outcome.is_host { "host" } else { "viewer" }
            );
            false
        }
        Err(JoinRoomError::RoomNotFound) => {
            reply_error(tx, "Room no longer exists");
            true
        }
        Err(JoinRoomError::Storage(e)) => {
            tracing::error!("Registry lookup failed during join: {}", e);
            reply_error(tx, "Internal error, please retry");
            false
        }
    }
}

async fn handle_sync(
    text: &str,
    state: &Arc<AppState>,
    session: &Arc<Mutex<SessionState>>,
    tx: &PusherChannel,
) {
    let request: SyncMessage = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Malformed sync message: {}", e);
            reply_error(tx, "Invalid sync message");
            return;
        }
    };

    let playback = match PlaybackState::new(request.current_time, request.is_playing) {
        Ok(playback) => playback,
        Err(e) => {
            reply_error(tx, &e.to_string());
            return;
        }
    };

    let (room_code, is_host) = {
        let session = session.lock().await;
        (session.room_code.clone(), session.is_host)
    };

    let outbound = SyncMessage {
        r#type: MessageType::Sync,
        current_time: playback.current_time(),
        is_playing: playback.is_playing(),
    };
    let json = serde_json::to_string(&outbound).unwrap();

    match state
        .sync_playback_usecase
        .execute(&room_code, is_host, playback, json)
        .await
    {
        Ok(()) => {}
        Err(SyncPlaybackError::NotHost) => {
            reply_error(tx, "Only the host can control playback");
        }
        Err(SyncPlaybackError::RoomNotFound) => {
            reply_error(tx, "Room no longer exists");
        }
        Err(SyncPlaybackError::Storage(e)) => {
            tracing::error!("Registry update failed during sync: {}", e);
            reply_error(tx, "Internal error, please retry");
        }
    }
}

async fn handle_chat(
    text: &str,
    state: &Arc<AppState>,
    session: &Arc<Mutex<SessionState>>,
    tx: &PusherChannel,
) {
    let request: ChatRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Malformed chat message: {}", e);
            reply_error(tx, "Invalid chat message");
            return;
        }
    };

    let chat_text = match ChatText::new(request.message) {
        Ok(chat_text) => chat_text,
        Err(DomainError::EmptyChatMessage) => {
            // 空白だけのメッセージは黙って捨てる
            return;
        }
        Err(e) => {
            reply_error(tx, &e.to_string());
            return;
        }
    };

    let (room_code, username) = {
        let session = session.lock().await;
        (session.room_code.clone(), session.username.clone())
    };

    let chat_msg = ChatMessage {
        r#type: MessageType::Chat,
        message: chat_text.as_str().to_string(),
        username: username.as_str().to_string(),
    };
    let json = serde_json::to_string(&chat_msg).unwrap();
    state.send_chat_usecase.execute(&room_code, &json).await;
}
