//! WebSocket client session management.

use std::{sync::Arc, time::Instant};

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use enkai_server::infrastructure::dto::websocket::{
    ChatMessage, ChatRequest, ErrorMessage, InboundEnvelope, JoinRequest, MessageType,
    RoleMessage, RoomClosedMessage, SyncMessage, UserJoinedMessage, UserLeftMessage,
};

use crate::{
    domain::{InputCommand, estimate_position, parse_input},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Last sync event and when it arrived, for local position estimation
#[derive(Debug, Clone, Copy)]
struct PlaybackSnapshot {
    current_time: f64,
    is_playing: bool,
    received_at: Instant,
}

/// Session view shared between the read and write tasks
struct ClientState {
    is_host: bool,
    last_sync: Option<PlaybackSnapshot>,
    ping_sent_at: Option<Instant>,
}

/// How the server side of the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadOutcome {
    /// The server closed the room; no reconnection will bring it back
    RoomClosed,
    /// The connection dropped uncleanly
    ConnectionLost,
    /// The stream ended without an error
    Ended,
}

/// Run the watch-party client session
pub async fn run_client_session(
    url: &str,
    room_code: &str,
    session_id: &str,
    username: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ws_url = format!("{}/ws/rooms/{}", url.trim_end_matches('/'), room_code);

    let (ws_stream, _response) = match connect_async(&ws_url).await {
        Ok(result) => result,
        Err(e) => {
            // A 404 on the upgrade request means the room does not exist
            if let tokio_tungstenite::tungstenite::Error::Http(response) = &e
                && response.status().as_u16() == 404
            {
                return Err(Box::new(ClientError::RoomNotFound(room_code.to_string())));
            }

            let error_msg = e.to_string();
            if error_msg.contains("404") {
                return Err(Box::new(ClientError::RoomNotFound(room_code.to_string())));
            }

            return Err(Box::new(ClientError::ConnectionError(error_msg)));
        }
    };

    tracing::info!("Connected to room '{}'", room_code);
    println!(
        "\nYou are '{}' in room '{}'. Type /help for commands, Ctrl+C to exit.\n",
        username, room_code
    );

    let (mut write, mut read) = ws_stream.split();

    // Identify ourselves right away so the server can resolve our role
    let join_msg = JoinRequest {
        r#type: MessageType::Join,
        session_id: session_id.to_string(),
        username: Some(username.to_string()),
    };
    let join_json = serde_json::to_string(&join_msg)?;
    write.send(Message::Text(join_json.into())).await?;

    let state = Arc::new(Mutex::new(ClientState {
        is_host: false,
        last_sync: None,
        ping_sent_at: None,
    }));

    // Clone for the read task
    let username_for_read = username.to_string();
    let state_for_read = state.clone();

    // Spawn a task to handle incoming messages
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let envelope: InboundEnvelope = match serde_json::from_str(&text) {
                        Ok(envelope) => envelope,
                        Err(_) => {
                            print!("{}", MessageFormatter::format_raw_message(&text));
                            redisplay_prompt(&username_for_read);
                            continue;
                        }
                    };

                    match envelope.r#type.as_str() {
                        "sync" => {
                            if let Ok(sync) = serde_json::from_str::<SyncMessage>(&text) {
                                {
                                    let mut state = state_for_read.lock().await;
                                    state.last_sync = Some(PlaybackSnapshot {
                                        current_time: sync.current_time,
                                        is_playing: sync.is_playing,
                                        received_at: Instant::now(),
                                    });
                                }
                                print!(
                                    "{}",
                                    MessageFormatter::format_sync(
                                        sync.current_time,
                                        sync.is_playing
                                    )
                                );
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        "role" => {
                            if let Ok(role) = serde_json::from_str::<RoleMessage>(&text) {
                                {
                                    let mut state = state_for_read.lock().await;
                                    state.is_host = role.is_host;
                                }
                                print!(
                                    "{}",
                                    MessageFormatter::format_role(role.is_host, &role.video_url)
                                );
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        "chat" => {
                            if let Ok(chat) = serde_json::from_str::<ChatMessage>(&text) {
                                print!(
                                    "{}",
                                    MessageFormatter::format_chat_message(
                                        &chat.username,
                                        &chat.message
                                    )
                                );
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        "user_joined" => {
                            if let Ok(joined) = serde_json::from_str::<UserJoinedMessage>(&text) {
                                print!(
                                    "{}",
                                    MessageFormatter::format_user_joined(&joined.username)
                                );
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        "user_left" => {
                            if let Ok(left) = serde_json::from_str::<UserLeftMessage>(&text) {
                                print!("{}", MessageFormatter::format_user_left(&left.username));
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        "room_closed" => {
                            if let Ok(closed) = serde_json::from_str::<RoomClosedMessage>(&text) {
                                print!(
                                    "{}",
                                    MessageFormatter::format_room_closed(&closed.message)
                                );
                            }
                            return ReadOutcome::RoomClosed;
                        }
                        "error" => {
                            if let Ok(error) = serde_json::from_str::<ErrorMessage>(&text) {
                                print!("{}", MessageFormatter::format_error(&error.message));
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        "pong" => {
                            let sent_at = {
                                let mut state = state_for_read.lock().await;
                                state.ping_sent_at.take()
                            };
                            if let Some(sent_at) = sent_at {
                                print!(
                                    "{}",
                                    MessageFormatter::format_pong(sent_at.elapsed().as_millis())
                                );
                                redisplay_prompt(&username_for_read);
                            }
                        }
                        _ => {
                            print!("{}", MessageFormatter::format_raw_message(&text));
                            redisplay_prompt(&username_for_read);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    return ReadOutcome::ConnectionLost;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return ReadOutcome::ConnectionLost;
                }
                _ => {}
            }
        }

        ReadOutcome::Ended
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let username_for_prompt = username.to_string();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", username_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into protocol messages
    let username_for_write = username.to_string();
    let state_for_write = state.clone();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let command = match parse_input(&line) {
                Ok(command) => command,
                Err(message) => {
                    print!("{}", MessageFormatter::format_error(&message));
                    redisplay_prompt(&username_for_write);
                    continue;
                }
            };

            let json = match command {
                InputCommand::Chat(message) => {
                    let chat = ChatRequest {
                        r#type: MessageType::Chat,
                        message,
                    };
                    serde_json::to_string(&chat).ok()
                }
                InputCommand::Play | InputCommand::Pause | InputCommand::Seek(_) => {
                    let (is_host, position, is_playing) = {
                        let state = state_for_write.lock().await;
                        let (position, is_playing) = match state.last_sync {
                            Some(snapshot) => (
                                estimate_position(
                                    snapshot.current_time,
                                    snapshot.is_playing,
                                    snapshot.received_at.elapsed().as_secs_f64(),
                                ),
                                snapshot.is_playing,
                            ),
                            None => (0.0, false),
                        };
                        (state.is_host, position, is_playing)
                    };

                    if !is_host {
                        print!(
                            "{}",
                            MessageFormatter::format_error("Only the host can control playback")
                        );
                        redisplay_prompt(&username_for_write);
                        continue;
                    }

                    let (current_time, is_playing) = match command {
                        InputCommand::Play => (position, true),
                        InputCommand::Pause => (position, false),
                        InputCommand::Seek(target) => (target, is_playing),
                        _ => unreachable!(),
                    };
                    let sync = SyncMessage {
                        r#type: MessageType::Sync,
                        current_time,
                        is_playing,
                    };
                    serde_json::to_string(&sync).ok()
                }
                InputCommand::Ping => {
                    {
                        let mut state = state_for_write.lock().await;
                        state.ping_sent_at = Some(Instant::now());
                    }
                    Some(serde_json::json!({"type": "ping"}).to_string())
                }
                InputCommand::Quit => break,
                InputCommand::Help => {
                    print!("{}", MessageFormatter::format_help());
                    redisplay_prompt(&username_for_write);
                    None
                }
            };

            if let Some(json) = json
                && let Err(e) = write.send(Message::Text(json.into())).await
            {
                tracing::warn!("Failed to send message: {}", e);
                write_error = true;
                break;
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            match read_result.unwrap_or(ReadOutcome::ConnectionLost) {
                ReadOutcome::RoomClosed => {
                    return Err(Box::new(ClientError::RoomClosed));
                }
                ReadOutcome::ConnectionLost => {
                    return Err(Box::new(ClientError::ConnectionError(
                        "Connection lost".to_string(),
                    )));
                }
                ReadOutcome::Ended => {}
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            let write_error = write_result.unwrap_or(false);
            if write_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}
