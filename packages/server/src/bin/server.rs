//! Watch-party synchronization server.
//!
//! One host controls play/pause/seek for a room; every connected viewer's
//! player mirrors it, with a chat riding alongside. Rooms survive brief host
//! disconnects (page reloads) through a configurable grace period.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin enkai-server
//! cargo run --bin enkai-server -- --host 0.0.0.0 --port 3000 --grace-period-secs 10
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use enkai_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, CreateRoomUseCase, DEFAULT_GRACE_PERIOD,
        DisconnectSessionUseCase, GetRoomUseCase, JoinRoomUseCase, RoomLifecycleManager,
        SendChatUseCase, SyncPlaybackUseCase,
    },
};
use enkai_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "enkai-server")]
#[command(about = "Watch-party server: host-controlled playback sync over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds a room survives after its host disconnects
    #[arg(short = 'g', long, default_value_t = DEFAULT_GRACE_PERIOD.as_secs())]
    grace_period_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. RoomLifecycleManager
    // 4. UseCases
    // 5. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create RoomLifecycleManager (host-disconnect grace period)
    let lifecycle = Arc::new(RoomLifecycleManager::new(
        repository.clone(),
        message_pusher.clone(),
        Duration::from_secs(args.grace_period_secs),
    ));

    // 4. Create UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        lifecycle.clone(),
    ));
    let sync_playback_usecase = Arc::new(SyncPlaybackUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let send_chat_usecase = Arc::new(SendChatUseCase::new(message_pusher.clone()));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        message_pusher.clone(),
        lifecycle.clone(),
    ));
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(repository.clone()));
    let get_room_usecase = Arc::new(GetRoomUseCase::new(repository.clone()));

    // 5. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        join_room_usecase,
        sync_playback_usecase,
        send_chat_usecase,
        disconnect_session_usecase,
        create_room_usecase,
        get_room_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
