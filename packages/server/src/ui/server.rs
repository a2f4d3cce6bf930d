//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectSessionUseCase, CreateRoomUseCase, DisconnectSessionUseCase, GetRoomUseCase,
    JoinRoomUseCase, SendChatUseCase, SyncPlaybackUseCase,
};

use super::{
    handler::{
        http::{create_room, get_room_detail, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Watch-party synchronization server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     join_room_usecase,
///     sync_playback_usecase,
///     send_chat_usecase,
///     disconnect_session_usecase,
///     create_room_usecase,
///     get_room_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectSessionUseCase（接続受付のユースケース）
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// JoinRoomUseCase（join 処理のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// SyncPlaybackUseCase（再生同期のユースケース）
    sync_playback_usecase: Arc<SyncPlaybackUseCase>,
    /// SendChatUseCase（チャット配信のユースケース）
    send_chat_usecase: Arc<SendChatUseCase>,
    /// DisconnectSessionUseCase（切断処理のユースケース）
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomUseCase（ルーム取得のユースケース）
    get_room_usecase: Arc<GetRoomUseCase>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        sync_playback_usecase: Arc<SyncPlaybackUseCase>,
        send_chat_usecase: Arc<SendChatUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        create_room_usecase: Arc<CreateRoomUseCase>,
        get_room_usecase: Arc<GetRoomUseCase>,
    ) -> Self {
        Self {
            connect_session_usecase,
            join_room_usecase,
            sync_playback_usecase,
            send_chat_usecase,
            disconnect_session_usecase,
            create_room_usecase,
            get_room_usecase,
        }
    }

    /// Run the watch-party server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase,
            join_room_usecase: self.join_room_usecase,
            sync_playback_usecase: self.sync_playback_usecase,
            send_chat_usecase: self.send_chat_usecase,
            disconnect_session_usecase: self.disconnect_session_usecase,
            create_room_usecase: self.create_room_usecase,
            get_room_usecase: self.get_room_usecase,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws/rooms/{room_code}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", post(create_room))
            .route("/api/rooms/{code}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Watch-party server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws/rooms/{{room_code}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
