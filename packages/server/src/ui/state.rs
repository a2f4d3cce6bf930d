//! Server state shared across request handlers.

use std::sync::Arc;

use crate::usecase::{
    ConnectSessionUseCase, CreateRoomUseCase, DisconnectSessionUseCase, GetRoomUseCase,
    JoinRoomUseCase, SendChatUseCase, SyncPlaybackUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（接続受付のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// JoinRoomUseCase（join 処理のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// SyncPlaybackUseCase（再生同期のユースケース）
    pub sync_playback_usecase: Arc<SyncPlaybackUseCase>,
    /// SendChatUseCase（チャット配信のユースケース）
    pub send_chat_usecase: Arc<SendChatUseCase>,
    /// DisconnectSessionUseCase（切断処理のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomUseCase（ルーム取得のユースケース）
    pub get_room_usecase: Arc<GetRoomUseCase>,
}
