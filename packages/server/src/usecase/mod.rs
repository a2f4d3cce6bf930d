//! UseCase layer: one struct per protocol operation, plus the room
//! lifecycle manager that owns the host-disconnect grace period.

mod connect_session;
mod create_room;
mod disconnect_session;
mod error;
mod get_room;
mod join_room;
mod room_lifecycle;
mod send_chat;
mod sync_playback;

pub use connect_session::ConnectSessionUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{
    ConnectSessionError, CreateRoomError, GetRoomError, JoinRoomError, SyncPlaybackError,
};
pub use get_room::GetRoomUseCase;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use room_lifecycle::{DEFAULT_GRACE_PERIOD, RoomLifecycleManager};
pub use send_chat::SendChatUseCase;
pub use sync_playback::SyncPlaybackUseCase;
