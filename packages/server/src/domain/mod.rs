//! Domain layer: entities, value objects, and the interfaces the
//! surrounding layers implement (dependency inversion).

pub mod entity;
mod error;
mod pusher;
mod repository;
pub mod value_object;

pub use entity::Room;
pub use error::{DomainError, RepositoryError};
pub use pusher::{ConnectionId, MessagePusher, PusherChannel, PusherEvent};
pub use repository::RoomRepository;
pub use value_object::{
    ChatText, PlaybackState, RoomCode, RoomCodeFactory, SessionId, Timestamp, Username, VideoUrl,
};
