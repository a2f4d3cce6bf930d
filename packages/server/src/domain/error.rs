//! Domain and repository error types.

use thiserror::Error;

/// Validation errors raised by value object constructors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Room code is empty, too long, or contains invalid characters
    #[error("invalid room code: {0}")]
    InvalidRoomCode(String),

    /// Session ID is empty or too long
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Username is empty or too long
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Video URL is empty, too long, or not an HTTP(S) URL
    #[error("invalid video url: {0}")]
    InvalidVideoUrl(String),

    /// Playback position is negative or not a finite number
    #[error("invalid playback position: {0}")]
    InvalidPlaybackPosition(String),

    /// Chat message is empty after trimming whitespace
    #[error("chat message is empty")]
    EmptyChatMessage,

    /// Chat message exceeds the maximum length
    #[error("chat message is too long: {0} characters")]
    ChatMessageTooLong(usize),
}

/// Errors raised by the room registry (Repository 層のエラー)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// No room exists for the requested code
    #[error("room not found")]
    RoomNotFound,

    /// A room with the same code already exists
    #[error("room code '{0}' already exists")]
    DuplicateRoomCode(String),

    /// The underlying store failed (I/O, connection, ...)
    #[error("storage failure: {0}")]
    StorageFailure(String),
}
