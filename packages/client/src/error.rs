//! Error types for the watch-party client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// No room exists for the requested code
    #[error("Room '{0}' was not found")]
    RoomNotFound(String),

    /// The server closed the room (host left for good)
    #[error("The host has ended the watch party")]
    RoomClosed,

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
