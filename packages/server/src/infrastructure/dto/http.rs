//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/rooms`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub video_url: String,
    /// Session identity of the creator; becomes the room's host identity
    pub host_session_id: String,
}

/// Room representation returned by the HTTP API.
///
/// `host_session_id` is deliberately absent: knowing it grants host control,
/// so it never leaves the server after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDto {
    pub code: String,
    pub video_url: String,
    pub current_time: f64,
    pub is_playing: bool,
    /// RFC 3339, JST
    pub created_at: String,
}
