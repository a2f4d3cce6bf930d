//! Domain entities.

use super::value_object::{PlaybackState, RoomCode, SessionId, Timestamp, VideoUrl};

/// A watch-party room: one video URL, one host, any number of viewers.
///
/// `code`, `video_url`, and `host_session_id` are immutable once the room is
/// created. The playback state is the last known position/intent reported by
/// the host and is only ever written through
/// [`RoomRepository::update_playback`](super::RoomRepository::update_playback)
/// after the caller has verified host authority.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Short opaque identifier addressing this room
    pub code: RoomCode,
    /// The video everyone watches
    pub video_url: VideoUrl,
    /// Identity of the session that created the room (the host)
    pub host_session_id: SessionId,
    /// Last known playback position and play/pause intent
    pub playback: PlaybackState,
    /// Creation time (JST milliseconds)
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(
        code: RoomCode,
        video_url: VideoUrl,
        host_session_id: SessionId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            code,
            video_url,
            host_session_id,
            playback: PlaybackState::initial(),
            created_at,
        }
    }

    /// Whether the given session identity is this room's host.
    ///
    /// Pure string equality; host identity is a trust-on-presentation model
    /// (whoever presents the creator's session ID is the host).
    pub fn is_hosted_by(&self, session_id: &SessionId) -> bool {
        &self.host_session_id == session_id
    }

    /// Record a new playback state reported by the host
    pub fn set_playback(&mut self, playback: PlaybackState) {
        self.playback = playback;
    }
}
