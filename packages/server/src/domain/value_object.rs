//! Value objects for the watch-party domain.
//!
//! Each value object validates on construction, so every instance held by an
//! entity or passed to a use case is known to be well-formed.

use super::error::DomainError;

/// Maximum length of a room code
const ROOM_CODE_MAX_LENGTH: usize = 16;
/// Length of generated room codes (uuid v4 hex prefix)
const ROOM_CODE_GENERATED_LENGTH: usize = 8;
/// Maximum length of a session ID
const SESSION_ID_MAX_LENGTH: usize = 64;
/// Maximum length of a display name
const USERNAME_MAX_LENGTH: usize = 32;
/// Maximum length of a video URL
const VIDEO_URL_MAX_LENGTH: usize = 2048;
/// Maximum length of a chat message
const CHAT_TEXT_MAX_LENGTH: usize = 500;

/// Room code: short opaque identifier addressing one room.
///
/// Immutable once assigned. Codes are generated by [`RoomCodeFactory`] but
/// any non-empty alphanumeric string within the length limit is accepted on
/// lookup, so externally minted codes keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::InvalidRoomCode("empty".to_string()));
        }
        if value.len() > ROOM_CODE_MAX_LENGTH {
            return Err(DomainError::InvalidRoomCode(format!(
                "too long: {} characters",
                value.len()
            )));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidRoomCode(
                "contains non-alphanumeric characters".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Factory for minting new room codes
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    /// Generate a fresh 8-character room code (uuid v4 hex prefix)
    pub fn generate() -> RoomCode {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        RoomCode(hex[..ROOM_CODE_GENERATED_LENGTH].to_string())
    }
}

/// Session ID: opaque caller-supplied identity.
///
/// Never authenticated; used purely for equality comparison against the
/// room's recorded host identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::InvalidSessionId("empty".to_string()));
        }
        if value.len() > SESSION_ID_MAX_LENGTH {
            return Err(DomainError::InvalidSessionId(format!(
                "too long: {} characters",
                value.len()
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name of a connected session.
///
/// Defaults to "Anonymous" until the session identifies itself with a join
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidUsername("empty".to_string()));
        }
        if trimmed.chars().count() > USERNAME_MAX_LENGTH {
            return Err(DomainError::InvalidUsername(format!(
                "too long: {} characters",
                trimmed.chars().count()
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Placeholder name used before a session has joined
    pub fn anonymous() -> Self {
        Self("Anonymous".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Video URL shared by a room, set at creation and immutable afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUrl(String);

impl VideoUrl {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::InvalidVideoUrl("empty".to_string()));
        }
        if value.len() > VIDEO_URL_MAX_LENGTH {
            return Err(DomainError::InvalidVideoUrl(format!(
                "too long: {} characters",
                value.len()
            )));
        }
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(DomainError::InvalidVideoUrl(
                "must start with http:// or https://".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoUrl {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Playback state of a room: position in seconds and play/pause intent.
///
/// The position must be a finite, non-negative number of seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    current_time: f64,
    is_playing: bool,
}

impl PlaybackState {
    pub fn new(current_time: f64, is_playing: bool) -> Result<Self, DomainError> {
        if !current_time.is_finite() {
            return Err(DomainError::InvalidPlaybackPosition(
                "not a finite number".to_string(),
            ));
        }
        if current_time < 0.0 {
            return Err(DomainError::InvalidPlaybackPosition(format!(
                "negative: {current_time}"
            )));
        }
        Ok(Self {
            current_time,
            is_playing,
        })
    }

    /// Initial state of a freshly created room: position 0, paused
    pub fn initial() -> Self {
        Self {
            current_time: 0.0,
            is_playing: false,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
}

/// Chat message text.
///
/// Construction trims surrounding whitespace; messages that trim to empty are
/// rejected so callers can drop them without broadcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatText(String);

impl ChatText {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyChatMessage);
        }
        if trimmed.chars().count() > CHAT_TEXT_MAX_LENGTH {
            return Err(DomainError::ChatMessageTooLong(trimmed.chars().count()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix timestamp in JST milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
