//! WebSocket message DTOs.
//!
//! Every message carries a `type` field selecting the variant. Inbound
//! dispatch reads the type from [`InboundEnvelope`] first and then parses the
//! matching request struct, so unrecognized types can be discarded without
//! touching the rest of the payload.

use serde::{Deserialize, Serialize};

/// Message type discriminator carried in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Ping,
    Pong,
    Join,
    Sync,
    Chat,
    Role,
    UserJoined,
    UserLeft,
    RoomClosed,
    Error,
}

/// Minimal envelope used to pick the variant before full parsing
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    pub r#type: String,
}

// ========================================
// Inbound (client → server)
// ========================================

/// `join`: the session identifies itself and asks for its role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub r#type: MessageType,
    pub session_id: String,
    /// Optional; the session stays "Anonymous" when omitted
    pub username: Option<String>,
}

/// `chat`: free-form message to the whole room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub r#type: MessageType,
    pub message: String,
}

// ========================================
// Bidirectional
// ========================================

/// `sync`: playback state. Inbound from the host as a control message,
/// outbound to everyone as the snapshot on connect and on every accepted
/// host sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncMessage {
    pub r#type: MessageType,
    pub current_time: f64,
    pub is_playing: bool,
}

// ========================================
// Outbound (server → client)
// ========================================

/// `pong`: reply to an application-level `ping`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    pub r#type: MessageType,
}

/// `role`: the session's resolved role and the room's video URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMessage {
    pub r#type: MessageType,
    pub is_host: bool,
    pub video_url: String,
}

/// `user_joined`: someone identified themselves in the room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJoinedMessage {
    pub r#type: MessageType,
    pub username: String,
}

/// `user_left`: an identified viewer disconnected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLeftMessage {
    pub r#type: MessageType,
    pub username: String,
}

/// `chat`: chat message fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub r#type: MessageType,
    pub message: String,
    pub username: String,
}

/// `room_closed`: the room was torn down; the connection closes next
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomClosedMessage {
    pub r#type: MessageType,
    pub message: String,
}

/// `error`: request-level failure report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_serializes_snake_case() {
        // テスト項目: MessageType が snake_case でシリアライズされる
        // given (前提条件):
        let msg = UserJoinedMessage {
            r#type: MessageType::UserJoined,
            username: "alice".to_string(),
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert!(json.contains(r#""type":"user_joined""#));
    }

    #[test]
    fn test_join_request_parses_without_username() {
        // テスト項目: username 省略の join がパースできる
        // given (前提条件):
        let json = r#"{"type":"join","session_id":"h1"}"#;

        // when (操作):
        let req: JoinRequest = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(req.session_id, "h1");
        assert!(req.username.is_none());
    }

    #[test]
    fn test_join_request_requires_session_id() {
        // テスト項目: session_id 欠落の join がパースエラーになる
        // given (前提条件):
        let json = r#"{"type":"join","username":"alice"}"#;

        // when (操作):
        let result = serde_json::from_str::<JoinRequest>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_sync_message_round_trip() {
        // テスト項目: sync メッセージの current_time / is_playing が保持される
        // given (前提条件):
        let json = r#"{"type":"sync","current_time":42.5,"is_playing":true}"#;

        // when (操作):
        let msg: SyncMessage = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(msg.current_time, 42.5);
        assert!(msg.is_playing);
    }

    #[test]
    fn test_inbound_envelope_extracts_unknown_type() {
        // テスト項目: 未知の type でもエンベロープとしてはパースできる
        // given (前提条件):
        let json = r#"{"type":"reaction","emoji":"+1"}"#;

        // when (操作):
        let envelope: InboundEnvelope = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(envelope.r#type, "reaction");
    }
}
