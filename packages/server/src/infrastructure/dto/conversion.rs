//! Conversion logic between DTOs and domain entities.

use enkai_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::entity;
use crate::infrastructure::dto::http as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&entity::Room> for dto::RoomDto {
    fn from(room: &entity::Room) -> Self {
        Self {
            code: room.code.as_str().to_string(),
            video_url: room.video_url.as_str().to_string(),
            current_time: room.playback.current_time(),
            is_playing: room.playback.is_playing(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{RoomCode, SessionId, Timestamp, VideoUrl};
    use crate::domain::{PlaybackState, Room};

    #[test]
    fn test_domain_room_to_dto() {
        // テスト項目: ドメインエンティティの Room が DTO に変換される
        // given (前提条件):
        let mut room = Room::new(
            RoomCode::new("abc12345".to_string()).unwrap(),
            VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
            SessionId::new("h1".to_string()).unwrap(),
            Timestamp::new(1672498800000),
        );
        room.set_playback(PlaybackState::new(42.5, true).unwrap());

        // when (操作):
        let dto: dto::RoomDto = (&room).into();

        // then (期待する結果):
        assert_eq!(dto.code, "abc12345");
        assert_eq!(dto.video_url, "https://example.com/v.mp4");
        assert_eq!(dto.current_time, 42.5);
        assert!(dto.is_playing);
        assert!(dto.created_at.starts_with("2023-01-01"));
    }

    #[test]
    fn test_room_dto_omits_host_session_id() {
        // テスト項目: DTO の JSON に host_session_id が含まれない
        // given (前提条件):
        let room = Room::new(
            RoomCode::new("abc12345".to_string()).unwrap(),
            VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
            SessionId::new("secret-host-id".to_string()).unwrap(),
            Timestamp::new(1672498800000),
        );

        // when (操作):
        let dto: dto::RoomDto = (&room).into();
        let json = serde_json::to_string(&dto).unwrap();

        // then (期待する結果):
        assert!(!json.contains("secret-host-id"));
        assert!(!json.contains("host_session_id"));
    }
}
