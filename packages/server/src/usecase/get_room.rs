//! UseCase: ルーム取得処理（HTTP API 用）

use std::sync::Arc;

use crate::domain::{RepositoryError, Room, RoomCode, RoomRepository};

use super::error::GetRoomError;

/// ルーム取得のユースケース
pub struct GetRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomUseCase {
    /// 新しい GetRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// コードでルームを取得
    pub async fn execute(&self, code: &RoomCode) -> Result<Room, GetRoomError> {
        self.repository
            .get_room_by_code(code)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound => GetRoomError::RoomNotFound,
                other => GetRoomError::Storage(other.to_string()),
            })
    }
}
