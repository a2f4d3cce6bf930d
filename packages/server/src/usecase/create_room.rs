//! UseCase: ルーム作成処理
//!
//! WebSocket の同期コアからは独立した HTTP API の裏側。ルームコードの
//! 採番と初期レコードの登録だけを行う。

use std::sync::Arc;

use enkai_shared::time::get_jst_timestamp;

use crate::domain::{
    RepositoryError, Room, RoomCodeFactory, RoomRepository, SessionId, Timestamp, VideoUrl,
};

use super::error::CreateRoomError;

/// コード衝突時の再採番の上限
const CODE_MINT_ATTEMPTS: usize = 3;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム作成を実行
    ///
    /// 8 文字のルームコードを採番して初期状態（位置 0・一時停止）の
    /// ルームを登録する。作成者の session_id がそのままホスト識別子になる。
    ///
    /// # Arguments
    ///
    /// * `video_url` - 共有する動画の URL（Domain Model）
    /// * `host_session_id` - 作成者のセッション識別子（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 登録されたルーム
    /// * `Err(CreateRoomError)` - 採番失敗または書き込み失敗
    pub async fn execute(
        &self,
        video_url: VideoUrl,
        host_session_id: SessionId,
    ) -> Result<Room, CreateRoomError> {
        for _ in 0..CODE_MINT_ATTEMPTS {
            let code = RoomCodeFactory::generate();
            let room = Room::new(
                code,
                video_url.clone(),
                host_session_id.clone(),
                Timestamp::new(get_jst_timestamp()),
            );

            match self.repository.insert_room(room.clone()).await {
                Ok(()) => {
                    tracing::info!("Room '{}' created", room.code);
                    return Ok(room);
                }
                Err(RepositoryError::DuplicateRoomCode(code)) => {
                    tracing::warn!("Room code '{}' collided, re-minting", code);
                    continue;
                }
                Err(e) => return Err(CreateRoomError::Storage(e.to_string())),
            }
        }

        Err(CreateRoomError::CodeMintingFailed)
    }
}
