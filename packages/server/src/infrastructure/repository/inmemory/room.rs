//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! サーバプロセスの再起動で全ルームが消えます。永続化が必要になったら
//! 同じ trait を実装する DBMS バックエンドを追加する予定です。その際は
//! 以下の変換層が必要になります：
//!
//! ```text
//! DB Row/JSON → RoomData (DTO) → Room (ドメインモデル)
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{PlaybackState, RepositoryError, Room, RoomCode, RoomRepository};

/// インメモリ Room Repository 実装
///
/// ルームコードをキーにした HashMap でルームレコードを保持します。
pub struct InMemoryRoomRepository {
    /// ルームコード → ルームレコード
    rooms: Mutex<HashMap<RoomCode, Room>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert_room(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.code) {
            return Err(RepositoryError::DuplicateRoomCode(
                room.code.as_str().to_string(),
            ));
        }
        rooms.insert(room.code.clone(), room);
        Ok(())
    }

    async fn get_room_by_code(&self, code: &RoomCode) -> Result<Room, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(code)
            .cloned()
            .ok_or(RepositoryError::RoomNotFound)
    }

    async fn update_playback(
        &self,
        code: &RoomCode,
        playback: PlaybackState,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(code).ok_or(RepositoryError::RoomNotFound)?;
        room.set_playback(playback);
        Ok(())
    }

    async fn delete_room(&self, code: &RoomCode) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms.remove(code);
        Ok(())
    }
}
