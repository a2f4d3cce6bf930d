//! UseCase: 接続受付処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続受付処理（ルーム存在チェック、グループ参加、スナップショット返却）
//!
//! ### なぜこのテストが必要か
//! - 存在しないルームへの接続拒否は接続状態機械（CONNECTING → JOINED）の入口
//! - 後から参加した viewer が正しい再生位置から始められるのは
//!   ここで返すスナップショットに依存する
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存ルームへの接続とスナップショット取得
//! - 異常系：存在しないコードでの接続試行
//! - エッジケース：再生中のルームへの途中参加

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, PlaybackState, PusherChannel, RepositoryError, RoomCode,
    RoomRepository,
};

use super::error::ConnectSessionError;

/// 接続受付のユースケース
pub struct ConnectSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（ブロードキャストグループの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続受付を実行
    ///
    /// ルームが存在すればセッションをブロードキャストグループに加え、
    /// 新規参加者へ送るべき再生状態のスナップショットを返す。
    ///
    /// # Arguments
    ///
    /// * `room_code` - 接続先ルームのコード
    /// * `connection_id` - この接続の識別子
    /// * `sender` - このセッションへの送信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(PlaybackState)` - 受付成功（現在の再生状態を返す）
    /// * `Err(ConnectSessionError)` - ルーム不在または読み取り失敗
    pub async fn execute(
        &self,
        room_code: &RoomCode,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<PlaybackState, ConnectSessionError> {
        let room = self
            .repository
            .get_room_by_code(room_code)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound => ConnectSessionError::RoomNotFound,
                other => ConnectSessionError::Storage(other.to_string()),
            })?;

        self.message_pusher
            .register_session(room_code, connection_id, sender)
            .await;

        Ok(room.playback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Room, SessionId, Timestamp, VideoUrl};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
    };
    use enkai_shared::time::get_jst_timestamp;

    fn create_test_room(code: &str) -> Room {
        Room::new(
            RoomCode::new(code.to_string()).unwrap(),
            VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
            SessionId::new("h1".to_string()).unwrap(),
            Timestamp::new(get_jst_timestamp()),
        )
    }

    #[tokio::test]
    async fn test_connect_to_existing_room() {
        // テスト項目: 既存ルームへの接続が成功しグループに登録される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectSessionUseCase::new(repository.clone(), message_pusher.clone());
        let room = create_test_room("abc12345");
        repository.insert_room(room.clone()).await.unwrap();

        // when (操作):
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = usecase
            .execute(&room.code, ConnectionId::generate(), tx)
            .await;

        // then (期待する結果):
        let snapshot = result.unwrap();
        assert_eq!(snapshot.current_time(), 0.0);
        assert!(!snapshot.is_playing());
        assert_eq!(message_pusher.session_count(&room.code).await, 1);
    }

    #[tokio::test]
    async fn test_connect_to_unknown_room_is_rejected() {
        // テスト項目: 存在しないコードへの接続が拒否されグループ登録されない
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectSessionUseCase::new(repository, message_pusher.clone());
        let code = RoomCode::new("deadbeef".to_string()).unwrap();

        // when (操作):
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = usecase.execute(&code, ConnectionId::generate(), tx).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectSessionError::RoomNotFound));
        assert_eq!(message_pusher.session_count(&code).await, 0);
    }

    #[tokio::test]
    async fn test_late_joiner_receives_current_playback_state() {
        // テスト項目: 再生中のルームに途中参加すると現在の状態が返る
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectSessionUseCase::new(repository.clone(), message_pusher);
        let room = create_test_room("abc12345");
        repository.insert_room(room.clone()).await.unwrap();
        repository
            .update_playback(&room.code, PlaybackState::new(42.5, true).unwrap())
            .await
            .unwrap();

        // when (操作):
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let snapshot = usecase
            .execute(&room.code, ConnectionId::generate(), tx)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.current_time(), 42.5);
        assert!(snapshot.is_playing());
    }
}
