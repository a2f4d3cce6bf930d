//! UseCase: 再生同期処理（ホスト専用）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SyncPlaybackUseCase::execute() メソッド
//! - ホスト権限の検証、レジストリ更新、全メンバーへのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 「再生状態を書けるのはホストだけ」はこのシステムの中心的な
//!   インバリアント
//! - 永続化がブロードキャストに先行すること（コミット順 = 配信順）は
//!   順序保証の土台
//! - レジストリ障害が接続を壊さずエラーとして返ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホストによる同期（送信者含む全員へ配信）
//! - 異常系：viewer による同期試行（拒否、状態変化なし）
//! - 異常系：レジストリ書き込み失敗（配信されない）

use std::sync::Arc;

use crate::domain::{
    MessagePusher, PlaybackState, RepositoryError, RoomCode, RoomRepository,
};

use super::error::SyncPlaybackError;

/// 再生同期のユースケース
pub struct SyncPlaybackUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（ブロードキャストグループの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SyncPlaybackUseCase {
    /// 新しい SyncPlaybackUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 再生同期を実行
    ///
    /// レジストリへの書き込みが成功してからブロードキャストする。
    /// 同一接続から順に届いた sync はこの順で永続化・配信されるため、
    /// 後の状態が先の状態に追い越されることはない。
    ///
    /// # Arguments
    ///
    /// * `room_code` - 対象ルームのコード
    /// * `is_host` - join で解決済みの役割
    /// * `playback` - 新しい再生状態（検証済みの Domain Model）
    /// * `json_message` - 配信する JSON メッセージ（DTO 層で生成されたもの）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 永続化と配信が完了
    /// * `Err(SyncPlaybackError)` - 権限なし、ルーム不在、または書き込み失敗
    pub async fn execute(
        &self,
        room_code: &RoomCode,
        is_host: bool,
        playback: PlaybackState,
        json_message: String,
    ) -> Result<(), SyncPlaybackError> {
        if !is_host {
            return Err(SyncPlaybackError::NotHost);
        }

        self.repository
            .update_playback(room_code, playback)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound => SyncPlaybackError::RoomNotFound,
                other => SyncPlaybackError::Storage(other.to_string()),
            })?;

        // 送信者を含む全メンバーへ配信する（ホスト側の表示も揃える）
        self.message_pusher.broadcast(room_code, &json_message).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, PusherEvent, Room, SessionId, Timestamp, VideoUrl};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
    };
    use async_trait::async_trait;
    use enkai_shared::time::get_jst_timestamp;
    use tokio::sync::mpsc;

    mockall::mock! {
        pub Repo {}

        #[async_trait]
        impl RoomRepository for Repo {
            async fn insert_room(&self, room: Room) -> Result<(), RepositoryError>;
            async fn get_room_by_code(&self, code: &RoomCode) -> Result<Room, RepositoryError>;
            async fn update_playback(
                &self,
                code: &RoomCode,
                playback: PlaybackState,
            ) -> Result<(), RepositoryError>;
            async fn delete_room(&self, code: &RoomCode) -> Result<(), RepositoryError>;
        }
    }

    async fn create_test_setup() -> (
        Arc<InMemoryRoomRepository>,
        Arc<WebSocketMessagePusher>,
        SyncPlaybackUseCase,
        RoomCode,
    ) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SyncPlaybackUseCase::new(repository.clone(), message_pusher.clone());

        let code = RoomCode::new("abc12345".to_string()).unwrap();
        let room = Room::new(
            code.clone(),
            VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
            SessionId::new("h1".to_string()).unwrap(),
            Timestamp::new(get_jst_timestamp()),
        );
        repository.insert_room(room).await.unwrap();

        (repository, message_pusher, usecase, code)
    }

    #[tokio::test]
    async fn test_host_sync_persists_and_broadcasts_to_all() {
        // テスト項目: ホストの sync が永続化され送信者含む全員に配信される
        // given (前提条件):
        let (repository, message_pusher, usecase, code) = create_test_setup().await;
        let (tx_host, mut rx_host) = mpsc::unbounded_channel();
        let (tx_viewer, mut rx_viewer) = mpsc::unbounded_channel();
        let host_conn = ConnectionId::generate();
        message_pusher.register_session(&code, host_conn, tx_host).await;
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx_viewer)
            .await;

        // when (操作):
        let playback = PlaybackState::new(42.5, true).unwrap();
        let json = r#"{"type":"sync","current_time":42.5,"is_playing":true}"#.to_string();
        let result = usecase.execute(&code, true, playback, json.clone()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let stored = repository.get_room_by_code(&code).await.unwrap();
        assert_eq!(stored.playback.current_time(), 42.5);
        assert!(stored.playback.is_playing());
        assert_eq!(rx_host.recv().await, Some(PusherEvent::Message(json.clone())));
        assert_eq!(rx_viewer.recv().await, Some(PusherEvent::Message(json)));
    }

    #[tokio::test]
    async fn test_viewer_sync_is_rejected_without_side_effects() {
        // テスト項目: viewer の sync が拒否され、レジストリも配信も変化しない
        // given (前提条件):
        let (repository, message_pusher, usecase, code) = create_test_setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx)
            .await;

        // when (操作):
        let playback = PlaybackState::new(42.5, true).unwrap();
        let json = r#"{"type":"sync","current_time":42.5,"is_playing":true}"#.to_string();
        let result = usecase.execute(&code, false, playback, json).await;

        // then (期待する結果):
        assert_eq!(result, Err(SyncPlaybackError::NotHost));
        let stored = repository.get_room_by_code(&code).await.unwrap();
        assert_eq!(stored.playback.current_time(), 0.0);
        assert!(!stored.playback.is_playing());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sync_on_deleted_room_fails() {
        // テスト項目: 削除済みルームへの sync が RoomNotFound になり配信されない
        // given (前提条件):
        let (repository, message_pusher, usecase, code) = create_test_setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx)
            .await;
        repository.delete_room(&code).await.unwrap();

        // when (操作):
        let playback = PlaybackState::new(10.0, false).unwrap();
        let result = usecase
            .execute(&code, true, playback, "{}".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SyncPlaybackError::RoomNotFound));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_without_broadcast() {
        // テスト項目: レジストリ書き込み失敗がエラーとして返り配信されない
        // given (前提条件):
        let mut mock_repo = MockRepo::new();
        mock_repo
            .expect_update_playback()
            .returning(|_, _| Err(RepositoryError::StorageFailure("disk full".to_string())));
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SyncPlaybackUseCase::new(Arc::new(mock_repo), message_pusher.clone());
        let code = RoomCode::new("abc12345".to_string()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx)
            .await;

        // when (操作):
        let playback = PlaybackState::new(10.0, true).unwrap();
        let result = usecase
            .execute(&code, true, playback, "{}".to_string())
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SyncPlaybackError::Storage(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_back_to_back_syncs_deliver_in_order() {
        // テスト項目: 連続した sync が発行順のまま配信される
        // given (前提条件):
        let (_repository, message_pusher, usecase, code) = create_test_setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx)
            .await;

        // when (操作):
        let first = r#"{"type":"sync","current_time":10.0,"is_playing":true}"#.to_string();
        let second = r#"{"type":"sync","current_time":20.0,"is_playing":false}"#.to_string();
        usecase
            .execute(&code, true, PlaybackState::new(10.0, true).unwrap(), first.clone())
            .await
            .unwrap();
        usecase
            .execute(
                &code,
                true,
                PlaybackState::new(20.0, false).unwrap(),
                second.clone(),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some(PusherEvent::Message(first)));
        assert_eq!(rx.recv().await, Some(PusherEvent::Message(second)));
    }
}
