//! UseCase: join 処理（役割解決とホスト再接続）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 役割解決（session_id とルームのホスト識別子の比較）
//! - ホスト再接続による猶予期間の打ち切り
//!
//! ### なぜこのテストが必要か
//! - is_host の判定はすべての再生制御の権限判断の根拠
//! - ホストのページリロードを吸収できるかはここでのキャンセルに懸かる
//! - join は毎回役割を再計算する（再接続サポート）ことが仕様
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホスト / viewer それぞれの join
//! - 正常系：猶予期間中のホスト再接続
//! - 異常系：ルーム削除後の join
//! - エッジケース：同一 session_id での二重 join（冪等）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, RepositoryError, RoomCode, RoomRepository, SessionId, VideoUrl,
};

use super::{error::JoinRoomError, room_lifecycle::RoomLifecycleManager};

/// join の結果: 解決された役割とルームの動画 URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub is_host: bool,
    pub video_url: VideoUrl,
}

/// join 処理のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（ブロードキャストグループの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム寿命の管理者（猶予期間の打ち切りに使う）
    lifecycle: Arc<RoomLifecycleManager>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        lifecycle: Arc<RoomLifecycleManager>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            lifecycle,
        }
    }

    /// join を実行
    ///
    /// ルームを取り直し、session_id がホスト識別子と一致するかで役割を
    /// 解決する。ホストの join で猶予期間が走っていれば打ち切る
    /// （PENDING_DELETION → ACTIVE の戻り遷移）。
    ///
    /// # Arguments
    ///
    /// * `room_code` - 接続先ルームのコード
    /// * `session_id` - クライアントが名乗るセッション識別子
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 解決された役割と動画 URL
    /// * `Err(JoinRoomError)` - ルームが既に無い、または読み取り失敗
    pub async fn execute(
        &self,
        room_code: &RoomCode,
        session_id: &SessionId,
    ) -> Result<JoinOutcome, JoinRoomError> {
        let room = self
            .repository
            .get_room_by_code(room_code)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound => JoinRoomError::RoomNotFound,
                other => JoinRoomError::Storage(other.to_string()),
            })?;

        let is_host = room.is_hosted_by(session_id);

        if is_host && self.lifecycle.cancel_grace_period(room_code).await {
            tracing::info!(
                "Host reconnected to room '{}' within the grace period",
                room_code
            );
        }

        Ok(JoinOutcome {
            is_host,
            video_url: room.video_url,
        })
    }

    /// 参加通知を本人以外の全メンバーにブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `room_code` - 対象ルームのコード
    /// * `exclude` - 通知しない接続（join した本人）
    /// * `message` - ブロードキャストするメッセージ（JSON）
    pub async fn broadcast_user_joined(
        &self,
        room_code: &RoomCode,
        exclude: &ConnectionId,
        message: &str,
    ) {
        self.message_pusher
            .broadcast_except(room_code, exclude, message)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Room, Timestamp};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
    };
    use enkai_shared::time::get_jst_timestamp;
    use std::time::Duration;

    fn create_test_usecase() -> (
        Arc<InMemoryRoomRepository>,
        Arc<WebSocketMessagePusher>,
        Arc<RoomLifecycleManager>,
        JoinRoomUseCase,
    ) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let lifecycle = Arc::new(RoomLifecycleManager::new(
            repository.clone(),
            message_pusher.clone(),
            Duration::from_millis(50),
        ));
        let usecase = JoinRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            lifecycle.clone(),
        );
        (repository, message_pusher, lifecycle, usecase)
    }

    async fn insert_test_room(repository: &InMemoryRoomRepository, code: &str) -> Room {
        let room = Room::new(
            RoomCode::new(code.to_string()).unwrap(),
            VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
            SessionId::new("h1".to_string()).unwrap(),
            Timestamp::new(get_jst_timestamp()),
        );
        repository.insert_room(room.clone()).await.unwrap();
        room
    }

    #[tokio::test]
    async fn test_join_as_host_resolves_host_role() {
        // テスト項目: ホストの session_id での join が is_host = true になる
        // given (前提条件):
        let (repository, _pusher, _lifecycle, usecase) = create_test_usecase();
        let room = insert_test_room(&repository, "abc12345").await;
        let host_id = SessionId::new("h1".to_string()).unwrap();

        // when (操作):
        let outcome = usecase.execute(&room.code, &host_id).await.unwrap();

        // then (期待する結果):
        assert!(outcome.is_host);
        assert_eq!(outcome.video_url.as_str(), "https://example.com/v.mp4");
    }

    #[tokio::test]
    async fn test_join_as_viewer_resolves_viewer_role() {
        // テスト項目: ホスト以外の session_id での join が is_host = false になる
        // given (前提条件):
        let (repository, _pusher, _lifecycle, usecase) = create_test_usecase();
        let room = insert_test_room(&repository, "abc12345").await;
        let viewer_id = SessionId::new("v1".to_string()).unwrap();

        // when (操作):
        let outcome = usecase.execute(&room.code, &viewer_id).await.unwrap();

        // then (期待する結果):
        assert!(!outcome.is_host);
    }

    #[tokio::test]
    async fn test_join_twice_resolves_same_role() {
        // テスト項目: 同一 session_id での二重 join が同じ役割を返す（冪等）
        // given (前提条件):
        let (repository, _pusher, _lifecycle, usecase) = create_test_usecase();
        let room = insert_test_room(&repository, "abc12345").await;
        let host_id = SessionId::new("h1".to_string()).unwrap();

        // when (操作):
        let first = usecase.execute(&room.code, &host_id).await.unwrap();
        let second = usecase.execute(&room.code, &host_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(first, second);
        assert!(second.is_host);
    }

    #[tokio::test]
    async fn test_host_join_cancels_pending_deletion() {
        // テスト項目: 猶予期間中のホスト join で削除が取り消される
        // given (前提条件):
        let (repository, _pusher, lifecycle, usecase) = create_test_usecase();
        let room = insert_test_room(&repository, "abc12345").await;
        lifecycle.begin_grace_period(&room.code).await;
        assert!(lifecycle.is_pending_deletion(&room.code).await);

        // when (操作):
        let host_id = SessionId::new("h1".to_string()).unwrap();
        let outcome = usecase.execute(&room.code, &host_id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        // then (期待する結果):
        assert!(outcome.is_host);
        assert!(!lifecycle.is_pending_deletion(&room.code).await);
        assert!(repository.get_room_by_code(&room.code).await.is_ok());
    }

    #[tokio::test]
    async fn test_viewer_join_does_not_cancel_pending_deletion() {
        // テスト項目: viewer の join では猶予期間が打ち切られない
        // given (前提条件):
        let (repository, _pusher, lifecycle, usecase) = create_test_usecase();
        let room = insert_test_room(&repository, "abc12345").await;
        lifecycle.begin_grace_period(&room.code).await;

        // when (操作):
        let viewer_id = SessionId::new("v1".to_string()).unwrap();
        usecase.execute(&room.code, &viewer_id).await.unwrap();

        // then (期待する結果):
        assert!(lifecycle.is_pending_deletion(&room.code).await);
    }

    #[tokio::test]
    async fn test_join_deleted_room_fails() {
        // テスト項目: 削除済みルームへの join が RoomNotFound になる
        // given (前提条件):
        let (repository, _pusher, _lifecycle, usecase) = create_test_usecase();
        let room = insert_test_room(&repository, "abc12345").await;
        repository.delete_room(&room.code).await.unwrap();

        // when (操作):
        let session_id = SessionId::new("h1".to_string()).unwrap();
        let result = usecase.execute(&room.code, &session_id).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::RoomNotFound));
    }
}
