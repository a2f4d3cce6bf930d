//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - ホスト切断での猶予期間開始、viewer 切断での退出通知、グループ除去
//!
//! ### なぜこのテストが必要か
//! - ホストと viewer で切断時の振る舞いが分岐する（ルーム寿命に直結）
//! - グループからの除去がちょうど一度行われ、空グループが残らないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホスト切断（猶予期間開始、退出通知なし）
//! - 正常系：名乗り済み viewer の切断（残存メンバーへ退出通知）
//! - エッジケース：join 前（未名乗り）の切断（通知なし）

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomCode};

use super::room_lifecycle::RoomLifecycleManager;

/// 切断処理のユースケース
pub struct DisconnectSessionUseCase {
    /// MessagePusher（ブロードキャストグループの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルーム寿命の管理者（ホスト切断時の猶予期間開始に使う）
    lifecycle: Arc<RoomLifecycleManager>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        lifecycle: Arc<RoomLifecycleManager>,
    ) -> Self {
        Self {
            message_pusher,
            lifecycle,
        }
    }

    /// 切断を実行
    ///
    /// ホストの切断はルームの猶予期間を開始する。名乗り済みの viewer の
    /// 切断は残りのメンバーへ退出通知を配る（`user_left_message` が
    /// `None` のときは join 前の切断なので何も配らない）。いずれの場合も
    /// 最後にグループから除去する。
    ///
    /// # Arguments
    ///
    /// * `room_code` - 対象ルームのコード
    /// * `connection_id` - 切断した接続の識別子
    /// * `is_host` - join で解決済みの役割（join 前なら false）
    /// * `user_left_message` - 退出通知の JSON（名乗り済み viewer のみ Some）
    pub async fn execute(
        &self,
        room_code: &RoomCode,
        connection_id: &ConnectionId,
        is_host: bool,
        user_left_message: Option<String>,
    ) {
        if is_host {
            self.lifecycle.begin_grace_period(room_code).await;
        } else if let Some(message) = user_left_message {
            self.message_pusher
                .broadcast_except(room_code, connection_id, &message)
                .await;
        }

        self.message_pusher
            .unregister_session(room_code, connection_id)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PusherEvent, Room, RoomRepository, SessionId, Timestamp, VideoUrl};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
    };
    use enkai_shared::time::get_jst_timestamp;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn create_test_setup() -> (
        Arc<InMemoryRoomRepository>,
        Arc<WebSocketMessagePusher>,
        Arc<RoomLifecycleManager>,
        DisconnectSessionUseCase,
        RoomCode,
    ) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let lifecycle = Arc::new(RoomLifecycleManager::new(
            repository.clone(),
            message_pusher.clone(),
            Duration::from_millis(50),
        ));
        let usecase =
            DisconnectSessionUseCase::new(message_pusher.clone(), lifecycle.clone());

        let code = RoomCode::new("abc12345".to_string()).unwrap();
        let room = Room::new(
            code.clone(),
            VideoUrl::new("https://example.com/v.mp4".to_string()).unwrap(),
            SessionId::new("h1".to_string()).unwrap(),
            Timestamp::new(get_jst_timestamp()),
        );
        repository.insert_room(room).await.unwrap();

        (repository, message_pusher, lifecycle, usecase, code)
    }

    #[tokio::test]
    async fn test_host_disconnect_begins_grace_period() {
        // テスト項目: ホスト切断で猶予期間が開始されグループから除去される
        // given (前提条件):
        let (_repo, message_pusher, lifecycle, usecase, code) = create_test_setup().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let host_conn = ConnectionId::generate();
        message_pusher.register_session(&code, host_conn, tx).await;

        // when (操作):
        usecase.execute(&code, &host_conn, true, None).await;

        // then (期待する結果):
        assert!(lifecycle.is_pending_deletion(&code).await);
        assert_eq!(message_pusher.session_count(&code).await, 0);
    }

    #[tokio::test]
    async fn test_viewer_disconnect_notifies_remaining_members() {
        // テスト項目: 名乗り済み viewer の切断で残存メンバーに退出通知が届く
        // given (前提条件):
        let (_repo, message_pusher, lifecycle, usecase, code) = create_test_setup().await;
        let (tx_viewer, _rx_viewer) = mpsc::unbounded_channel();
        let (tx_other, mut rx_other) = mpsc::unbounded_channel();
        let viewer_conn = ConnectionId::generate();
        message_pusher.register_session(&code, viewer_conn, tx_viewer).await;
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx_other)
            .await;

        // when (操作):
        let left_json = r#"{"type":"user_left","username":"alice"}"#.to_string();
        usecase
            .execute(&code, &viewer_conn, false, Some(left_json.clone()))
            .await;

        // then (期待する結果):
        assert_eq!(rx_other.recv().await, Some(PusherEvent::Message(left_json)));
        assert!(!lifecycle.is_pending_deletion(&code).await);
        assert_eq!(message_pusher.session_count(&code).await, 1);
    }

    #[tokio::test]
    async fn test_unidentified_disconnect_is_silent() {
        // テスト項目: join 前の切断では退出通知が配られない
        // given (前提条件):
        let (_repo, message_pusher, _lifecycle, usecase, code) = create_test_setup().await;
        let (tx_anon, _rx_anon) = mpsc::unbounded_channel();
        let (tx_other, mut rx_other) = mpsc::unbounded_channel();
        let anon_conn = ConnectionId::generate();
        message_pusher.register_session(&code, anon_conn, tx_anon).await;
        message_pusher
            .register_session(&code, ConnectionId::generate(), tx_other)
            .await;

        // when (操作):
        usecase.execute(&code, &anon_conn, false, None).await;

        // then (期待する結果):
        assert!(rx_other.try_recv().is_err());
        assert_eq!(message_pusher.session_count(&code).await, 1);
    }
}
