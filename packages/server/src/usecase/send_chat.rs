//! UseCase: チャット配信処理
//!
//! 本文の検証（トリムと空メッセージの破棄）は Domain Model の
//! [`ChatText`](crate::domain::ChatText) が担い、ここは検証済み
//! メッセージのファンアウトだけを行う。チャット履歴は保持しない。

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomCode};

/// チャット配信のユースケース
pub struct SendChatUseCase {
    /// MessagePusher（ブロードキャストグループの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendChatUseCase {
    /// 新しい SendChatUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// チャットを送信者含む全メンバーへ配信
    ///
    /// # Arguments
    ///
    /// * `room_code` - 対象ルームのコード
    /// * `json_message` - 配信する JSON メッセージ（DTO 層で生成されたもの）
    pub async fn execute(&self, room_code: &RoomCode, json_message: &str) {
        self.message_pusher.broadcast(room_code, json_message).await;
    }
}
