//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ルームコードごとのメンバー集合（ブロードキャストグループ）の管理
//! - グループへのファンアウト（broadcast, broadcast_except）
//! - ルーム削除時の残存セッションの強制切断（close_room）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `PusherChannel` を受け取り、メッセージ送信に使用
//! します。
//!
//! ## ロック規律
//!
//! グループの一覧（外側）とルームごとのメンバー集合（内側）の二段ロック。
//! 取得順序は必ず 外側 → 内側。ファンアウトは外側ロックを Arc の取得だけ
//! に使い、送信中は当該ルームの内側ロックしか持たない。これで別ルームの
//! 配信がこのルームのメンバー操作を待たされることはない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, PusherEvent, RoomCode};

/// ルーム 1 つ分のメンバー集合
type GroupMembers = HashMap<ConnectionId, PusherChannel>;

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
///
/// pusher.register_session(&room_code, connection_id, tx).await;
/// pusher.broadcast(&room_code, "{\"type\":\"chat\",...}").await;
/// ```
pub struct WebSocketMessagePusher {
    /// ルームコード → メンバー集合
    ///
    /// グループは最初の register で作られ、空になった時点で削除される。
    groups: Mutex<HashMap<String, Arc<Mutex<GroupMembers>>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
        }
    }

    /// 配信対象のメンバー集合を取得する（存在しなければ None）
    async fn group_of(&self, room_code: &RoomCode) -> Option<Arc<Mutex<GroupMembers>>> {
        let groups = self.groups.lock().await;
        groups.get(room_code.as_str()).cloned()
    }

    /// メンバーへイベントを送る。失敗はログに残すだけで伝播しない。
    fn send_event(connection_id: &ConnectionId, sender: &PusherChannel, event: PusherEvent) {
        if sender.send(event).is_err() {
            tracing::warn!(
                "Failed to push message to connection '{}', likely mid-disconnect",
                connection_id
            );
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_session(
        &self,
        room_code: &RoomCode,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) {
        // メンバー追加は外側・内側の両ロックを保持して行う。外側を先に
        // 放すと、空グループの削除と競合して孤立した集合に登録しうる。
        let mut groups = self.groups.lock().await;
        let group = groups
            .entry(room_code.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HashMap::new())))
            .clone();
        let mut members = group.lock().await;
        members.insert(connection_id, sender);
        tracing::debug!(
            "Connection '{}' registered to room '{}' ({} members)",
            connection_id,
            room_code,
            members.len()
        );
    }

    async fn unregister_session(&self, room_code: &RoomCode, connection_id: &ConnectionId) {
        let mut groups = self.groups.lock().await;
        let Some(group) = groups.get(room_code.as_str()).cloned() else {
            return;
        };
        let mut members = group.lock().await;
        members.remove(connection_id);
        if members.is_empty() {
            // 空のグループを残さない
            groups.remove(room_code.as_str());
        }
        tracing::debug!(
            "Connection '{}' unregistered from room '{}'",
            connection_id,
            room_code
        );
    }

    async fn broadcast(&self, room_code: &RoomCode, content: &str) {
        let Some(group) = self.group_of(room_code).await else {
            return;
        };
        let members = group.lock().await;
        for (connection_id, sender) in members.iter() {
            Self::send_event(
                connection_id,
                sender,
                PusherEvent::Message(content.to_string()),
            );
        }
        tracing::debug!("Broadcasted to {} members of room '{}'", members.len(), room_code);
    }

    async fn broadcast_except(
        &self,
        room_code: &RoomCode,
        exclude: &ConnectionId,
        content: &str,
    ) {
        let Some(group) = self.group_of(room_code).await else {
            return;
        };
        let members = group.lock().await;
        for (connection_id, sender) in members.iter() {
            if connection_id != exclude {
                Self::send_event(
                    connection_id,
                    sender,
                    PusherEvent::Message(content.to_string()),
                );
            }
        }
    }

    async fn close_room(&self, room_code: &RoomCode) {
        // グループを一覧から外してから Close を配る。以後の register は
        // 新しい（すぐ空で消える）グループに入るだけで、閉じた集合には
        // 合流しない。
        let group = {
            let mut groups = self.groups.lock().await;
            groups.remove(room_code.as_str())
        };
        let Some(group) = group else {
            return;
        };
        let mut members = group.lock().await;
        for (connection_id, sender) in members.iter() {
            Self::send_event(connection_id, sender, PusherEvent::Close);
        }
        let count = members.len();
        members.clear();
        tracing::info!("Closed room '{}', {} sessions force-closed", room_code, count);
    }

    async fn session_count(&self, room_code: &RoomCode) -> usize {
        let Some(group) = self.group_of(room_code).await else {
            return 0;
        };
        let members = group.lock().await;
        members.len()
    }
}
