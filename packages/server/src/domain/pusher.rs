//! MessagePusher trait 定義
//!
//! ルーム単位のブロードキャストグループ（メンバー管理とファンアウト）の
//! インターフェースを定義します。具体的な実装は Infrastructure 層が提供
//! します（依存性の逆転）。プロセスを跨ぐ pub/sub トランスポートへの
//! 差し替えもこの trait の実装を入れ替えるだけで済みます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::value_object::RoomCode;

/// セッションへ送るイベント
///
/// `Message` は配信する JSON テキスト、`Close` はサーバ側からの強制切断
/// （ルーム削除時に残存セッションを閉じるために使う）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PusherEvent {
    /// Deliver a JSON payload to the session
    Message(String),
    /// Force-close the session's connection
    Close,
}

/// セッションごとの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<PusherEvent>;

/// 接続ごとの一意な識別子
///
/// `session_id` とは別物。`session_id` はクライアントが名乗る永続的な
/// 識別子（ホスト判定に使う）で、`ConnectionId` は 1 本の WebSocket
/// 接続の寿命にのみ紐づく。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// MessagePusher trait
///
/// ルームコードごとのメンバー集合を管理し、グループ送信を行う。
///
/// ## 配信保証
///
/// 配信はメンバーごとのベストエフォート。切断途中のメンバーへの送信失敗は
/// 他のメンバーへの配信を妨げず、呼び出し元へもエラーを返さない。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// セッションをルームのグループに追加する（グループが無ければ作る）
    async fn register_session(
        &self,
        room_code: &RoomCode,
        connection_id: ConnectionId,
        sender: PusherChannel,
    );

    /// セッションをルームのグループから外す（空になったグループは消す）
    async fn unregister_session(&self, room_code: &RoomCode, connection_id: &ConnectionId);

    /// ルームの全メンバーへ配信する
    async fn broadcast(&self, room_code: &RoomCode, content: &str);

    /// 指定した接続を除く全メンバーへ配信する
    async fn broadcast_except(
        &self,
        room_code: &RoomCode,
        exclude: &ConnectionId,
        content: &str,
    );

    /// ルームのグループを破棄し、残存セッションを強制切断する
    async fn close_room(&self, room_code: &RoomCode);

    /// ルームの現在のメンバー数を返す
    async fn session_count(&self, room_code: &RoomCode) -> usize;
}
