//! Room Lifecycle Manager: ホスト不在時の猶予期間とルーム破棄
//!
//! ## 状態遷移
//!
//! ```text
//! ACTIVE → PENDING_DELETION → DELETED (終端)
//!             ↓ (ホスト再接続)
//!           ACTIVE
//! ```
//!
//! 状態は pending_deletions マップのエントリ有無で表現する：
//! エントリあり = PENDING_DELETION、エントリなしでルームあり = ACTIVE、
//! ルームなし = DELETED。
//!
//! ## 競合の扱い
//!
//! タイマーの発火とキャンセルは、マップからの「自分のエントリの除去」を
//! 唯一の判定点として競合する。発火したタスクはロック下でエントリを除去
//! できた場合のみ破棄処理を行う。cancel が先にエントリを除去していれば
//! タスクは何もしない。どちらか一方だけがちょうど一度、処理を行う。

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};

use crate::domain::{MessagePusher, RoomCode, RoomRepository};

/// ホスト切断からルーム破棄までの猶予（デフォルト 10 秒）
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// 破棄通知の本文
const ROOM_CLOSED_NOTICE: &str = "The host has ended the watch party.";

/// ルーム寿命の管理者
///
/// プロセス起動時に 1 つ作られ、全接続で共有される。pending_deletions の
/// 読み書きは必ず内部の Mutex 越しに行われる。
pub struct RoomLifecycleManager {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（ブロードキャストグループの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルームコード → 猶予タイマーのタスク
    ///
    /// インバリアント: 1 ルームにつき高々 1 エントリ。
    pending_deletions: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    /// 猶予期間
    grace_period: Duration,
}

impl RoomLifecycleManager {
    /// 新しい RoomLifecycleManager を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        grace_period: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            pending_deletions: Arc::new(Mutex::new(HashMap::new())),
            grace_period,
        }
    }

    /// 猶予期間を開始する（ACTIVE → PENDING_DELETION）
    ///
    /// 既に猶予期間中であれば何もしない（冪等）。
    pub async fn begin_grace_period(&self, room_code: &RoomCode) {
        let mut pending = self.pending_deletions.lock().await;
        if pending.contains_key(room_code.as_str()) {
            tracing::debug!(
                "Grace period already running for room '{}', ignoring",
                room_code
            );
            return;
        }

        let task = tokio::spawn(delayed_room_deletion(
            self.repository.clone(),
            self.message_pusher.clone(),
            self.pending_deletions.clone(),
            room_code.clone(),
            self.grace_period,
        ));
        pending.insert(room_code.as_str().to_string(), task);
        tracing::info!(
            "Host left room '{}', deleting in {:?} unless they reconnect",
            room_code,
            self.grace_period
        );
    }

    /// 猶予期間を打ち切る（PENDING_DELETION → ACTIVE）
    ///
    /// タイマーが既に発火した後の呼び出しは何もしない（ルームは既に無く、
    /// 再接続したホストには room-not-found として見える）。打ち切った
    /// 場合は true を返す。
    pub async fn cancel_grace_period(&self, room_code: &RoomCode) -> bool {
        let mut pending = self.pending_deletions.lock().await;
        match pending.remove(room_code.as_str()) {
            Some(task) => {
                task.abort();
                tracing::info!("Pending deletion of room '{}' cancelled", room_code);
                true
            }
            None => false,
        }
    }

    /// ルームが猶予期間中（PENDING_DELETION）かどうか
    pub async fn is_pending_deletion(&self, room_code: &RoomCode) -> bool {
        let pending = self.pending_deletions.lock().await;
        pending.contains_key(room_code.as_str())
    }
}

/// 猶予タイマーの本体。猶予期間だけ待ち、まだ登録されていれば
/// ルームを破棄する。
async fn delayed_room_deletion(
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    pending_deletions: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    room_code: RoomCode,
    grace_period: Duration,
) {
    tokio::time::sleep(grace_period).await;

    // 判定と登録解除を 1 つのロック区間で行う。ここでエントリを除去
    // できなければ cancel が先に勝っている。
    let still_pending = {
        let mut pending = pending_deletions.lock().await;
        pending.remove(room_code.as_str()).is_some()
    };
    if !still_pending {
        tracing::debug!(
            "Grace period for room '{}' was cancelled before expiry",
            room_code
        );
        return;
    }

    if let Err(e) = repository.delete_room(&room_code).await {
        tracing::warn!("Failed to delete room '{}' from registry: {}", room_code, e);
    }

    let notice = serde_json::json!({
        "type": "room_closed",
        "message": ROOM_CLOSED_NOTICE,
    })
    .to_string();
    message_pusher.broadcast(&room_code, &notice).await;
    message_pusher.close_room(&room_code).await;

    tracing::info!("Room '{}' deleted after grace period expiry", room_code);
}
