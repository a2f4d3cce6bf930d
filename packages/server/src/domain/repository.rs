//! Repository trait 定義
//!
//! ドメイン層が必要とするルームレジストリへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::Room,
    error::RepositoryError,
    value_object::{PlaybackState, RoomCode},
};

/// Room Repository trait
///
/// ドメイン層が必要とするルームレジストリへのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// ## 永続化の範囲
///
/// レジストリが保持するのはルームレコードのみ。接続中のセッションや
/// チャット履歴は保持しない（セッションは MessagePusher、チャットは
/// 非永続のブロードキャストのみ）。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを新規登録する
    ///
    /// 同じコードのルームが既に存在する場合は
    /// [`RepositoryError::DuplicateRoomCode`] を返す。
    async fn insert_room(&self, room: Room) -> Result<(), RepositoryError>;

    /// コードでルームを取得する
    ///
    /// 存在しない場合は [`RepositoryError::RoomNotFound`] を返す。
    async fn get_room_by_code(&self, code: &RoomCode) -> Result<Room, RepositoryError>;

    /// ルームの再生状態を更新する
    ///
    /// 呼び出し側（Synchronization の UseCase）がホスト権限を検証済み
    /// であることが前提。ルームが存在しない場合は
    /// [`RepositoryError::RoomNotFound`] を返す。
    async fn update_playback(
        &self,
        code: &RoomCode,
        playback: PlaybackState,
    ) -> Result<(), RepositoryError>;

    /// ルームを削除する
    ///
    /// 既に存在しない場合も成功として扱う（冪等）。
    async fn delete_room(&self, code: &RoomCode) -> Result<(), RepositoryError>;
}
