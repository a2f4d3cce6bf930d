//! UseCase 層のエラー型

use thiserror::Error;

/// 接続受付（ConnectSessionUseCase）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectSessionError {
    /// 指定されたコードのルームが存在しない
    #[error("room not found")]
    RoomNotFound,

    /// レジストリの読み取りに失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}

/// join 処理（JoinRoomUseCase）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinRoomError {
    /// join 到達時点でルームが既に削除されていた
    #[error("room no longer exists")]
    RoomNotFound,

    /// レジストリの読み取りに失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}

/// 再生同期（SyncPlaybackUseCase）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncPlaybackError {
    /// ホスト以外のセッションが再生状態を変更しようとした
    #[error("only the host can control playback")]
    NotHost,

    /// ルームが既に削除されていた
    #[error("room no longer exists")]
    RoomNotFound,

    /// レジストリの書き込みに失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}

/// ルーム作成（CreateRoomUseCase）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateRoomError {
    /// 一意なルームコードの採番に失敗した
    #[error("failed to mint a unique room code")]
    CodeMintingFailed,

    /// レジストリの書き込みに失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}

/// ルーム取得（GetRoomUseCase）のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GetRoomError {
    /// 指定されたコードのルームが存在しない
    #[error("room not found")]
    RoomNotFound,

    /// レジストリの読み取りに失敗した
    #[error("storage failure: {0}")]
    Storage(String),
}
