//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{RoomCode, SessionId, VideoUrl},
    infrastructure::dto::http::{CreateRoomRequest, RoomDto},
    ui::state::AppState,
    usecase::GetRoomError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a new watch-party room
///
/// The caller supplies the video URL and its own session identity; the
/// response carries the minted room code viewers connect with.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), StatusCode> {
    let video_url = match VideoUrl::try_from(request.video_url) {
        Ok(video_url) => video_url,
        Err(e) => {
            tracing::warn!("Rejecting room creation: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let host_session_id = match SessionId::try_from(request.host_session_id) {
        Ok(host_session_id) => host_session_id,
        Err(e) => {
            tracing::warn!("Rejecting room creation: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state
        .create_room_usecase
        .execute(video_url, host_session_id)
        .await
    {
        Ok(room) => Ok((StatusCode::CREATED, Json((&room).into()))),
        Err(e) => {
            tracing::error!("Failed to create room: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get room details by code
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomDto>, StatusCode> {
    let code = RoomCode::try_from(code).map_err(|_| StatusCode::BAD_REQUEST)?;

    match state.get_room_usecase.execute(&code).await {
        Ok(room) => Ok(Json((&room).into())),
        Err(GetRoomError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
        Err(GetRoomError::Storage(e)) => {
            tracing::error!("Registry lookup failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
