use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::services::room_service;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create_room_handler))
        .route("/list", get(list_rooms_handler))
        .route("/:roomid", get(get_room_handler))
        .route("/:roomid/join", post(join_room_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateRoomRequest {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JoinRoomRequest {
    player_name: String,
}

async fn create_room_handler(
    State(state): State<AppState>,
    body: Option<Json<CreateRoomRequest>>,
) -> impl IntoResponse {
    let name = body.and_then(|Json(req)| req.name);
    let room_id = room_service::create_room(state, name).await;
    (StatusCode::OK, Json(format!("Room created with ID: {}", room_id)))
}

async fn join_room_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<JoinRoomRequest>,
) -> impl IntoResponse {
    match room_service::join_room(state, &room_id, &req.player_name).await {
        Some(seat) => (StatusCode::OK, Json(format!("已入座: {}号", seat))),
        None => (
            StatusCode::BAD_REQUEST,
            Json("房间不存在、已满员或已开局".to_string()),
        ),
    }
}

async fn get_room_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match room_service::get_room(state, &room_id).await {
        Some(room) => (StatusCode::OK, Json(serde_json::json!(room))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!("房间不存在")),
        ),
    }
}

async fn list_rooms_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = room_service::list_open_rooms(state).await;
    (StatusCode::OK, Json(serde_json::json!(rooms)))
}
