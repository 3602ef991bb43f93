use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::models::action::{NightActionRequest, SpeechRequest, VoteRequest};
use crate::models::role::Seat;
use crate::services::game_service::{self, GameServiceError};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest(
            "/:roomid",
            Router::new()
                // 对局基本操作
                .route("/start", post(start_match_handler))
                .route("/end", post(end_match_handler))
                .route("/abort", post(abort_match_handler))
                .route("/state", get(get_state_handler))
                .route("/log", get(get_log_handler))
                .route("/speeches", get(get_speeches_handler))
                // 座位提交
                .nest(
                    "/actions",
                    Router::new()
                        .route("/night-action", post(night_action_handler))
                        .route("/vote", post(vote_handler))
                        .route("/speech", post(speech_handler)),
                )
                // 对局推进
                .route("/phase/next", post(advance_phase_handler))
                .route("/opener", post(choose_opener_handler)),
        )
        .with_state(state)
}

fn error_status(e: &GameServiceError) -> StatusCode {
    match e {
        GameServiceError::RoomNotFound | GameServiceError::MatchNotFound => StatusCode::NOT_FOUND,
        e if e.is_fatal() => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

async fn start_match_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::start_match(state, &room_id).await {
        Ok(view) => (StatusCode::OK, Json(serde_json::json!(view))),
        Err(e) => (error_status(&e), Json(serde_json::json!(e.to_string()))),
    }
}

async fn get_state_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::get_match_view(state, &room_id).await {
        Ok(view) => (StatusCode::OK, Json(serde_json::json!(view))),
        Err(e) => (error_status(&e), Json(serde_json::json!(e.to_string()))),
    }
}

async fn get_log_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::get_resolution_log(state, &room_id).await {
        Ok(entries) => (StatusCode::OK, Json(serde_json::json!(entries))),
        Err(e) => (error_status(&e), Json(serde_json::json!(e.to_string()))),
    }
}

async fn get_speeches_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::get_speeches(state, &room_id).await {
        Ok(entries) => (StatusCode::OK, Json(serde_json::json!(entries))),
        Err(e) => (error_status(&e), Json(serde_json::json!(e.to_string()))),
    }
}

async fn night_action_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<NightActionRequest>,
) -> impl IntoResponse {
    match game_service::submit_night_action(state, &room_id, req).await {
        Ok(()) => (StatusCode::OK, Json("行动已提交".to_string())),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}

async fn vote_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> impl IntoResponse {
    match game_service::submit_public_vote(state, &room_id, req).await {
        Ok(()) => (StatusCode::OK, Json("投票已提交".to_string())),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}

async fn speech_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<SpeechRequest>,
) -> impl IntoResponse {
    match game_service::submit_speech(state, &room_id, req).await {
        Ok(()) => (StatusCode::OK, Json("发言已记录".to_string())),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}

async fn advance_phase_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::advance_phase(state, &room_id).await {
        Ok((from, to)) => (
            StatusCode::OK,
            Json(format!("阶段已推进: {:?} -> {:?}", from, to)),
        ),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct OpenerRequest {
    seat: Seat,
}

async fn choose_opener_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<OpenerRequest>,
) -> impl IntoResponse {
    match game_service::choose_opener(state, &room_id, req.seat).await {
        Ok(()) => (StatusCode::OK, Json("开场发言者已指定".to_string())),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}

async fn abort_match_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::abort_match(state, &room_id).await {
        Ok(()) => (StatusCode::OK, Json("对局已中止".to_string())),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}

async fn end_match_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    match game_service::end_match(state, &room_id).await {
        Ok(outcome) => (StatusCode::OK, Json(format!("对局结果: {:?}", outcome))),
        Err(e) => (error_status(&e), Json(e.to_string())),
    }
}
