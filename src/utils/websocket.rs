use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::role::Seat;
use crate::state::AppState;

/// 客户端发上来的聊天消息。引擎相关的提交都走 REST 接口，
/// 这条通道只负责闲聊转发与服务端推送（阶段广播、私信通知）。
#[derive(Debug, Serialize, Deserialize)]
struct WsChatMessage {
    message_type: String,
    seat: Seat,
    player_name: String,
    content: String,
    #[serde(default)]
    room_id: String,
    #[serde(default)]
    timestamp: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Path((room_id, seat)): Path<(String, Seat)>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, seat))
}

pub async fn handle_socket(ws: WebSocket, state: AppState, room_id: String, seat: Seat) {
    info!("房间 {} 的 {} 号建立了 WebSocket 连接", room_id, seat);
    let tx = state.get_or_create_room_channel(&room_id).await;

    let (mut sender, mut receiver) = ws.split();
    let mut rx = tx.subscribe();

    let room_id_for_receive = room_id.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                match serde_json::from_str::<WsChatMessage>(&text) {
                    Ok(mut chat) => {
                        chat.seat = seat;
                        chat.room_id = room_id_for_receive.clone();
                        chat.timestamp = chrono::Utc::now().to_rfc3339();
                        match serde_json::to_string(&chat) {
                            Ok(response) => {
                                if tx.send(Message::Text(response)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("聊天消息序列化失败: {}", e),
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "房间 {} 收到格式不正确的消息: {}",
                            room_id_for_receive,
                            e
                        );
                    }
                }
            }
        }
    });

    let room_id_for_send = room_id.clone();
    let send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if let Message::Text(text) = &msg {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
                    // 别的房间的消息不转发
                    if value
                        .get("room_id")
                        .and_then(|v| v.as_str())
                        .map(|r| r != room_id_for_send)
                        .unwrap_or(false)
                    {
                        continue;
                    }
                    // 定向私信只发给目标座位
                    if let Some(target) = value.get("target_seat").and_then(|v| v.as_u64()) {
                        if target != seat as u64 {
                            continue;
                        }
                    }
                }
            }
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let _ = tokio::join!(receive_task, send_task);
}
