use axum::extract::ws::Message;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, Mutex};

use crate::models::config::DebugConfig;
use crate::models::game::Match;
use crate::models::role::Seat;
use crate::models::room::Room;

/// 进程内共享状态。每局对局互相独立，按房间号加锁；
/// 一局之内由单把锁串行化全部提交与结算。
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<Mutex<HashMap<String, Room>>>,
    pub matches: Arc<Mutex<HashMap<String, Match>>>,
    pub channel: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
    pub debug_config: Arc<DebugConfig>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            matches: Arc::new(Mutex::new(HashMap::new())),
            channel: Arc::new(Mutex::new(HashMap::new())),
            debug_config: Arc::new(DebugConfig::from_env()),
        }
    }

    pub async fn get_or_create_room_channel(&self, room_id: &str) -> broadcast::Sender<Message> {
        let mut channels = self.channel.lock().await;
        if let Some(channel) = channels.get(room_id) {
            channel.clone()
        } else {
            let (tx, _) = broadcast::channel(1000);
            channels.insert(room_id.to_string(), tx.clone());
            tx
        }
    }

    /// 全房间广播。投递失败只记日志，不影响对局推进。
    pub async fn broadcast_room(&self, room_id: &str, payload: serde_json::Value) {
        let tx = self.get_or_create_room_channel(room_id).await;
        match serde_json::to_string(&payload) {
            Ok(text) => {
                if let Err(e) = tx.send(Message::Text(text)) {
                    log::warn!("房间 {} 广播失败: {}", room_id, e);
                }
            }
            Err(e) => log::warn!("房间 {} 广播序列化失败: {}", room_id, e),
        }
    }

    pub async fn broadcast_phase_change(&self, room_id: &str, from_phase: &str, to_phase: &str) {
        self.broadcast_room(
            room_id,
            serde_json::json!({
                "message_type": "phase_change",
                "from_phase": from_phase,
                "to_phase": to_phase,
                "room_id": room_id,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }),
        )
        .await;
    }

    /// 定向私信（查验结果、继承通知）。单向推送，尽力而为。
    pub async fn notify_seat(
        &self,
        room_id: &str,
        seat: Seat,
        notice_type: &str,
        data: serde_json::Value,
    ) {
        self.broadcast_room(
            room_id,
            serde_json::json!({
                "message_type": "private_notice",
                "notice_type": notice_type,
                "target_seat": seat,
                "data": data,
                "room_id": room_id,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }),
        )
        .await;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
