use uuid::Uuid;

use crate::models::role::Seat;
use crate::models::room::{Room, RoomStatus};
use crate::state::AppState;

pub async fn create_room(state: AppState, name: Option<String>) -> String {
    let room_id = Uuid::new_v4().to_string();
    let room = Room::new(room_id.clone(), name);
    state.rooms.lock().await.insert(room_id.clone(), room);
    room_id
}

/// 入座。房间已满、已开局或不存在时返回 None。
pub async fn join_room(state: AppState, room_id: &str, player_name: &str) -> Option<Seat> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms.get_mut(room_id)?;
    room.take_seat(player_name.to_string())
}

pub async fn get_room(state: AppState, room_id: &str) -> Option<Room> {
    state.rooms.lock().await.get(room_id).cloned()
}

pub async fn list_open_rooms(state: AppState) -> Vec<Room> {
    state
        .rooms
        .lock()
        .await
        .values()
        .filter(|r| r.status == RoomStatus::Open)
        .cloned()
        .collect()
}
