use serde::{Deserialize, Serialize};

use super::role::{Seat, SEAT_COUNT};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum RoomStatus {
    Open,
    InProgress,
    Closed,
}

/// 开局前的座位绑定。引擎只假设座位在整局内绑定稳定身份，
/// 会话与重连都在外部处理。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomMember {
    pub seat: Seat,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub name: Option<String>,
    pub members: Vec<RoomMember>,
    pub status: RoomStatus,
}

impl Room {
    pub fn new(room_id: String, name: Option<String>) -> Self {
        Room {
            room_id,
            name,
            members: Vec::new(),
            status: RoomStatus::Open,
        }
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= SEAT_COUNT
    }

    /// 入座：按座位号从小到大分配下一个空位。
    pub fn take_seat(&mut self, name: String) -> Option<Seat> {
        if self.status != RoomStatus::Open || self.is_full() {
            return None;
        }
        let seat = (1..=SEAT_COUNT as Seat).find(|s| !self.members.iter().any(|m| m.seat == *s))?;
        self.members.push(RoomMember { seat, name });
        Some(seat)
    }
}
