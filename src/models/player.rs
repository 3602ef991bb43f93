use serde::{Deserialize, Serialize};

use super::role::{Role, Seat};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub seat: Seat,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    /// 被森林老人禁言，次日不能发言也不能投票，过完一天自动清除
    pub muted_next_day: bool,
    /// 医生空针计数（0..=2），第二针空针后医生次日死亡
    pub pending_needle_count: u8,
    /// 当夜被花蝴蝶庇护（仅当夜有效）
    pub sheltered: bool,
    /// 当夜被魔法师施法（仅当夜有效）
    pub was_negated: bool,
    /// 最近一次公开声称的角色，仅作信息展示
    pub claimed_role: Option<Role>,
    /// 夜间暗票余额，累积到次日计票时一并消耗
    pub hidden_vote_balance: i32,
}

impl Player {
    pub fn new(seat: Seat, name: String, role: Role) -> Self {
        Player {
            seat,
            name,
            role,
            alive: true,
            muted_next_day: false,
            pending_needle_count: 0,
            sheltered: false,
            was_negated: false,
            claimed_role: None,
            hidden_vote_balance: 0,
        }
    }

    /// 每夜开始前清除只在一夜内有效的标记
    pub fn clear_night_flags(&mut self) {
        self.sheltered = false;
        self.was_negated = false;
    }

    /// 一个白天结束后清除禁言
    pub fn clear_day_flags(&mut self) {
        self.muted_next_day = false;
    }
}
