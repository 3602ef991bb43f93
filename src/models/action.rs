use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::role::{NightAbility, Role, Seat};

/// 一名玩家一夜提交的行动。target 为 None 表示放弃行动。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightAction {
    pub seat: Seat,
    pub ability: NightAbility,
    pub target: Option<Seat>,
}

/// 一夜的全部行动，按座位号收集。封盘（seal）之后不可再改动。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightActionSet {
    pub round: u32,
    pub actions: HashMap<Seat, NightAction>,
    pub sealed: bool,
}

impl NightActionSet {
    pub fn new(round: u32) -> Self {
        NightActionSet {
            round,
            actions: HashMap::new(),
            sealed: false,
        }
    }

    pub fn has_submitted(&self, seat: Seat) -> bool {
        self.actions.contains_key(&seat)
    }

    pub fn insert(&mut self, action: NightAction) {
        self.actions.insert(action.seat, action);
    }

    pub fn action_of(&self, seat: Seat) -> Option<&NightAction> {
        self.actions.get(&seat)
    }

    /// 封盘。没提交的座位按「无行动」处理，不算错误。
    pub fn seal(&mut self) {
        self.sealed = true;
    }
}

// ---- AI 决策载荷（§外部接口）。引擎只读 target 和 claimed_role，其余原样存档。 ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAssessment {
    pub seat: Seat,
    /// None = "Unknown"
    pub guessed_role: Option<Role>,
    pub guessed_intent: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechDecision {
    pub content: String,
    #[serde(default)]
    pub assessments: Vec<SeatAssessment>,
    #[serde(default)]
    pub strategy_note: String,
    pub long_term_plan: Option<String>,
    pub claimed_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteDecision {
    /// 0 = 弃票
    pub target: Seat,
    pub reason: String,
    pub assessments: Option<Vec<SeatAssessment>>,
    pub long_term_plan: Option<String>,
    pub claimed_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightActionDecision {
    pub target: Option<Seat>,
    pub reason: String,
}

// ---- 提交请求体 ----

#[derive(Debug, Serialize, Deserialize)]
pub struct NightActionRequest {
    pub round: u32,
    pub seat: Seat,
    pub decision: NightActionDecision,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub round: u32,
    pub seat: Seat,
    pub decision: VoteDecision,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub round: u32,
    pub seat: Seat,
    pub decision: SpeechDecision,
}
