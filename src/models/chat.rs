use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::SeatAssessment;
use super::role::{Role, Seat};

/// 白天发言与系统公告的存档。引擎只消费 claimed_role，
/// 其余字段（判断列表、策略备注等）原样保存供复盘。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechLog {
    pub entries: Vec<SpeechEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechEntry {
    pub round: u32,
    pub kind: SpeechKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpeechKind {
    /// 玩家白天发言
    Player {
        seat: Seat,
        claimed_role: Option<Role>,
        #[serde(default)]
        assessments: Vec<SeatAssessment>,
        strategy_note: Option<String>,
        long_term_plan: Option<String>,
    },
    /// 系统公告（夜间结果、处决揭示）
    System,
}

impl SpeechLog {
    pub fn add_player_speech(
        &mut self,
        round: u32,
        seat: Seat,
        content: String,
        claimed_role: Option<Role>,
        assessments: Vec<SeatAssessment>,
        strategy_note: Option<String>,
        long_term_plan: Option<String>,
    ) {
        self.entries.push(SpeechEntry {
            round,
            kind: SpeechKind::Player {
                seat,
                claimed_role,
                assessments,
                strategy_note,
                long_term_plan,
            },
            content,
            timestamp: Utc::now(),
        });
    }

    pub fn add_system_message(&mut self, round: u32, content: String) {
        self.entries.push(SpeechEntry {
            round,
            kind: SpeechKind::System,
            content,
            timestamp: Utc::now(),
        });
    }
}
