use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::{Role, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillSource {
    Killer,
    Sniper,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// 夜间被击杀。两把刀同时命中时记录两个来源（死亡只发生一次）。
    Killed(Vec<KillSource>),
    /// 白天被处决
    Execution,
    /// 医生第二次空针
    NeedleOverdose,
}

/// 一夜结算中生效（或被挡下）的效果。只追加，是当局的审计凭据，
/// 也是白天公告的数据来源。查验结果不入公开日志。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NightEffect {
    /// 魔法师施法命中
    Negated { target: Seat },
    /// 施法目标恰是庇护对象，庇护压过法术
    NegationToppedByShelter { target: Seat },
    /// 花蝴蝶本人被施法，整夜庇护失效
    ShelterNegated { butterfly: Seat },
    Sheltered { target: Seat },
    /// 花蝴蝶庇护自己，等于放弃
    ShelterForfeited { butterfly: Seat },
    KillLanded {
        source: KillSource,
        target: Seat,
        /// 刀口原本指向花蝴蝶、被转嫁到庇护对象时记录原目标
        redirected_from: Option<Seat>,
    },
    KillBlocked { source: KillSource, target: Seat },
    /// 杀手与狙击手同夜命中同一人
    RedundantKill { target: Seat },
    /// 医生救下了唯一一刀
    KillCancelled { target: Seat },
    NeedleWasted { doctor: Seat, count: u8 },
    NeedleOverdose { doctor: Seat },
    Silenced { target: Seat },
    SilenceBlocked { target: Seat },
    HiddenVoteBanked { voter: Seat, target: Seat },
    /// 同夜被禁言，暗票作废
    HiddenVoteForeclosed { voter: Seat },
    Death { seat: Seat, cause: DeathCause },
    /// 杀手之位继承
    Succession { seat: Seat, previous_role: Role },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub round: u32,
    pub effect: NightEffect,
    pub timestamp: DateTime<Utc>,
}

/// 全局结算日志，跨轮累积，只追加。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionLog {
    pub entries: Vec<LogEntry>,
}

impl ResolutionLog {
    pub fn append(&mut self, round: u32, effect: NightEffect) {
        self.entries.push(LogEntry {
            round,
            effect,
            timestamp: Utc::now(),
        });
    }

    pub fn entries_for_round(&self, round: u32) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.round == round)
    }

    /// 某一轮的死亡座位（按记录顺序）
    pub fn deaths_in_round(&self, round: u32) -> Vec<Seat> {
        self.entries_for_round(round)
            .filter_map(|e| match &e.effect {
                NightEffect::Death { seat, .. } => Some(*seat),
                _ => None,
            })
            .collect()
    }
}
