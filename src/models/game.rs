use log::{error, info};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::engine::{self, EngineError, ExamNotice, PromotionNotice};
use crate::models::action::{NightAction, NightActionSet, SpeechDecision};
use crate::models::chat::{SpeechKind, SpeechLog};
use crate::models::log::{DeathCause, NightEffect, ResolutionLog};
use crate::models::player::Player;
use crate::models::role::{canonical_roles, NightAbility, Role, RoleMix, Seat, SEAT_COUNT};
use crate::models::vote::VoteRecord;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchPhase {
    Night,       // 夜间行动提交
    NightReveal, // 天亮公布夜间结果
    Discussion,  // 按序发言
    Vote,        // 公开投票
    Execution,   // 处决与揭示
    Evaluation,  // 胜负判定
    Ended,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchOutcome {
    Ongoing,
    GoodWin,
    BadWin,
    Draw,
}

/// 提交边界的可恢复错误。拒绝后局面不变，调用方可重试或弃权。
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("当前阶段（{phase:?}）不允许该操作")]
    InvalidPhase { phase: MatchPhase },
    #[error("座位非法: {0}")]
    InvalidSeat(String),
    #[error("目标非法: {0}")]
    InvalidTarget(String),
    #[error("该轮已封盘，不可再改动")]
    SealedRoundMutation,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// 一次阶段推进的产出。查验结果与继承通知走私信通道，
/// 不随公开状态下发。
#[derive(Debug)]
pub struct PhaseTransition {
    pub from: MatchPhase,
    pub to: MatchPhase,
    pub exams: Vec<ExamNotice>,
    pub promotions: Vec<PromotionNotice>,
    pub executed: Option<Seat>,
}

/// 一局对局的聚合根。阶段与轮次只归它管；
/// 夜间结算、计票、胜负判定都由它在阶段边界上调用。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub room_id: String,
    pub round: u32,
    pub phase: MatchPhase,
    pub outcome: MatchOutcome,
    pub aborted: bool,
    pub players: Vec<Player>,
    pub night_actions: NightActionSet,
    pub votes: VoteRecord,
    pub log: ResolutionLog,
    pub speeches: SpeechLog,
    pub last_night_deaths: Vec<Seat>,
    /// 死零人或多人的那天由外部指定的开场发言者
    pub chosen_opener: Option<Seat>,
}

impl Match {
    /// 随机分配角色并进入第一夜。
    pub fn new(room_id: String, names: Vec<String>, mix: &RoleMix) -> Self {
        let mut roles = canonical_roles(mix);
        roles.shuffle(&mut rand::thread_rng());
        Self::with_roles(room_id, names.into_iter().zip(roles).collect())
    }

    /// 按给定的座位→角色顺序开局（测试与复盘用）。
    pub fn with_roles(room_id: String, assignments: Vec<(String, Role)>) -> Self {
        let players = assignments
            .into_iter()
            .enumerate()
            .map(|(i, (name, role))| Player::new(i as Seat + 1, name, role))
            .collect();
        Match {
            room_id,
            round: 1,
            phase: MatchPhase::Night,
            outcome: MatchOutcome::Ongoing,
            aborted: false,
            players,
            night_actions: NightActionSet::new(1),
            votes: VoteRecord::new(1),
            log: ResolutionLog::default(),
            speeches: SpeechLog::default(),
            last_night_deaths: Vec::new(),
            chosen_opener: None,
        }
    }

    pub fn player(&self, seat: Seat) -> Option<&Player> {
        self.players.iter().find(|p| p.seat == seat)
    }

    fn living_player(&self, seat: Seat) -> Result<&Player, MatchError> {
        let player = self
            .player(seat)
            .ok_or_else(|| MatchError::InvalidSeat(format!("{}号座位不存在", seat)))?;
        if !player.alive {
            return Err(MatchError::InvalidSeat(format!("{}号已死亡", seat)));
        }
        Ok(player)
    }

    fn ensure_round(&self, round: u32) -> Result<(), MatchError> {
        if round != self.round {
            return Err(MatchError::SealedRoundMutation);
        }
        Ok(())
    }

    fn ensure_phase(&self, expected: MatchPhase) -> Result<(), MatchError> {
        if self.phase != expected {
            return Err(MatchError::InvalidPhase { phase: self.phase });
        }
        Ok(())
    }

    fn check_target(&self, target: Seat) -> Result<(), MatchError> {
        if target == 0 || target as usize > SEAT_COUNT {
            return Err(MatchError::InvalidTarget(format!("{}号不在座位范围内", target)));
        }
        match self.player(target) {
            Some(p) if p.alive => Ok(()),
            _ => Err(MatchError::InvalidTarget(format!("{}号不是存活座位", target))),
        }
    }

    // ---- 提交边界 ----

    pub fn submit_night_action(
        &mut self,
        round: u32,
        seat: Seat,
        target: Option<Seat>,
    ) -> Result<(), MatchError> {
        self.ensure_phase(MatchPhase::Night)?;
        self.ensure_round(round)?;
        if self.night_actions.sealed {
            return Err(MatchError::SealedRoundMutation);
        }
        let player = self.living_player(seat)?;
        let ability = player.role.night_ability();
        if self.night_actions.has_submitted(seat) {
            return Err(MatchError::InvalidSeat(format!("{}号本轮已提交行动", seat)));
        }
        if let Some(target) = target {
            if ability == NightAbility::None {
                return Err(MatchError::InvalidTarget(format!(
                    "{}号的角色没有夜间行动",
                    seat
                )));
            }
            self.check_target(target)?;
        }
        self.night_actions.insert(NightAction { seat, ability, target });
        if self.night_submissions_complete() {
            self.night_actions.seal();
        }
        Ok(())
    }

    pub fn submit_public_vote(
        &mut self,
        round: u32,
        seat: Seat,
        target: Seat,
    ) -> Result<(), MatchError> {
        self.ensure_phase(MatchPhase::Vote)?;
        self.ensure_round(round)?;
        if self.votes.sealed {
            return Err(MatchError::SealedRoundMutation);
        }
        let player = self.living_player(seat)?;
        if player.muted_next_day {
            return Err(MatchError::InvalidSeat(format!("{}号被禁言，今天不能投票", seat)));
        }
        if self.votes.has_voted(seat) {
            return Err(MatchError::InvalidSeat(format!("{}号本轮已投票", seat)));
        }
        if target != 0 {
            self.check_target(target)?;
        }
        self.votes.insert(seat, target);
        if self.vote_submissions_complete() {
            self.votes.seal();
        }
        Ok(())
    }

    pub fn submit_speech(
        &mut self,
        round: u32,
        seat: Seat,
        decision: SpeechDecision,
    ) -> Result<(), MatchError> {
        self.ensure_phase(MatchPhase::Discussion)?;
        self.ensure_round(round)?;
        let player = self.living_player(seat)?;
        if player.muted_next_day {
            return Err(MatchError::InvalidSeat(format!("{}号被禁言，今天不能发言", seat)));
        }
        if self.has_spoken(seat) {
            return Err(MatchError::InvalidSeat(format!("{}号本轮已发言", seat)));
        }
        if let Some(claimed) = decision.claimed_role {
            if let Some(p) = self.players.iter_mut().find(|p| p.seat == seat) {
                p.claimed_role = Some(claimed);
            }
        }
        self.speeches.add_player_speech(
            round,
            seat,
            decision.content,
            decision.claimed_role,
            decision.assessments,
            (!decision.strategy_note.is_empty()).then_some(decision.strategy_note.clone()),
            decision.long_term_plan,
        );
        Ok(())
    }

    /// 指定今天的开场发言者。只在讨论阶段接受，且必须是能发言的存活座位。
    pub fn choose_opener(&mut self, seat: Seat) -> Result<(), MatchError> {
        self.ensure_phase(MatchPhase::Discussion)?;
        let player = self.living_player(seat)?;
        if player.muted_next_day {
            return Err(MatchError::InvalidSeat(format!(
                "{}号被禁言，不能开场发言",
                seat
            )));
        }
        self.chosen_opener = Some(seat);
        Ok(())
    }

    fn has_spoken(&self, seat: Seat) -> bool {
        self.speeches.entries.iter().any(|e| {
            e.round == self.round && matches!(e.kind, SpeechKind::Player { seat: s, .. } if s == seat)
        })
    }

    /// 所有需要行动的存活座位都已提交
    pub fn night_submissions_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.alive && p.role.night_ability() != NightAbility::None)
            .all(|p| self.night_actions.has_submitted(p.seat))
    }

    /// 所有有投票资格（存活且未被禁言）的座位都已投票
    pub fn vote_submissions_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.alive && !p.muted_next_day)
            .all(|p| self.votes.has_voted(p.seat))
    }

    /// 今天的发言顺序
    pub fn speech_order(&self) -> Vec<Seat> {
        engine::speech_order(&self.players, &self.last_night_deaths, self.chosen_opener)
    }

    // ---- 阶段机 ----

    /// 推进到下一阶段，并在阶段边界上执行结算 / 计票 / 胜负判定。
    /// 未提交的行动按「无行动」处理，因此截止驱动的推进与
    /// 全员提交后的推进走同一条路径。
    pub fn advance_phase(&mut self) -> Result<PhaseTransition, MatchError> {
        let from = self.phase;
        let mut transition = PhaseTransition {
            from,
            to: from,
            exams: Vec::new(),
            promotions: Vec::new(),
            executed: None,
        };

        match self.phase {
            MatchPhase::Night => {
                self.night_actions.seal();
                let actions = self.night_actions.clone();
                let outcome =
                    match engine::resolve_night(&actions, &mut self.players, &mut self.log) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            // 不变量被破坏：整局作废并标记待查，不再接受任何提交
                            error!("对局 {} 结算失败，整局作废: {}", self.room_id, e);
                            self.abort();
                            return Err(e.into());
                        }
                    };
                self.last_night_deaths = outcome.deaths.clone();
                self.announce_dawn();
                transition.exams = outcome.exams;
                transition.promotions = outcome.promotions;
                // 夜间死亡后立即判定一次胜负
                self.outcome = engine::evaluate(&self.players);
                self.phase = if self.outcome == MatchOutcome::Ongoing {
                    MatchPhase::NightReveal
                } else {
                    MatchPhase::Ended
                };
            }
            MatchPhase::NightReveal => {
                self.phase = MatchPhase::Discussion;
            }
            MatchPhase::Discussion => {
                self.phase = MatchPhase::Vote;
            }
            MatchPhase::Vote => {
                self.votes.seal();
                let tally = engine::tally(&self.votes, &self.players);
                if let Some(seat) = tally.executed {
                    self.execute(seat, &tally, &mut transition);
                } else {
                    self.speeches
                        .add_system_message(self.round, "投票并列或无票，今天无人被处决".to_string());
                }
                // 暗票余额随本次计票一并消耗，无论是否有人被处决
                for p in self.players.iter_mut() {
                    p.hidden_vote_balance = 0;
                }
                transition.executed = tally.executed;
                self.phase = MatchPhase::Execution;
            }
            MatchPhase::Execution => {
                self.outcome = engine::evaluate(&self.players);
                self.phase = MatchPhase::Evaluation;
            }
            MatchPhase::Evaluation => {
                if self.outcome == MatchOutcome::Ongoing {
                    self.next_round();
                } else {
                    self.phase = MatchPhase::Ended;
                    info!("对局 {} 结束: {:?}", self.room_id, self.outcome);
                }
            }
            MatchPhase::Ended => {
                return Err(MatchError::InvalidPhase { phase: self.phase });
            }
        }

        transition.to = self.phase;
        Ok(transition)
    }

    fn execute(&mut self, seat: Seat, tally: &engine::TallyOutcome, transition: &mut PhaseTransition) {
        if let Some(p) = self.players.iter_mut().find(|p| p.seat == seat) {
            p.alive = false;
        }
        self.log
            .append(self.round, NightEffect::Death { seat, cause: DeathCause::Execution });
        let reveal = match tally.revealed_bad_special {
            Some(true) => format!("{}号被处决，身份是恶方特殊角色", seat),
            _ => format!("{}号被处决，不是恶方特殊角色", seat),
        };
        self.speeches.add_system_message(self.round, reveal);
        if tally.last_words_allowed == Some(false) {
            self.speeches
                .add_system_message(self.round, format!("{}号没有遗言", seat));
        }
        // 被处决的可能是杀手，处决后立即走继承
        if let Some(promotion) = engine::check_succession(self.round, &mut self.players, &mut self.log)
        {
            transition.promotions.push(promotion);
        }
    }

    fn announce_dawn(&mut self) {
        let deaths = &self.last_night_deaths;
        let text = if deaths.is_empty() {
            format!("第{}夜平安无事", self.round)
        } else {
            let seats: Vec<String> = deaths.iter().map(|s| format!("{}号", s)).collect();
            format!("第{}夜死亡: {}", self.round, seats.join("、"))
        };
        self.speeches.add_system_message(self.round, text);
    }

    fn next_round(&mut self) {
        for p in self.players.iter_mut() {
            p.clear_day_flags();
            p.clear_night_flags();
        }
        self.round += 1;
        self.night_actions = NightActionSet::new(self.round);
        self.votes = VoteRecord::new(self.round);
        self.last_night_deaths.clear();
        self.chosen_opener = None;
        self.phase = MatchPhase::Night;
    }

    /// 中止整局。未结算的行动与投票作废，不应用任何半截效果。
    pub fn abort(&mut self) {
        self.night_actions = NightActionSet::new(self.round);
        self.votes = VoteRecord::new(self.round);
        self.aborted = true;
        self.phase = MatchPhase::Ended;
        info!("对局 {} 已中止", self.room_id);
    }

    /// 已结束的局面重复判定返回同一结果。
    pub fn evaluate(&self) -> MatchOutcome {
        if self.phase == MatchPhase::Ended {
            self.outcome
        } else {
            engine::evaluate(&self.players)
        }
    }
}
