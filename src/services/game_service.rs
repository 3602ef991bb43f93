use serde::{Deserialize, Serialize};

use crate::models::{
    action::{NightActionRequest, SpeechRequest, VoteRequest},
    chat::SpeechEntry,
    game::{Match, MatchError, MatchOutcome, MatchPhase, PhaseTransition},
    log::LogEntry,
    role::{canonical_roles, Role, RoleMix, Seat},
    room::RoomStatus,
};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum GameServiceError {
    #[error("房间不存在")]
    RoomNotFound,
    #[error("对局不存在")]
    MatchNotFound,
    #[error("房间未满员，不能开局")]
    RoomNotReady,
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl GameServiceError {
    /// 提交边界的四类拒绝都是可恢复的，局面不变；
    /// 只有引擎不变量被破坏才算致命。
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameServiceError::Match(MatchError::Engine(_)))
    }
}

/// 对外公开的对局视图。真实角色只在调试配置打开时带出。
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchView {
    pub room_id: String,
    pub round: u32,
    pub phase: MatchPhase,
    pub outcome: MatchOutcome,
    pub aborted: bool,
    pub players: Vec<PlayerView>,
    pub last_night_deaths: Vec<Seat>,
    pub speech_order: Vec<Seat>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub name: String,
    pub alive: bool,
    pub muted: bool,
    pub claimed_role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

pub async fn start_match(state: AppState, room_id: &str) -> Result<MatchView, GameServiceError> {
    let mut rooms = state.rooms.lock().await;
    let room = rooms.get_mut(room_id).ok_or(GameServiceError::RoomNotFound)?;
    if !room.is_full() {
        return Err(GameServiceError::RoomNotReady);
    }

    let names: Vec<String> = {
        let mut members = room.members.clone();
        members.sort_by_key(|m| m.seat);
        members.into_iter().map(|m| m.name).collect()
    };
    let mix = RoleMix::default();
    let game_match = if state.debug_config.random_role {
        Match::new(room_id.to_string(), names, &mix)
    } else {
        // 调试：按固定顺序发牌
        Match::with_roles(
            room_id.to_string(),
            names.into_iter().zip(canonical_roles(&mix)).collect(),
        )
    };
    room.status = RoomStatus::InProgress;

    let view = render_view(&game_match, &state);
    state
        .matches
        .lock()
        .await
        .insert(room_id.to_string(), game_match);
    drop(rooms);

    state.broadcast_phase_change(room_id, "Waiting", "Night").await;
    Ok(view)
}

pub async fn get_match_view(state: AppState, room_id: &str) -> Result<MatchView, GameServiceError> {
    let matches = state.matches.lock().await;
    let game_match = matches.get(room_id).ok_or(GameServiceError::MatchNotFound)?;
    Ok(render_view(game_match, &state))
}

pub async fn get_resolution_log(
    state: AppState,
    room_id: &str,
) -> Result<Vec<LogEntry>, GameServiceError> {
    let matches = state.matches.lock().await;
    let game_match = matches.get(room_id).ok_or(GameServiceError::MatchNotFound)?;
    Ok(game_match.log.entries.clone())
}

pub async fn get_speeches(
    state: AppState,
    room_id: &str,
) -> Result<Vec<SpeechEntry>, GameServiceError> {
    let matches = state.matches.lock().await;
    let game_match = matches.get(room_id).ok_or(GameServiceError::MatchNotFound)?;
    Ok(game_match.speeches.entries.clone())
}

/// 夜间行动提交。收齐全部存活角色的行动后自动封盘并开始结算。
pub async fn submit_night_action(
    state: AppState,
    room_id: &str,
    req: NightActionRequest,
) -> Result<(), GameServiceError> {
    let transition = {
        let mut matches = state.matches.lock().await;
        let game_match = matches.get_mut(room_id).ok_or(GameServiceError::MatchNotFound)?;
        game_match.submit_night_action(req.round, req.seat, req.decision.target)?;
        if game_match.night_actions.sealed {
            Some(game_match.advance_phase()?)
        } else {
            None
        }
    };
    if let Some(transition) = transition {
        deliver_transition(&state, room_id, &transition).await;
    }
    Ok(())
}

/// 公开投票提交。有资格的座位全部投完后自动封盘并计票。
pub async fn submit_public_vote(
    state: AppState,
    room_id: &str,
    req: VoteRequest,
) -> Result<(), GameServiceError> {
    let transition = {
        let mut matches = state.matches.lock().await;
        let game_match = matches.get_mut(room_id).ok_or(GameServiceError::MatchNotFound)?;
        game_match.submit_public_vote(req.round, req.seat, req.decision.target)?;
        if game_match.votes.sealed {
            Some(game_match.advance_phase()?)
        } else {
            None
        }
    };
    if let Some(transition) = transition {
        deliver_transition(&state, room_id, &transition).await;
    }
    Ok(())
}

pub async fn submit_speech(
    state: AppState,
    room_id: &str,
    req: SpeechRequest,
) -> Result<(), GameServiceError> {
    let mut matches = state.matches.lock().await;
    let game_match = matches.get_mut(room_id).ok_or(GameServiceError::MatchNotFound)?;
    game_match.submit_speech(req.round, req.seat, req.decision)?;
    Ok(())
}

/// 死零人或多人的那天，由调用方指定开场发言者。
pub async fn choose_opener(
    state: AppState,
    room_id: &str,
    seat: Seat,
) -> Result<(), GameServiceError> {
    let mut matches = state.matches.lock().await;
    let game_match = matches.get_mut(room_id).ok_or(GameServiceError::MatchNotFound)?;
    game_match.choose_opener(seat)?;
    Ok(())
}

/// 截止驱动的阶段推进：没收到的提交按「无行动」结算。
pub async fn advance_phase(
    state: AppState,
    room_id: &str,
) -> Result<(MatchPhase, MatchPhase), GameServiceError> {
    let transition = {
        let mut matches = state.matches.lock().await;
        let game_match = matches.get_mut(room_id).ok_or(GameServiceError::MatchNotFound)?;
        game_match.advance_phase()?
    };
    let phases = (transition.from, transition.to);
    deliver_transition(&state, room_id, &transition).await;
    Ok(phases)
}

/// 中止整局（例如全员掉线）。只允许发生在阶段边界，
/// 进行中的行动与投票整体作废。
pub async fn abort_match(state: AppState, room_id: &str) -> Result<(), GameServiceError> {
    {
        let mut matches = state.matches.lock().await;
        let game_match = matches.get_mut(room_id).ok_or(GameServiceError::MatchNotFound)?;
        game_match.abort();
    }
    if let Some(room) = state.rooms.lock().await.get_mut(room_id) {
        room.status = RoomStatus::Closed;
    }
    state.broadcast_phase_change(room_id, "Aborted", "Ended").await;
    Ok(())
}

pub async fn end_match(state: AppState, room_id: &str) -> Result<MatchOutcome, GameServiceError> {
    let outcome = {
        let matches = state.matches.lock().await;
        let game_match = matches.get(room_id).ok_or(GameServiceError::MatchNotFound)?;
        game_match.evaluate()
    };
    if let Some(room) = state.rooms.lock().await.get_mut(room_id) {
        room.status = RoomStatus::Closed;
    }
    Ok(outcome)
}

/// 阶段推进后的外发：公开的阶段广播，加上查验结果与继承通知的私信。
/// 全部尽力而为，失败不回传。
async fn deliver_transition(state: &AppState, room_id: &str, transition: &PhaseTransition) {
    state
        .broadcast_phase_change(
            room_id,
            &format!("{:?}", transition.from),
            &format!("{:?}", transition.to),
        )
        .await;
    for exam in &transition.exams {
        state
            .notify_seat(
                room_id,
                exam.examiner,
                "exam_result",
                serde_json::to_value(exam).unwrap_or_default(),
            )
            .await;
    }
    for promotion in &transition.promotions {
        state
            .notify_seat(
                room_id,
                promotion.seat,
                "succession",
                serde_json::to_value(promotion).unwrap_or_default(),
            )
            .await;
    }
}

fn render_view(game_match: &Match, state: &AppState) -> MatchView {
    let show_roles = state.debug_config.show_player_roles;
    MatchView {
        room_id: game_match.room_id.clone(),
        round: game_match.round,
        phase: game_match.phase,
        outcome: game_match.outcome,
        aborted: game_match.aborted,
        players: game_match
            .players
            .iter()
            .map(|p| PlayerView {
                seat: p.seat,
                name: p.name.clone(),
                alive: p.alive,
                muted: p.muted_next_day,
                claimed_role: p.claimed_role,
                role: show_roles.then_some(p.role),
            })
            .collect(),
        last_night_deaths: game_match.last_night_deaths.clone(),
        speech_order: game_match.speech_order(),
    }
}
