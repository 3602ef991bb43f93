use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::player::Player;
use crate::models::role::{Seat, SEAT_COUNT};
use crate::models::vote::VoteRecord;

/// 计票结果。totals 之外的字段只在有人被处决时有意义。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyOutcome {
    pub totals: HashMap<Seat, i32>,
    pub executed: Option<Seat>,
    /// 处决揭示：只公布是否恶方特殊角色，不公布具体角色
    pub revealed_bad_special: Option<bool>,
    /// 遗言资格：被禁言或属恶方特殊角色的不留遗言
    pub last_words_allowed: Option<bool>,
}

/// 发言顺序。昨夜恰好死一人时，从死者座位号往上最近的存活座位开场
/// （9 号回绕到 1 号）；死零人或多人时由调用方指定开场者，未指定则
/// 取座位号最小的可发言者。之后按座位号顺时针轮转，跳过死者与被禁言者。
pub fn speech_order(
    players: &[Player],
    last_night_deaths: &[Seat],
    chosen_opener: Option<Seat>,
) -> Vec<Seat> {
    let can_speak = |seat: Seat| {
        players
            .iter()
            .any(|p| p.seat == seat && p.alive && !p.muted_next_day)
    };

    let opener = match last_night_deaths {
        [dead] => next_living_seat(*dead, &can_speak),
        _ => chosen_opener
            .filter(|s| can_speak(*s))
            .or_else(|| (1..=SEAT_COUNT as Seat).find(|s| can_speak(*s))),
    };
    let Some(opener) = opener else {
        return Vec::new(); // 无人可发言
    };

    let mut order = Vec::new();
    let mut seat = opener;
    for _ in 0..SEAT_COUNT {
        if can_speak(seat) {
            order.push(seat);
        }
        seat = wrap_next(seat);
    }
    order
}

fn next_living_seat(after: Seat, can_speak: &impl Fn(Seat) -> bool) -> Option<Seat> {
    let mut seat = wrap_next(after);
    for _ in 0..SEAT_COUNT {
        if can_speak(seat) {
            return Some(seat);
        }
        seat = wrap_next(seat);
    }
    None
}

fn wrap_next(seat: Seat) -> Seat {
    if seat as usize >= SEAT_COUNT {
        1
    } else {
        seat + 1
    }
}

/// 合并计票：当日公开票 + 前夜存入的暗票余额，按目标座位求和。
/// 唯一最高票者立即处决；并列最高则无人被处决。只有存活座位可被处决。
/// 禁言者的公开票在提交口已被拒绝，不会出现在记录里。
pub fn tally(votes: &VoteRecord, players: &[Player]) -> TallyOutcome {
    let mut totals: HashMap<Seat, i32> = HashMap::new();

    for (_, target) in votes.public_votes.iter() {
        if *target != 0 {
            *totals.entry(*target).or_default() += 1;
        }
    }
    for p in players {
        if p.hidden_vote_balance > 0 {
            *totals.entry(p.seat).or_default() += p.hidden_vote_balance;
        }
    }

    // 死人不可被处决，票记在案但不参与判定
    let executable: Vec<(Seat, i32)> = totals
        .iter()
        .map(|(s, n)| (*s, *n))
        .filter(|(s, _)| players.iter().any(|p| p.seat == *s && p.alive))
        .collect();

    let max = executable.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let top: Vec<Seat> = executable
        .iter()
        .filter(|(_, n)| *n == max && max > 0)
        .map(|(s, _)| *s)
        .collect();

    let mut outcome = TallyOutcome {
        totals,
        ..Default::default()
    };
    if let [seat] = top[..] {
        let player = players.iter().find(|p| p.seat == seat).unwrap();
        outcome.executed = Some(seat);
        outcome.revealed_bad_special = Some(player.role.is_bad_special());
        outcome.last_words_allowed =
            Some(!player.muted_next_day && !player.role.is_bad_special());
        debug!("计票：{}号以{}票被处决", seat, max);
    } else if top.len() > 1 {
        debug!("计票：{}票并列，无人被处决", max);
    }
    outcome
}
