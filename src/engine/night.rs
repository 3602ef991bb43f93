use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::action::NightActionSet;
use crate::models::log::{DeathCause, KillSource, NightEffect, ResolutionLog};
use crate::models::player::Player;
use crate::models::role::{NightAbility, Role, Seat};

use super::EngineError;

/// 查验结果。只发给查验者本人，不进公开日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamResult {
    BadSpecial,    // 杀手 / 魔法师 / 森林老人
    NotBadSpecial, // 其余存活角色
    Unexaminable,  // 已死亡、目标非法、或被庇护挡下
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamNotice {
    pub examiner: Seat,
    pub target: Seat,
    pub result: ExamResult,
}

/// 杀手之位继承通知。经私信通道送达，尽力而为。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionNotice {
    pub seat: Seat,
    pub previous_role: Role,
}

/// 一夜结算的产出：死亡名单、私密查验结果、继承通知。
/// 公开效果都已写入结算日志。
#[derive(Debug, Clone, Default)]
pub struct NightOutcome {
    pub deaths: Vec<Seat>,
    pub exams: Vec<ExamNotice>,
    pub promotions: Vec<PromotionNotice>,
}

/// 夜间结算。固定步骤顺序：施法 → 庇护 → 刀 → 打针 → 查验 → 禁言 →
/// 暗票 → 继承。目标合法性以入夜快照为准，效果按步骤顺序叠加，
/// 后面的步骤能看到前面步骤造成的变化。全程无随机。
///
/// 行动在入夜时即已做出，行动者当夜身死不追溯取消其行动；
/// 但被施法会使行动作废。
pub fn resolve_night(
    actions: &NightActionSet,
    players: &mut [Player],
    log: &mut ResolutionLog,
) -> Result<NightOutcome, EngineError> {
    check_role_invariant(players)?;

    let round = actions.round;
    let mut outcome = NightOutcome::default();

    // 入夜快照：座位号升序，保证各步骤遍历顺序确定
    let mut dusk_roles: Vec<(Seat, Role)> = players
        .iter()
        .filter(|p| p.alive)
        .map(|p| (p.seat, p.role))
        .collect();
    dusk_roles.sort_unstable_by_key(|(seat, _)| *seat);

    let alive_at_dusk = |seat: Seat| dusk_roles.iter().any(|(s, _)| *s == seat);
    // 入夜时存活的该角色座位（当夜死亡不影响已做出的行动）
    let seat_of =
        |role: Role| -> Option<Seat> { dusk_roles.iter().find(|(_, r)| *r == role).map(|(s, _)| *s) };
    // 该角色提交的 (行动者, 合法目标)
    let submitted_target = |role: Role| -> Option<(Seat, Seat)> {
        let actor = seat_of(role)?;
        let target = actions.action_of(actor)?.target?;
        alive_at_dusk(target).then_some((actor, target))
    };

    let butterfly_seat = seat_of(Role::FlowerButterfly);
    // 花蝴蝶今晚想庇护谁（自庇护视为放弃，不参与「庇护压法术」判定）
    let shelter_intent = submitted_target(Role::FlowerButterfly)
        .map(|(_, t)| t)
        .filter(|t| Some(*t) != butterfly_seat);

    // 1. 魔法师施法
    if let Some((mage, target)) = submitted_target(Role::Mage) {
        if shelter_intent == Some(target) {
            // 施法目标恰好被庇护：庇护压过法术，施法落空
            log.append(round, NightEffect::NegationToppedByShelter { target });
        } else {
            player_mut(players, target).was_negated = true;
            log.append(round, NightEffect::Negated { target });
            debug!("第{}夜: {}号对{}号施法", round, mage, target);
        }
    }

    // 2. 花蝴蝶庇护。庇护生效期间，指向花蝴蝶本人的效果转嫁到庇护对象。
    let mut shelter: Option<(Seat, Seat)> = None; // (花蝴蝶, 庇护对象)
    if let Some((butterfly, target)) = submitted_target(Role::FlowerButterfly) {
        if player_ref(players, butterfly).was_negated {
            log.append(round, NightEffect::ShelterNegated { butterfly });
        } else if target == butterfly {
            log.append(round, NightEffect::ShelterForfeited { butterfly });
        } else {
            player_mut(players, target).sheltered = true;
            shelter = Some((butterfly, target));
            log.append(round, NightEffect::Sheltered { target });
        }
    }

    // 指向花蝴蝶的定向效果改落在庇护对象身上；转嫁后的效果无视庇护免疫
    let redirect = move |target: Seat| -> (Seat, Option<Seat>) {
        match shelter {
            Some((butterfly, protected)) if target == butterfly => (protected, Some(butterfly)),
            _ => (target, None),
        }
    };

    // 3. 刀：杀手与狙击手各自独立结算
    let mut hits: HashMap<Seat, Vec<KillSource>> = HashMap::new();
    for (role, source) in [(Role::Killer, KillSource::Killer), (Role::Sniper, KillSource::Sniper)] {
        let Some((actor, target)) = submitted_target(role) else {
            continue;
        };
        if player_ref(players, actor).was_negated {
            continue; // 行动者被施法，刀作废（Negated 条目已记录）
        }
        let (landed_on, redirected_from) = redirect(target);
        if redirected_from.is_none() && player_ref(players, landed_on).sheltered {
            log.append(round, NightEffect::KillBlocked { source, target });
            continue;
        }
        hits.entry(landed_on).or_default().push(source);
        log.append(
            round,
            NightEffect::KillLanded { source, target: landed_on, redirected_from },
        );
    }

    // 4. 医生打针。针只能挡住单独一刀；两刀齐下救不回来。
    let mut overdosed_doctor: Option<Seat> = None;
    if let Some((doctor, target)) = submitted_target(Role::Doctor) {
        if !player_ref(players, doctor).was_negated {
            let (needle_on, _) = redirect(target);
            match hits.get(&needle_on).map_or(0, Vec::len) {
                1 => {
                    hits.remove(&needle_on);
                    log.append(round, NightEffect::KillCancelled { target: needle_on });
                }
                0 => {
                    // 空针
                    let count = {
                        let doc = player_mut(players, doctor);
                        doc.pending_needle_count += 1;
                        doc.pending_needle_count
                    };
                    log.append(round, NightEffect::NeedleWasted { doctor, count });
                    if count >= 2 {
                        // 第二次空针：计数归零，医生天亮时死亡
                        player_mut(players, doctor).pending_needle_count = 0;
                        overdosed_doctor = Some(doctor);
                        log.append(round, NightEffect::NeedleOverdose { doctor });
                    }
                }
                _ => {} // 两刀齐下，针无效，目标照死
            }
        }
    }

    // 落刀。同一人被两刀命中只死一次，冗余单独记档供死因叙述。
    let mut landed: Vec<(Seat, Vec<KillSource>)> = hits.into_iter().collect();
    landed.sort_by_key(|(seat, _)| *seat);
    for (seat, sources) in landed {
        if sources.len() > 1 {
            log.append(round, NightEffect::RedundantKill { target: seat });
        }
        player_mut(players, seat).alive = false;
        log.append(round, NightEffect::Death { seat, cause: DeathCause::Killed(sources) });
    }

    // 5. 警察查验。结果只给查验者，公开日志不留痕。
    //    查验看的是此刻的状态：本夜刚死的目标已属「不可查验」。
    if let Some((police, target)) = submitted_target(Role::Police) {
        if !player_ref(players, police).was_negated {
            let (examined, redirected_from) = redirect(target);
            let examined_player = player_ref(players, examined);
            let result = if redirected_from.is_none() && examined_player.sheltered {
                ExamResult::Unexaminable
            } else if !examined_player.alive {
                ExamResult::Unexaminable
            } else if examined_player.role.is_bad_special() {
                ExamResult::BadSpecial
            } else {
                ExamResult::NotBadSpecial
            };
            outcome.exams.push(ExamNotice { examiner: police, target: examined, result });
        }
    }

    // 6. 森林老人禁言
    if let Some((elder, target)) = submitted_target(Role::ForestElder) {
        if !player_ref(players, elder).was_negated {
            let (silenced, redirected_from) = redirect(target);
            if redirected_from.is_none() && player_ref(players, silenced).sheltered {
                log.append(round, NightEffect::SilenceBlocked { target });
            } else {
                player_mut(players, silenced).muted_next_day = true;
                log.append(round, NightEffect::Silenced { target: silenced });
            }
        }
    }

    // 7. 平民暗票。票在入夜时已经投出，当夜身死不影响入账；
    //    但同夜被禁言的暗票作废。
    let civilian_seats: Vec<Seat> = dusk_roles
        .iter()
        .filter(|(_, role)| role.night_ability() == NightAbility::HiddenVote)
        .map(|(seat, _)| *seat)
        .collect();
    for voter in civilian_seats {
        let p = player_ref(players, voter);
        if p.was_negated {
            continue;
        }
        if p.muted_next_day {
            log.append(round, NightEffect::HiddenVoteForeclosed { voter });
            continue;
        }
        if let Some(target) = actions
            .action_of(voter)
            .and_then(|a| a.target)
            .filter(|t| alive_at_dusk(*t))
        {
            player_mut(players, target).hidden_vote_balance += 1;
            log.append(round, NightEffect::HiddenVoteBanked { voter, target });
        }
    }

    // 空针第二次：天亮医生死亡，按普通死亡走继承与胜负判定。
    // 同夜已被刀的医生只死一次，死因记刀。
    if let Some(doctor) = overdosed_doctor {
        let doc = player_mut(players, doctor);
        if doc.alive {
            doc.alive = false;
            log.append(
                round,
                NightEffect::Death { seat: doctor, cause: DeathCause::NeedleOverdose },
            );
        }
    }

    // 8. 继承
    if let Some(promotion) = check_succession(round, players, log) {
        outcome.promotions.push(promotion);
    }

    outcome.deaths = log.deaths_in_round(round);
    Ok(outcome)
}

/// 杀手死后的继位：魔法师优先，其次森林老人。继位者改任杀手，
/// 原能力随角色一并失去（能力按角色查表）。
pub fn check_succession(
    round: u32,
    players: &mut [Player],
    log: &mut ResolutionLog,
) -> Option<PromotionNotice> {
    if players.iter().any(|p| p.alive && p.role == Role::Killer) {
        return None;
    }
    let mut heir = Role::Killer.successor();
    while let Some(role) = heir {
        if let Some(idx) = players.iter().position(|p| p.alive && p.role == role) {
            let seat = players[idx].seat;
            let previous_role = players[idx].role;
            players[idx].role = Role::Killer;
            log.append(round, NightEffect::Succession { seat, previous_role });
            debug!("第{}轮: {}号由{}继任杀手", round, seat, previous_role);
            return Some(PromotionNotice { seat, previous_role });
        }
        heir = role.successor();
    }
    None
}

/// 同一时刻每个唯一角色至多一名存活。违反即属致命错误。
pub fn check_role_invariant(players: &[Player]) -> Result<(), EngineError> {
    let mut counts: HashMap<Role, usize> = HashMap::new();
    for p in players.iter().filter(|p| p.alive) {
        *counts.entry(p.role).or_default() += 1;
    }
    for (role, count) in counts {
        if role.is_unique() && count > 1 {
            return Err(EngineError::InvariantViolation(format!(
                "{}名存活玩家同时持有唯一角色{}",
                count, role
            )));
        }
    }
    Ok(())
}

fn player_ref(players: &[Player], seat: Seat) -> &Player {
    players.iter().find(|p| p.seat == seat).unwrap()
}

fn player_mut(players: &mut [Player], seat: Seat) -> &mut Player {
    players.iter_mut().find(|p| p.seat == seat).unwrap()
}
