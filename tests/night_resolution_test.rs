use huadie_server::engine::{check_role_invariant, resolve_night, ExamResult};
use huadie_server::models::{
    action::{NightAction, NightActionSet},
    log::{DeathCause, KillSource, NightEffect, ResolutionLog},
    player::Player,
    role::{Role, Seat},
};

/// 固定发牌：1花蝴蝶 2狙击手 3医生 4警察 5杀手 6魔法师 7森林老人 8善民 9恶民
fn standard_players() -> Vec<Player> {
    let roles = [
        Role::FlowerButterfly,
        Role::Sniper,
        Role::Doctor,
        Role::Police,
        Role::Killer,
        Role::Mage,
        Role::ForestElder,
        Role::GoodCivilian,
        Role::BadCivilian,
    ];
    roles
        .iter()
        .enumerate()
        .map(|(i, role)| Player::new(i as Seat + 1, format!("玩家{}", i + 1), *role))
        .collect()
}

fn sealed_actions(round: u32, players: &[Player], list: &[(Seat, Option<Seat>)]) -> NightActionSet {
    let mut set = NightActionSet::new(round);
    for (seat, target) in list {
        let role = players.iter().find(|p| p.seat == *seat).unwrap().role;
        set.insert(NightAction {
            seat: *seat,
            ability: role.night_ability(),
            target: *target,
        });
    }
    set.seal();
    set
}

fn player<'a>(players: &'a [Player], seat: Seat) -> &'a Player {
    players.iter().find(|p| p.seat == seat).unwrap()
}

#[test]
fn empty_action_set_leaves_snapshot_unchanged() {
    let mut players = standard_players();
    let before = players.clone();
    let mut log = ResolutionLog::default();
    let actions = sealed_actions(1, &players, &[]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(outcome.deaths.is_empty());
    assert!(outcome.exams.is_empty());
    assert!(outcome.promotions.is_empty());
    for (a, b) in players.iter().zip(before.iter()) {
        assert_eq!(a.alive, b.alive);
        assert_eq!(a.role, b.role);
        assert_eq!(a.muted_next_day, b.muted_next_day);
        assert_eq!(a.pending_needle_count, b.pending_needle_count);
        assert_eq!(a.hidden_vote_balance, b.hidden_vote_balance);
    }
}

#[test]
fn mage_negating_butterfly_voids_shelter() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 魔法师对花蝴蝶施法，花蝴蝶想庇护8号
    let actions = sealed_actions(1, &players, &[(6, Some(1)), (1, Some(8))]);

    resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(!player(&players, 8).sheltered);
    assert!(player(&players, 1).was_negated);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::ShelterNegated { butterfly: 1 }));
}

#[test]
fn shelter_tops_negation_when_targets_coincide() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 魔法师和花蝴蝶都选了8号：庇护压过法术
    let actions = sealed_actions(1, &players, &[(6, Some(8)), (1, Some(8))]);

    resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(player(&players, 8).sheltered);
    assert!(!player(&players, 8).was_negated);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::NegationToppedByShelter { target: 8 }));
}

#[test]
fn sheltered_target_is_immune_to_kill() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    let actions = sealed_actions(1, &players, &[(1, Some(8)), (5, Some(8))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(player(&players, 8).alive);
    assert!(outcome.deaths.is_empty());
    assert!(log.entries.iter().any(|e| e.effect
        == NightEffect::KillBlocked {
            source: KillSource::Killer,
            target: 8
        }));
}

#[test]
fn kill_on_butterfly_redirects_to_sheltered_target() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 花蝴蝶庇护8号，杀手刀花蝴蝶：8号替死
    let actions = sealed_actions(1, &players, &[(1, Some(8)), (5, Some(1))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(player(&players, 1).alive);
    assert!(!player(&players, 8).alive);
    assert_eq!(outcome.deaths, vec![8]);
    assert!(log.entries.iter().any(|e| e.effect
        == NightEffect::KillLanded {
            source: KillSource::Killer,
            target: 8,
            redirected_from: Some(1)
        }));
}

#[test]
fn self_shelter_is_a_forfeit() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    let actions = sealed_actions(1, &players, &[(1, Some(1)), (5, Some(1))]);

    resolve_night(&actions, &mut players, &mut log).unwrap();

    // 自庇护放弃保护，刀照常落下
    assert!(!player(&players, 1).alive);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::ShelterForfeited { butterfly: 1 }));
}

#[test]
fn doctor_cancels_a_single_hit_without_needle_cost() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 杀手刀8号，医生针8号，狙击手没动：8号活，无空针
    let actions = sealed_actions(1, &players, &[(5, Some(8)), (3, Some(8))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(player(&players, 8).alive);
    assert_eq!(player(&players, 3).pending_needle_count, 0);
    assert!(outcome.deaths.is_empty());
    let cancelled = log
        .entries
        .iter()
        .filter(|e| e.effect == NightEffect::KillCancelled { target: 8 })
        .count();
    assert_eq!(cancelled, 1);
}

#[test]
fn double_hit_defeats_doctor_protection() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 杀手与狙击手都刀8号，医生针8号：针无效，8号死，冗余记档
    let actions = sealed_actions(1, &players, &[(5, Some(8)), (2, Some(8)), (3, Some(8))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(!player(&players, 8).alive);
    assert_eq!(outcome.deaths, vec![8]);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::RedundantKill { target: 8 }));
    let death = log
        .entries
        .iter()
        .find_map(|e| match &e.effect {
            NightEffect::Death { seat: 8, cause } => Some(cause.clone()),
            _ => None,
        })
        .unwrap();
    assert!(matches!(death, DeathCause::Killed(sources) if sources.len() == 2));
}

#[test]
fn two_wasted_needles_kill_the_doctor() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();

    // 第一夜：8号没被刀，空针一次
    let actions = sealed_actions(1, &players, &[(3, Some(8))]);
    resolve_night(&actions, &mut players, &mut log).unwrap();
    assert!(player(&players, 3).alive);
    assert_eq!(player(&players, 3).pending_needle_count, 1);

    // 第二夜：又一次空针，医生天亮死亡，计数归零
    for p in players.iter_mut() {
        p.clear_night_flags();
    }
    let actions = sealed_actions(2, &players, &[(3, Some(8))]);
    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(!player(&players, 3).alive);
    assert_eq!(player(&players, 3).pending_needle_count, 0);
    assert_eq!(outcome.deaths, vec![3]);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::Death { seat: 3, cause: DeathCause::NeedleOverdose }));
}

#[test]
fn doctor_knifed_on_his_second_wasted_needle_dies_only_once() {
    let mut players = standard_players();
    players.iter_mut().find(|p| p.seat == 3).unwrap().pending_needle_count = 1;
    let mut log = ResolutionLog::default();
    // 杀手刀医生，医生同夜第二次空针：只死一次，死因记刀
    let actions = sealed_actions(1, &players, &[(5, Some(3)), (3, Some(8))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(!player(&players, 3).alive);
    assert_eq!(outcome.deaths, vec![3]);
    let death_entries = log
        .entries
        .iter()
        .filter(|e| matches!(e.effect, NightEffect::Death { seat: 3, .. }))
        .count();
    assert_eq!(death_entries, 1);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect
            == NightEffect::Death { seat: 3, cause: DeathCause::Killed(vec![KillSource::Killer]) }));
}

#[test]
fn police_exam_distinguishes_bad_specials_only() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    let actions = sealed_actions(1, &players, &[(4, Some(6))]);
    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();
    assert_eq!(outcome.exams.len(), 1);
    assert_eq!(outcome.exams[0].examiner, 4);
    assert_eq!(outcome.exams[0].result, ExamResult::BadSpecial);

    // 恶民不属于恶方特殊角色
    let mut players = standard_players();
    let actions = sealed_actions(1, &players, &[(4, Some(9))]);
    let outcome = resolve_night(&actions, &mut players, &mut ResolutionLog::default()).unwrap();
    assert_eq!(outcome.exams[0].result, ExamResult::NotBadSpecial);
}

#[test]
fn exam_of_sheltered_or_dead_target_is_unexaminable() {
    // 被庇护的目标查不动
    let mut players = standard_players();
    let actions = sealed_actions(1, &players, &[(1, Some(6)), (4, Some(6))]);
    let outcome = resolve_night(&actions, &mut players, &mut ResolutionLog::default()).unwrap();
    assert_eq!(outcome.exams[0].result, ExamResult::Unexaminable);

    // 当夜刚死的目标同样查不动（查验看的是落刀之后的状态）
    let mut players = standard_players();
    let actions = sealed_actions(1, &players, &[(5, Some(8)), (4, Some(8))]);
    let outcome = resolve_night(&actions, &mut players, &mut ResolutionLog::default()).unwrap();
    assert_eq!(outcome.exams[0].result, ExamResult::Unexaminable);
}

#[test]
fn silence_mutes_and_forecloses_hidden_vote() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 森林老人禁言9号恶民；9号的暗票作废，8号善民的暗票正常入账
    let actions = sealed_actions(1, &players, &[(7, Some(9)), (9, Some(4)), (8, Some(4))]);

    resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(player(&players, 9).muted_next_day);
    assert_eq!(player(&players, 4).hidden_vote_balance, 1);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::HiddenVoteForeclosed { voter: 9 }));
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::HiddenVoteBanked { voter: 8, target: 4 }));
}

#[test]
fn civilian_killed_same_night_still_banks_hidden_vote() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 票在入夜时已投出，8号当夜被刀不影响入账
    let actions = sealed_actions(1, &players, &[(5, Some(8)), (8, Some(5))]);

    resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(!player(&players, 8).alive);
    assert_eq!(player(&players, 5).hidden_vote_balance, 1);
}

#[test]
fn negated_actor_loses_their_action() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 魔法师对杀手施法，杀手的刀作废
    let actions = sealed_actions(1, &players, &[(6, Some(5)), (5, Some(8))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(player(&players, 8).alive);
    assert!(outcome.deaths.is_empty());
    assert!(!log
        .entries
        .iter()
        .any(|e| matches!(e.effect, NightEffect::KillLanded { .. })));
}

#[test]
fn killer_death_at_night_promotes_the_mage() {
    let mut players = standard_players();
    let mut log = ResolutionLog::default();
    // 狙击手刀杀手：魔法师当场继任
    let actions = sealed_actions(1, &players, &[(2, Some(5))]);

    let outcome = resolve_night(&actions, &mut players, &mut log).unwrap();

    assert!(!player(&players, 5).alive);
    assert_eq!(player(&players, 6).role, Role::Killer);
    assert_eq!(outcome.promotions.len(), 1);
    assert_eq!(outcome.promotions[0].seat, 6);
    assert_eq!(outcome.promotions[0].previous_role, Role::Mage);
    assert!(log
        .entries
        .iter()
        .any(|e| e.effect == NightEffect::Succession { seat: 6, previous_role: Role::Mage }));
}

#[test]
fn forest_elder_inherits_when_mage_is_already_dead() {
    let mut players = standard_players();
    players.iter_mut().find(|p| p.seat == 6).unwrap().alive = false;
    let mut log = ResolutionLog::default();
    let actions = sealed_actions(1, &players, &[(2, Some(5))]);

    resolve_night(&actions, &mut players, &mut log).unwrap();

    assert_eq!(player(&players, 7).role, Role::Killer);
}

#[test]
fn duplicate_living_unique_role_is_fatal() {
    let mut players = standard_players();
    players.iter_mut().find(|p| p.seat == 9).unwrap().role = Role::Killer;
    assert!(check_role_invariant(&players).is_err());

    let mut log = ResolutionLog::default();
    let actions = sealed_actions(1, &players, &[]);
    assert!(resolve_night(&actions, &mut players, &mut log).is_err());
}
