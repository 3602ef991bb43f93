use huadie_server::engine::{speech_order, tally};
use huadie_server::models::{
    player::Player,
    role::{Role, Seat},
    vote::VoteRecord,
};

fn nine_civilians() -> Vec<Player> {
    (1..=9)
        .map(|seat| {
            let role = if seat == 5 { Role::Killer } else { Role::GoodCivilian };
            Player::new(seat as Seat, format!("玩家{}", seat), role)
        })
        .collect()
}

fn votes(round: u32, list: &[(Seat, Seat)]) -> VoteRecord {
    let mut record = VoteRecord::new(round);
    for (voter, target) in list {
        record.insert(*voter, *target);
    }
    record.seal();
    record
}

#[test]
fn single_death_opener_is_next_living_seat() {
    let mut players = nine_civilians();
    players.iter_mut().find(|p| p.seat == 3).unwrap().alive = false;

    let order = speech_order(&players, &[3], None);

    assert_eq!(order.first(), Some(&4));
    // 顺时针轮转且跳过死者
    assert_eq!(order, vec![4, 5, 6, 7, 8, 9, 1, 2]);
}

#[test]
fn opener_wraps_around_seat_nine() {
    let mut players = nine_civilians();
    players.iter_mut().find(|p| p.seat == 9).unwrap().alive = false;

    let order = speech_order(&players, &[9], None);

    assert_eq!(order.first(), Some(&1));
}

#[test]
fn muted_seats_are_skipped_in_speech_order() {
    let mut players = nine_civilians();
    players.iter_mut().find(|p| p.seat == 3).unwrap().alive = false;
    players.iter_mut().find(|p| p.seat == 4).unwrap().muted_next_day = true;

    let order = speech_order(&players, &[3], None);

    // 4号被禁言，从5号开场
    assert_eq!(order.first(), Some(&5));
    assert!(!order.contains(&4));
}

#[test]
fn caller_chooses_opener_when_deaths_are_not_exactly_one() {
    let players = nine_civilians();

    let order = speech_order(&players, &[], Some(7));
    assert_eq!(order.first(), Some(&7));

    // 未指定时退到座位号最小的可发言者
    let order = speech_order(&players, &[], None);
    assert_eq!(order.first(), Some(&1));
}

#[test]
fn unique_highest_total_is_executed() {
    let players = nine_civilians();
    let record = votes(1, &[(1, 5), (2, 5), (3, 5), (4, 0), (6, 2)]);

    let outcome = tally(&record, &players);

    assert_eq!(outcome.executed, Some(5));
    assert_eq!(outcome.totals.get(&5), Some(&3));
    assert_eq!(outcome.revealed_bad_special, Some(true));
}

#[test]
fn tied_totals_execute_nobody() {
    let players = nine_civilians();
    let record = votes(1, &[(1, 5), (2, 5), (3, 2), (4, 2)]);

    let outcome = tally(&record, &players);

    assert_eq!(outcome.executed, None);
    assert_eq!(outcome.revealed_bad_special, None);
}

#[test]
fn hidden_vote_balance_joins_the_tally() {
    let mut players = nine_civilians();
    // 前夜两张暗票记在2号名下
    players.iter_mut().find(|p| p.seat == 2).unwrap().hidden_vote_balance = 2;
    let record = votes(1, &[(1, 5), (3, 5), (4, 2)]);

    let outcome = tally(&record, &players);

    // 2号: 1公开 + 2暗 = 3，压过5号的2票
    assert_eq!(outcome.totals.get(&2), Some(&3));
    assert_eq!(outcome.executed, Some(2));
    assert_eq!(outcome.revealed_bad_special, Some(false));
}

#[test]
fn adding_a_vote_never_lowers_a_total() {
    let players = nine_civilians();
    let before = tally(&votes(1, &[(1, 5), (2, 5)]), &players);
    let after = tally(&votes(1, &[(1, 5), (2, 5), (3, 5)]), &players);

    assert!(after.totals.get(&5).unwrap() >= before.totals.get(&5).unwrap());
    assert_eq!(after.executed, Some(5));
}

#[test]
fn dead_seats_cannot_be_executed() {
    let mut players = nine_civilians();
    players.iter_mut().find(|p| p.seat == 5).unwrap().alive = false;
    let record = votes(1, &[(1, 5), (2, 5), (3, 2)]);

    let outcome = tally(&record, &players);

    // 死人票记在案但不参与处决判定，2号以1票成为唯一最高
    assert_eq!(outcome.executed, Some(2));
}

#[test]
fn muted_executee_forfeits_last_words() {
    let mut players = nine_civilians();
    players.iter_mut().find(|p| p.seat == 2).unwrap().muted_next_day = true;
    let record = votes(1, &[(1, 2), (3, 2)]);

    let outcome = tally(&record, &players);

    assert_eq!(outcome.executed, Some(2));
    assert_eq!(outcome.last_words_allowed, Some(false));
}
