use crate::models::player::Player;
use crate::models::role::Alignment;

use crate::models::game::MatchOutcome;

/// 胜负判定。存活者角色的纯函数，每次夜间结算后与每次处决后各判一次。
/// 胜利条件先于平局条件判定；双方特殊角色同归于尽、只剩平民时为平局。
pub fn evaluate(players: &[Player]) -> MatchOutcome {
    let alive: Vec<&Player> = players.iter().filter(|p| p.alive).collect();

    // 全员死亡：同归于尽
    if alive.is_empty() {
        return MatchOutcome::Draw;
    }

    let good_alive = alive.iter().any(|p| p.role.alignment() == Alignment::Good);
    let bad_special_alive = alive.iter().any(|p| p.role.is_bad_special());
    let good_special_alive = alive
        .iter()
        .any(|p| p.role.alignment() == Alignment::Good && p.role.is_unique());

    if !good_alive {
        return MatchOutcome::BadWin;
    }
    if !bad_special_alive {
        // 恶方特殊角色清空：善方还有特殊角色则善方胜，
        // 双方都只剩平民则无人能再推进局势，平局
        return if good_special_alive {
            MatchOutcome::GoodWin
        } else {
            MatchOutcome::Draw
        };
    }
    MatchOutcome::Ongoing
}
