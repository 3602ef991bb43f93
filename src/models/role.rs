use std::fmt;

use serde::{Deserialize, Serialize};

/// 座位号（1..=9）
pub type Seat = u8;

pub const SEAT_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Good, // 善阵营
    Bad,  // 恶阵营
}

/// 夜间行动类型。角色与能力的对应关系是固定查表，不走动态分发。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NightAbility {
    None,
    Negate,     // 魔法师：使目标当夜行动无效
    Shelter,    // 花蝴蝶：庇护
    Kill,       // 杀手 / 狙击手
    Protect,    // 医生：打针
    Examine,    // 警察：查验
    Silence,    // 森林老人：禁言
    HiddenVote, // 平民：暗票
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    FlowerButterfly, // 花蝴蝶
    Sniper,          // 狙击手
    Doctor,          // 医生
    Police,          // 警察
    GoodCivilian,    // 善民
    Killer,          // 杀手
    Mage,            // 魔法师
    ForestElder,     // 森林老人
    BadCivilian,     // 恶民
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::FlowerButterfly => write!(f, "花蝴蝶"),
            Role::Sniper => write!(f, "狙击手"),
            Role::Doctor => write!(f, "医生"),
            Role::Police => write!(f, "警察"),
            Role::GoodCivilian => write!(f, "善民"),
            Role::Killer => write!(f, "杀手"),
            Role::Mage => write!(f, "魔法师"),
            Role::ForestElder => write!(f, "森林老人"),
            Role::BadCivilian => write!(f, "恶民"),
        }
    }
}

impl Role {
    pub fn alignment(&self) -> Alignment {
        match self {
            Role::FlowerButterfly
            | Role::Sniper
            | Role::Doctor
            | Role::Police
            | Role::GoodCivilian => Alignment::Good,
            Role::Killer | Role::Mage | Role::ForestElder | Role::BadCivilian => Alignment::Bad,
        }
    }

    pub fn night_ability(&self) -> NightAbility {
        match self {
            Role::FlowerButterfly => NightAbility::Shelter,
            Role::Sniper | Role::Killer => NightAbility::Kill,
            Role::Doctor => NightAbility::Protect,
            Role::Police => NightAbility::Examine,
            Role::Mage => NightAbility::Negate,
            Role::ForestElder => NightAbility::Silence,
            Role::GoodCivilian | Role::BadCivilian => NightAbility::HiddenVote,
        }
    }

    /// 恶方特殊角色（杀手・魔法师・森林老人）。查验与处决揭示都只区分到这一层。
    pub fn is_bad_special(&self) -> bool {
        matches!(self, Role::Killer | Role::Mage | Role::ForestElder)
    }

    /// 平民角色可以同时存在多名，其余角色同一时刻至多一名存活。
    pub fn is_unique(&self) -> bool {
        !matches!(self, Role::GoodCivilian | Role::BadCivilian)
    }

    /// 杀手继承链：杀手死后由魔法师接任，魔法师也死了则由森林老人接任。
    /// 返回「谁继承杀手之位」，链外角色没有继承人。
    pub fn successor(&self) -> Option<Role> {
        match self {
            Role::Killer => Some(Role::Mage),
            Role::Mage => Some(Role::ForestElder),
            _ => None,
        }
    }
}

/// 一局的角色配比。固定九人局，但具体配比是配置而不是引擎硬编码。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMix {
    pub good_civilians: usize,
    pub bad_civilians: usize,
}

impl Default for RoleMix {
    fn default() -> Self {
        // 标准九人局：善方 4 特殊 + 1 善民，恶方 3 特殊 + 1 恶民
        RoleMix {
            good_civilians: 1,
            bad_civilians: 1,
        }
    }
}

/// 本局使用的九个角色（未洗牌）。
pub fn canonical_roles(mix: &RoleMix) -> Vec<Role> {
    let mut roles = vec![
        Role::FlowerButterfly,
        Role::Sniper,
        Role::Doctor,
        Role::Police,
        Role::Killer,
        Role::Mage,
        Role::ForestElder,
    ];
    roles.extend(std::iter::repeat(Role::GoodCivilian).take(mix.good_civilians));
    roles.extend(std::iter::repeat(Role::BadCivilian).take(mix.bad_civilians));
    roles
}
