pub mod day;
pub mod night;
pub mod win;

pub use day::{speech_order, tally, TallyOutcome};
pub use night::{
    check_role_invariant, check_succession, resolve_night, ExamNotice, ExamResult, NightOutcome,
    PromotionNotice,
};
pub use win::evaluate;

/// 结算期不可恢复的错误。出现即说明角色模型或继承逻辑已损坏，
/// 整局作废并标记待查，不做静默修补。
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("角色不变量被破坏: {0}")]
    InvariantViolation(String),
}
