use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// 测试共用的环境初始化：固定发牌、关掉角色遮罩，保证断言可预测。
pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        std::env::set_var("DEBUG_RANDOM_ROLE", "false");
        std::env::set_var("DEBUG_SHOW_PLAYER_ROLES", "true");
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
