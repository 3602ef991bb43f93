use axum::Router;

use crate::routes;
use crate::state::AppState;

/// 组装完整的对局服务：REST 接口加 WebSocket 通道，
/// 共享状态在这里新建（房间、对局、广播通道、调试配置）。
pub fn create_app() -> Router {
    routes::create_routes(AppState::new())
}
