//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                       GET   健康检查（含 LLM 可用性）
//! - /api/dimensions/preview         POST  预览故事维度与章节规划
//! - /api/novel/outline/generate     POST  根据参数生成大纲（同步等待 LLM）
//! - /api/novel/outline/refine       POST  按指令精修大纲
//! - /api/novel/chapters/generate    POST  提交章节写作任务
//! - /api/novel/chapters             POST  获取已写章节
//! - /api/novel/get                  POST  获取小说详情
//! - /api/novel/list                 GET   列出所有小说
//! - /api/novel/delete               POST  删除小说（取消进行中的任务）
//! - /api/session/status             POST  查询生成会话进度
//! - /api/reference/ingest           POST  导入参考片段

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/dimensions/preview", post(handlers::preview_dimensions))
        .nest("/novel", novel_routes())
        .route("/session/status", post(handlers::get_session_status))
        .route("/reference/ingest", post(handlers::ingest_reference))
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/outline/generate", post(handlers::generate_outline))
        .route("/outline/refine", post(handlers::refine_outline))
        .route("/chapters/generate", post(handlers::generate_chapters))
        .route("/chapters", post(handlers::get_chapters))
        .route("/get", post(handlers::get_novel))
        .route("/list", get(handlers::list_novels))
        .route("/delete", post(handlers::delete_novel))
}
