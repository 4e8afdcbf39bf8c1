//! Ping Handler
//!
//! 健康检查，附带 LLM 服务可用性

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_available: bool,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let llm_available = state.llm.health_check().await;
    if !llm_available {
        tracing::warn!("LLM service health check failed");
    }

    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm_available,
    })
}

#[cfg(test)]
mod tests {
    use crate::infrastructure::http::create_app;
    use crate::infrastructure::http::handlers::test_support::get_json;
    use crate::infrastructure::testing::TestContext;

    #[tokio::test]
    async fn test_ping() {
        let ctx = TestContext::new().await;
        let app = create_app(ctx.app_state());

        let body = get_json(&app, "/api/ping").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm_available"], true);
    }
}
