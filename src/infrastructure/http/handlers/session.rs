//! Generation Session Handlers
//!
//! 客户端轮询会话进度

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{GetGenerationSession, SessionResponse};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionStatusRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub kind: String,
    pub status: String,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub progress_percent: u32,
    pub attempts: u32,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SessionResponse> for SessionDto {
    fn from(s: SessionResponse) -> Self {
        Self {
            id: s.id,
            novel_id: s.novel_id,
            kind: s.kind,
            status: s.status,
            total_steps: s.total_steps,
            completed_steps: s.completed_steps,
            progress_percent: s.progress_percent,
            attempts: s.attempts,
            error_message: s.error_message,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn get_session_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionStatusRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    let session = state
        .get_session_handler
        .handle(GetGenerationSession { session_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(session.into())))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use crate::infrastructure::http::create_app;
    use crate::infrastructure::http::handlers::test_support::post_json;
    use crate::infrastructure::testing::TestContext;

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let ctx = TestContext::new().await;
        let app = create_app(ctx.app_state());

        let body = post_json(&app, "/api/session/status", json!({ "id": Uuid::new_v4() })).await;
        assert_eq!(body["errno"], 404);
    }
}
