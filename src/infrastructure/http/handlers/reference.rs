//! Reference Chunk Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::IngestReferenceChunk;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestReferenceRequest {
    #[serde(default)]
    pub source: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct IngestReferenceDto {
    pub id: Uuid,
    pub embedding_dimensions: usize,
}

/// 导入参考片段，供大纲生成时检索
pub async fn ingest_reference(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestReferenceRequest>,
) -> Result<Json<ApiResponse<IngestReferenceDto>>, ApiError> {
    let result = state
        .ingest_reference_handler
        .handle(IngestReferenceChunk {
            source: req.source,
            content: req.content,
        })
        .await?;

    Ok(Json(ApiResponse::success(IngestReferenceDto {
        id: result.id,
        embedding_dimensions: result.embedding_dimensions,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::infrastructure::http::create_app;
    use crate::infrastructure::http::handlers::test_support::post_json;
    use crate::infrastructure::testing::TestContext;

    #[tokio::test]
    async fn test_ingest_reference() {
        let ctx = TestContext::new().await;
        let app = create_app(ctx.app_state());

        let body = post_json(
            &app,
            "/api/reference/ingest",
            json!({ "source": "notes", "content": "Salt wind over the quay." }),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert!(body["data"]["embedding_dimensions"].as_u64().unwrap() > 0);
        assert_eq!(ctx.reference_repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_unavailable() {
        let ctx = TestContext::new().await;
        ctx.fake_llm.fail_embeddings(true);
        let app = create_app(ctx.app_state());

        let body = post_json(
            &app,
            "/api/reference/ingest",
            json!({ "content": "Salt wind over the quay." }),
        )
        .await;
        assert_eq!(body["errno"], 503);
    }
}
