//! Dimension Preview Handler

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::PreviewDimensions;
use crate::domain::outline::ChapterPlan;
use crate::domain::parameters::NovelParameters;
use crate::domain::weighting::StoryDimensions;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DominantDimensionDto {
    pub dimension: String,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct DimensionPreviewDto {
    pub dimensions: StoryDimensions,
    pub total: f64,
    pub dominant: Vec<DominantDimensionDto>,
    pub chapter_count: u32,
    pub target_word_count: u32,
    pub chapters: Vec<ChapterPlan>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 预览参数对应的故事维度与章节规划，不调用 LLM
pub async fn preview_dimensions(
    State(state): State<Arc<AppState>>,
    Json(parameters): Json<NovelParameters>,
) -> Result<Json<ApiResponse<DimensionPreviewDto>>, ApiError> {
    let result = state
        .preview_dimensions_handler
        .handle(PreviewDimensions { parameters })?;

    Ok(Json(ApiResponse::success(DimensionPreviewDto {
        dimensions: result.dimensions,
        total: result.total,
        dominant: result
            .dominant
            .into_iter()
            .map(|(dimension, weight)| DominantDimensionDto { dimension, weight })
            .collect(),
        chapter_count: result.chapter_count,
        target_word_count: result.target_word_count,
        chapters: result.chapters,
    })))
}

#[cfg(test)]
mod tests {
    use crate::domain::parameters::NovelParameters;
    use crate::infrastructure::http::create_app;
    use crate::infrastructure::http::handlers::test_support::post_json;
    use crate::infrastructure::testing::TestContext;

    #[tokio::test]
    async fn test_preview_dimensions() {
        let ctx = TestContext::new().await;
        let app = create_app(ctx.app_state());

        let params = serde_json::to_value(NovelParameters::sample()).unwrap();
        let body = post_json(&app, "/api/dimensions/preview", params).await;

        assert_eq!(body["errno"], 0);
        let data = &body["data"];
        assert_eq!(
            data["chapter_count"].as_u64().unwrap() as usize,
            data["chapters"].as_array().unwrap().len()
        );
        assert_eq!(data["dominant"].as_array().unwrap().len(), 4);
        // 预览不触发 LLM
        assert_eq!(ctx.fake_llm.completion_calls(), 0);
    }

    #[tokio::test]
    async fn test_preview_rejects_invalid_parameters() {
        let ctx = TestContext::new().await;
        let app = create_app(ctx.app_state());

        let mut params = NovelParameters::sample();
        params.characters.clear();
        let body = post_json(
            &app,
            "/api/dimensions/preview",
            serde_json::to_value(params).unwrap(),
        )
        .await;
        assert_eq!(body["errno"], 400);
        assert!(body["data"].is_null());
    }
}
