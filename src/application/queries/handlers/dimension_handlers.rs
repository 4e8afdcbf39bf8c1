//! Dimension Query Handlers
//!
//! 纯计算，无端口依赖

use crate::application::error::ApplicationError;
use crate::application::queries::PreviewDimensions;
use crate::domain::outline::{plan_chapters, validate_dimensions, ChapterPlan};
use crate::domain::weighting::{calculate_dimensions, StoryDimensions};

/// 预览中突出显示的维度数
const DOMINANT_COUNT: usize = 4;

/// 维度预览响应
#[derive(Debug, Clone)]
pub struct DimensionPreviewResponse {
    pub dimensions: StoryDimensions,
    pub total: f64,
    /// 权重最高的维度（名称，取值）
    pub dominant: Vec<(String, f64)>,
    pub chapter_count: u32,
    pub target_word_count: u32,
    pub chapters: Vec<ChapterPlan>,
}

/// PreviewDimensions Handler
#[derive(Debug, Default, Clone, Copy)]
pub struct PreviewDimensionsHandler;

impl PreviewDimensionsHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, query: PreviewDimensions) -> Result<DimensionPreviewResponse, ApplicationError> {
        let params = query.parameters;
        params.validate()?;

        let dimensions = calculate_dimensions(&params);
        let validation = validate_dimensions(&dimensions);
        if !validation.is_valid {
            return Err(ApplicationError::internal(validation.errors.join("; ")));
        }

        let chapters = plan_chapters(&params, &dimensions);

        Ok(DimensionPreviewResponse {
            total: dimensions.total(),
            dominant: dimensions
                .dominant(DOMINANT_COUNT)
                .into_iter()
                .map(|(d, v)| (d.as_str().to_string(), v))
                .collect(),
            chapter_count: chapters.len() as u32,
            target_word_count: params.novel_length.target_word_count(),
            chapters,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameters::NovelParameters;

    #[test]
    fn test_preview_is_consistent_with_plan() {
        let response = PreviewDimensionsHandler::new()
            .handle(PreviewDimensions {
                parameters: NovelParameters::sample(),
            })
            .unwrap();

        assert_eq!(response.chapter_count as usize, response.chapters.len());
        assert_eq!(response.dominant.len(), 4);
        assert!((response.total - response.dimensions.total()).abs() < 1e-9);
        assert!(response.chapters.iter().enumerate().all(|(i, c)| c.number == i as u32 + 1));
    }

    #[test]
    fn test_preview_rejects_invalid_parameters() {
        let mut params = NovelParameters::sample();
        params.characters.clear();
        let err = PreviewDimensionsHandler::new()
            .handle(PreviewDimensions { parameters: params })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
