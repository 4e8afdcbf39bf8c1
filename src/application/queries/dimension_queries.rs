//! Dimension Queries

use crate::domain::parameters::NovelParameters;

/// 预览维度与章节规划（不调用 LLM、不落库）
#[derive(Debug, Clone)]
pub struct PreviewDimensions {
    pub parameters: NovelParameters,
}
