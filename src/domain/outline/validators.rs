//! Outline Validators - 大纲结构校验
//!
//! 只判定结构是否完整，不做修复；校验失败时由调用方整体重试 LLM 调用。

use serde::Serialize;

use super::entities::NovelOutline;
use crate::domain::weighting::{StoryDimensions, MAX_DIMENSION_VALUE};

/// 校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// 校验大纲结构
pub fn validate_outline(outline: &NovelOutline) -> ValidationResult {
    let mut errors = Vec::new();

    if outline.title.trim().is_empty() {
        errors.push("outline title is missing".to_string());
    }
    if outline.description.trim().is_empty() {
        errors.push("outline description is missing".to_string());
    }
    if outline.chapters.is_empty() {
        errors.push("outline has no chapters".to_string());
    }

    for (index, chapter) in outline.chapters.iter().enumerate() {
        let label = format!("chapter {}", index + 1);

        if chapter.chapter_number != index as u32 + 1 {
            errors.push(format!(
                "{}: expected chapter number {}, found {}",
                label,
                index + 1,
                chapter.chapter_number
            ));
        }
        if chapter.chapter_name.trim().is_empty() {
            errors.push(format!("{}: name is missing", label));
        }
        if chapter.summary.trim().is_empty() {
            errors.push(format!("{}: summary is missing", label));
        }
        if chapter.scenes.is_empty() {
            errors.push(format!("{}: has no scenes", label));
        }
        if chapter.scenes.iter().any(|s| s.name.trim().is_empty()) {
            errors.push(format!("{}: scene without a name", label));
        }
        if chapter.key_plot_points.is_empty() {
            errors.push(format!("{}: has no key plot points", label));
        }
    }

    ValidationResult::from_errors(errors)
}

/// 仅返回是否通过
pub fn is_valid_outline(outline: &NovelOutline) -> bool {
    validate_outline(outline).is_valid
}

/// 校验维度取值范围
pub fn validate_dimensions(dimensions: &StoryDimensions) -> ValidationResult {
    let errors = dimensions
        .iter()
        .filter(|(_, value)| !(0.0..=MAX_DIMENSION_VALUE).contains(value))
        .map(|(dimension, value)| format!("{} out of range: {}", dimension, value))
        .collect();

    ValidationResult::from_errors(errors)
}
