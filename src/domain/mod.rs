//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Parameters Context: 设置向导提交的小说参数
//! - Weighting Context: 参数到故事维度的加权计算
//! - Outline Context: 章节规划、大纲整形与校验

pub mod outline;
pub mod parameters;
pub mod weighting;

// 共享的提示词构建
mod prompt;

pub use prompt::{chapter_prompt, outline_prompt, refine_prompt, Prompt};
