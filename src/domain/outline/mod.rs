//! Outline Context - 大纲限界上下文
//!
//! 职责:
//! - 大纲/章节/场景实体
//! - 章节数与节奏曲线计算，大纲后处理
//! - LLM 输出解析与结构校验

mod entities;
mod errors;
mod parser;
mod shaper;
mod validators;

pub use entities::{CharacterArc, NovelChapter, NovelOutline, PacingGuidance, PlotPhase, Scene};
pub use errors::OutlineError;
pub use parser::parse_outline;
pub use shaper::{
    apply_dimensional_guidance, calculate_chapter_count, chapter_count_for, describe_pacing,
    guidance_notes, plan_chapters, plan_for_count, ChapterPlan, GuidanceReport,
    MIN_CHAPTER_WORDS,
};
pub use validators::{is_valid_outline, validate_dimensions, validate_outline, ValidationResult};
