//! Weighting Context - 叙事参数加权系统
//!
//! 职责:
//! - 故事维度定义与归一化
//! - 参数到维度的加权计算
//! - 按类型的维度乘数表

mod calculator;
mod dimensions;
mod genre;

pub use calculator::{calculate_dimensions, raw_dimensions, resolve_conflicts};
pub use dimensions::{
    clamp_dimension, normalize_dimensions, Dimension, StoryDimensions, MAX_DIMENSION_TOTAL,
    MAX_DIMENSION_VALUE,
};
pub use genre::{apply_genre_adjustments, genre_adjustments};
