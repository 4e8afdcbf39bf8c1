//! Parameters Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("滑块取值越界 (1-5): {0}")]
    SliderOutOfRange(u8),

    #[error("无效的标题: {0}")]
    InvalidTitle(String),

    #[error("无效的角色: {0}")]
    InvalidCharacter(String),

    #[error("至少需要一个角色")]
    NoCharacters,

    #[error("重复的冲突类型: {0}")]
    DuplicateConflict(String),
}
