//! Outline Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("LLM 响应为空")]
    EmptyResponse,

    #[error("大纲 JSON 解析失败: {0}")]
    InvalidJson(String),

    #[error("大纲结构不完整: {}", .0.join("; "))]
    Incomplete(Vec<String>),
}
