//! LLM Engine Port - 文本生成与向量嵌入抽象
//!
//! 定义 LLM 调用的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Prompt;

/// LLM 错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 补全请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// 要求返回 JSON 对象
    pub json_mode: bool,
}

impl ChatRequest {
    /// 从 system/user 提示词构建
    pub fn from_prompt(prompt: &Prompt, temperature: f32) -> Self {
        Self {
            messages: vec![
                ChatMessage::system(prompt.system.clone()),
                ChatMessage::user(prompt.user.clone()),
            ],
            temperature,
            max_tokens: None,
            json_mode: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// 补全响应
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// 生成的文本
    pub content: String,
    /// 实际使用的模型
    pub model: String,
    /// 消耗的 token 数
    pub total_tokens: Option<u32>,
}

/// LLM Engine Port
///
/// 外部文本生成服务的抽象接口
#[async_trait]
pub trait LlmPort: Send + Sync {
    /// 执行对话补全
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// 计算文本的向量嵌入
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// 检查 LLM 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
