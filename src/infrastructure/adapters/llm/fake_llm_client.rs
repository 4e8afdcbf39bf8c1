//! Fake LLM Client - 用于测试与本地开发的 LLM 客户端
//!
//! 按脚本顺序返回预设响应；开启合成模式后，脚本耗尽时按提示词生成占位大纲与正文

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::application::ports::{ChatRequest, ChatResponse, ChatRole, LlmError, LlmPort};

/// 合成嵌入向量的维度
pub const FAKE_EMBEDDING_DIMENSIONS: usize = 32;

const FAKE_MODEL: &str = "fake-llm";

/// Fake LLM Client
pub struct FakeLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    synthetic: bool,
    fail_embeddings: AtomicBool,
    completion_calls: AtomicU32,
}

impl FakeLlmClient {
    /// 仅返回脚本响应，脚本耗尽时报错
    pub fn scripted() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            synthetic: false,
            fail_embeddings: AtomicBool::new(false),
            completion_calls: AtomicU32::new(0),
        }
    }

    /// 脚本耗尽时合成响应，用于无外部服务的本地运行
    pub fn synthetic() -> Self {
        tracing::info!("FakeLlmClient initialized in synthetic mode");
        Self {
            synthetic: true,
            ..Self::scripted()
        }
    }

    pub fn push_response(&self, content: impl Into<String>) {
        self.lock_script().push_back(Ok(content.into()));
    }

    pub fn push_error(&self, error: LlmError) {
        self.lock_script().push_back(Err(error));
    }

    pub fn fail_embeddings(&self, fail: bool) {
        self.fail_embeddings.store(fail, Ordering::SeqCst);
    }

    /// 已收到的补全请求数
    pub fn completion_calls(&self) -> u32 {
        self.completion_calls.load(Ordering::SeqCst)
    }

    fn lock_script(&self) -> MutexGuard<'_, VecDeque<Result<String, LlmError>>> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn synthesize(request: &ChatRequest) -> String {
        let user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if request.json_mode {
            let chapters = requested_chapter_count(user).unwrap_or(3);
            synthetic_outline_json("Untitled Draft", chapters)
        } else {
            format!(
                "The morning arrived without ceremony. {}",
                user.lines().next().unwrap_or_default()
            )
        }
    }
}

#[async_trait]
impl LlmPort for FakeLlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.completion_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.lock_script().pop_front();
        let content = match scripted {
            Some(result) => result?,
            None if self.synthetic => Self::synthesize(&request),
            None => {
                return Err(LlmError::ServiceError(
                    "FakeLlmClient: no scripted response".to_string(),
                ))
            }
        };

        tracing::debug!(chars = content.len(), "FakeLlmClient: returning completion");

        Ok(ChatResponse {
            content,
            model: FAKE_MODEL.to_string(),
            total_tokens: None,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(LlmError::ServiceError(
                "FakeLlmClient: embeddings disabled".to_string(),
            ));
        }
        Ok(hashed_embedding(text))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// 词袋哈希嵌入：相同文本得到相同向量，词汇重叠越多越相似
pub fn hashed_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; FAKE_EMBEDDING_DIMENSIONS];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        // FNV-1a
        let mut hash: u32 = 0x811c_9dc5;
        for byte in word.to_lowercase().bytes() {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        vector[hash as usize % FAKE_EMBEDDING_DIMENSIONS] += 1.0;
    }
    vector
}

/// 从大纲提示词中读出 "Write exactly N chapters"
fn requested_chapter_count(prompt: &str) -> Option<u32> {
    let rest = &prompt[prompt.find("exactly ")? + "exactly ".len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok().filter(|n| *n > 0)
}

/// 结构完整的占位大纲 JSON
pub fn synthetic_outline_json(title: &str, chapters: u32) -> String {
    let chapters: Vec<_> = (1..=chapters)
        .map(|n| {
            json!({
                "chapterNumber": n,
                "chapterName": format!("Chapter {}", n),
                "summary": format!("The story advances in chapter {}.", n),
                "scenes": [
                    { "name": format!("Scene {}.1", n), "description": "An opening beat." }
                ],
                "keyPlotPoints": [format!("Turning point {}", n)]
            })
        })
        .collect();

    json!({
        "title": title,
        "description": "A synthetic outline produced without a language model.",
        "themes": ["placeholder"],
        "chapters": chapters
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ChatMessage;
    use crate::domain::outline::{parse_outline, validate_outline};

    fn request(user: &str, json_mode: bool) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user(user)],
            temperature: 0.7,
            max_tokens: None,
            json_mode,
        }
    }

    #[tokio::test]
    async fn test_scripted_order_then_error() {
        let client = FakeLlmClient::scripted();
        client.push_response("first");
        client.push_error(LlmError::Timeout);

        assert_eq!(client.complete(request("x", false)).await.unwrap().content, "first");
        assert!(matches!(
            client.complete(request("x", false)).await,
            Err(LlmError::Timeout)
        ));
        assert!(client.complete(request("x", false)).await.is_err());
        assert_eq!(client.completion_calls(), 3);
    }

    #[tokio::test]
    async fn test_synthetic_outline_follows_prompt() {
        let client = FakeLlmClient::synthetic();
        let response = client
            .complete(request("Write exactly 7 chapters. Every chapter...", true))
            .await
            .unwrap();

        let outline = parse_outline(&response.content).unwrap();
        assert_eq!(outline.chapter_count(), 7);
        assert!(validate_outline(&outline).is_valid);
    }

    #[test]
    fn test_hashed_embedding_is_deterministic() {
        let a = hashed_embedding("Fog over the harbour");
        let b = hashed_embedding("fog over the HARBOUR");
        assert_eq!(a, b);
        assert_eq!(a.len(), FAKE_EMBEDDING_DIMENSIONS);
        assert!(hashed_embedding("").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_requested_chapter_count() {
        assert_eq!(requested_chapter_count("Write exactly 12 chapters."), Some(12));
        assert_eq!(requested_chapter_count("no count here"), None);
    }
}
