//! HTTP LLM Client - 调用 OpenAI 兼容的补全与嵌入接口
//!
//! 实现 LlmPort trait
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! POST {base_url}/embeddings
//! GET  {base_url}/models  (健康检查)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{ChatMessage, ChatRequest, ChatResponse, LlmError, LlmPort};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EmbeddingBody<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingReply {
    #[serde(default)]
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP LLM 客户端配置
#[derive(Debug, Clone)]
pub struct HttpLlmClientConfig {
    /// API 基础 URL（含版本前缀，如 https://api.openai.com/v1）
    pub base_url: String,
    /// Bearer token，为空时不发送 Authorization
    pub api_key: String,
    /// 补全模型
    pub model: String,
    /// 嵌入模型
    pub embedding_model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpLlmClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpLlmClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP LLM 客户端
pub struct HttpLlmClient {
    client: Client,
    config: HttpLlmClientConfig,
}

impl HttpLlmClient {
    /// 创建新的 HTTP LLM 客户端
    pub fn new(config: HttpLlmClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.post(self.url(path));
        if self.config.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.config.api_key)
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_default();
        Err(status_error(status, &error_text))
    }
}

fn send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else if e.is_connect() {
        LlmError::NetworkError(format!("Cannot connect to LLM service: {}", e))
    } else {
        LlmError::NetworkError(e.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited(body.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmError::Timeout,
        _ => LlmError::ServiceError(format!("HTTP {}: {}", status, body)),
    }
}

#[async_trait]
impl LlmPort for HttpLlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = CompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(
            url = %self.url("chat/completions"),
            model = %self.config.model,
            messages = request.messages.len(),
            json_mode = request.json_mode,
            "Sending completion request"
        );

        let response = self
            .post("chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;
        let response = Self::check_status(response).await?;

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in completion".to_string()))?;

        let total_tokens = reply.usage.and_then(|u| u.total_tokens);
        tracing::info!(
            model = %reply.model,
            total_tokens = ?total_tokens,
            chars = content.len(),
            "Completion received"
        );

        Ok(ChatResponse {
            content,
            model: reply.model,
            total_tokens,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let body = EmbeddingBody {
            model: &self.config.embedding_model,
            input: text,
        };

        let response = self
            .post("embeddings")
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;
        let response = Self::check_status(response).await?;

        let reply: EmbeddingReply = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        reply
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| LlmError::InvalidResponse("No embedding in response".to_string()))
    }

    async fn health_check(&self) -> bool {
        let mut builder = self
            .client
            .get(self.url("models"))
            .timeout(Duration::from_secs(5));
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        match builder.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpLlmClientConfig::new("http://localhost:11434/v1")
            .with_api_key("sk-test")
            .with_timeout(30);
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = HttpLlmClient::new(HttpLlmClientConfig::new("http://llm.local/v1/")).unwrap();
        assert_eq!(client.url("embeddings"), "http://llm.local/v1/embeddings");
    }

    #[test]
    fn test_completion_body_json_mode() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let body = CompletionBody {
            model: "m",
            messages: &messages,
            temperature: 0.5,
            max_tokens: None,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "system");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::GATEWAY_TIMEOUT, ""),
            LlmError::Timeout
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            LlmError::ServiceError(_)
        ));
    }

    #[test]
    fn test_reply_parsing() {
        let reply: CompletionReply = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":"hi"}}],"usage":{"total_tokens":12}}"#,
        )
        .unwrap();
        assert_eq!(reply.choices[0].message.content.as_deref(), Some("hi"));
        assert_eq!(reply.usage.unwrap().total_tokens, Some(12));
    }
}
