//! LLM Adapter - 文本生成与嵌入客户端实现

mod fake_llm_client;
mod http_llm_client;

pub use fake_llm_client::{hashed_embedding, synthetic_outline_json, FakeLlmClient};
pub use http_llm_client::{HttpLlmClient, HttpLlmClientConfig};
