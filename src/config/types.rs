//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::application::{GenerationSettings, RetryPolicy};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM 服务配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 生成流程配置
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// LLM 提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI 兼容 HTTP 接口
    #[default]
    Http,
    /// 本地合成响应，无需网络（演示与联调）
    Fake,
}

/// LLM 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// API 基础 URL（含版本前缀）
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    /// Bearer token，建议通过 NARRATELY_LLM__API_KEY 注入
    #[serde(default)]
    pub api_key: String,

    /// 补全模型
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 嵌入模型
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: default_llm_url(),
            api_key: String::new(),
            model: default_llm_model(),
            embedding_model: default_embedding_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// 生成流程配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// 大纲生成/精修最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 并发章节写作任务数
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// 任务队列容量
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    #[serde(default = "default_outline_temperature")]
    pub outline_temperature: f32,

    #[serde(default = "default_chapter_temperature")]
    pub chapter_temperature: f32,

    /// 单次补全 token 上限，不设置时由服务端决定
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// 参考片段相似度阈值
    #[serde(default = "default_reference_threshold")]
    pub reference_match_threshold: f32,

    /// 每次生成检索的参考片段数，0 表示关闭检索
    #[serde(default = "default_reference_count")]
    pub reference_match_count: usize,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_queue_size() -> usize {
    256
}

fn default_outline_temperature() -> f32 {
    0.7
}

fn default_chapter_temperature() -> f32 {
    0.8
}

fn default_reference_threshold() -> f32 {
    0.75
}

fn default_reference_count() -> usize {
    3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            queue_size: default_queue_size(),
            outline_temperature: default_outline_temperature(),
            chapter_temperature: default_chapter_temperature(),
            max_tokens: None,
            reference_match_threshold: default_reference_threshold(),
            reference_match_count: default_reference_count(),
        }
    }
}

impl GenerationConfig {
    /// 转换为应用层生成参数
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            outline_retry: RetryPolicy::new(self.max_attempts),
            outline_temperature: self.outline_temperature,
            chapter_temperature: self.chapter_temperature,
            max_tokens: self.max_tokens,
            reference_match_threshold: self.reference_match_threshold,
            reference_match_count: self.reference_match_count,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/narrately.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
