//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, LlmProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径，后者覆盖前者
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "NARRATELY";

/// 加载应用配置
///
/// # 环境变量示例
/// - `NARRATELY_SERVER__PORT=8080`
/// - `NARRATELY_LLM__PROVIDER=fake`
/// - `NARRATELY_LLM__API_KEY=sk-...`
/// - `NARRATELY_GENERATION__MAX_ATTEMPTS=5`
/// - `NARRATELY_DATABASE__PATH=/data/narrately.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索工作目录下的默认配置文件
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 默认值由各结构体的 serde default 提供，这里只设置最常被覆盖的项
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("llm.provider", "http")?
        .set_default("database.path", "data/narrately.db")?
        .set_default("log.level", "info")?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 层级分隔符: __ (双下划线)，变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.llm.provider == LlmProvider::Http && config.llm.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    let generation = &config.generation;
    if generation.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "Generation max_attempts must be at least 1".to_string(),
        ));
    }
    if generation.max_concurrent_jobs == 0 || generation.queue_size == 0 {
        return Err(ConfigError::ValidationError(
            "Job concurrency and queue size must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&generation.reference_match_threshold) {
        return Err(ConfigError::ValidationError(format!(
            "Reference match threshold {} is outside 0..=1",
            generation.reference_match_threshold
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出 API key
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("LLM Provider: {:?}", config.llm.provider);
    if config.llm.provider == LlmProvider::Http {
        tracing::info!("LLM URL: {}", config.llm.base_url);
        tracing::info!("LLM Model: {} (embeddings: {})", config.llm.model, config.llm.embedding_model);
        tracing::info!("LLM API Key: {}", if config.llm.api_key.is_empty() { "unset" } else { "set" });
        tracing::info!("LLM Timeout: {}s", config.llm.timeout_secs);
    }
    tracing::info!("Outline Max Attempts: {}", config.generation.max_attempts);
    tracing::info!("Concurrent Chapter Jobs: {}", config.generation.max_concurrent_jobs);
    tracing::info!(
        "Reference Matching: {} chunks @ {}",
        config.generation.reference_match_count,
        config.generation.reference_match_threshold
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5060);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.llm.provider, LlmProvider::Http);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_llm_url_only_matters_for_http() {
        let mut config = AppConfig::default();
        config.llm.base_url = String::new();
        assert!(validate_config(&config).is_err());

        config.llm.provider = LlmProvider::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_attempts() {
        let mut config = AppConfig::default();
        config.generation.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_threshold_out_of_range() {
        let mut config = AppConfig::default();
        config.generation.reference_match_threshold = 1.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[llm]
provider = "fake"

[generation]
max_attempts = 4
reference_match_count = 0

[database]
path = "/tmp/narrately-test.db"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.llm.provider, LlmProvider::Fake);
        assert_eq!(config.generation.max_attempts, 4);
        assert_eq!(config.generation.reference_match_count, 0);
        assert_eq!(config.generation.queue_size, 256);
        assert_eq!(config.database.path, "/tmp/narrately-test.db");
    }
}
