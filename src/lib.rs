//! Narrately - 参数驱动的长篇小说生成
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - parameters: 小说参数与校验
//! - weighting: 参数 → 故事维度加权
//! - outline: 大纲解析、校验与维度整形
//! - prompt: 大纲/精修/章节提示词
//!
//! 应用层 (application/):
//! - Ports: LLM、Repositories、JobManager
//! - Commands / Queries: CQRS 处理器
//! - retry: 有界重试
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful JSON API
//! - Memory: JobManager 内存实现
//! - Worker: ChapterWorker 后台写作
//! - Persistence: SQLite
//! - Adapters: LLM Client

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
