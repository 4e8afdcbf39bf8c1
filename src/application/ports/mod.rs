//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod job_manager;
mod llm_engine;
mod repositories;

pub use job_manager::{ChapterJob, JobError, JobManagerPort, JobState};
pub use llm_engine::{ChatMessage, ChatRequest, ChatResponse, ChatRole, LlmError, LlmPort};
pub use repositories::{
    cosine_similarity, ChapterRecord, ChunkMatch, GenerationSessionRecord,
    GenerationSessionRepositoryPort, NovelRecord, NovelRepositoryPort, NovelStatus,
    ReferenceChunkRecord, ReferenceChunkRepositoryPort, RepositoryError, SessionKind,
    SessionStatus,
};
