//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（LLM、Repository、JobManager）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - retry: 有界重试
//! - settings: 生成参数
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod retry;
pub mod settings;

// Re-exports
pub use commands::{
    DeleteNovel,
    GenerateChapters,
    GenerateOutline,
    IngestReferenceChunk,
    RefineOutline,
    // Handlers
    handlers::{
        DeleteNovelHandler, GenerateChaptersHandler, GenerateChaptersResponse,
        GenerateOutlineHandler, IngestReferenceChunkHandler, IngestReferenceResponse,
        OutlineResponse, RefineOutlineHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // LLM
    ChatMessage,
    ChatRequest,
    ChatResponse,
    ChatRole,
    LlmError,
    LlmPort,
    // Repositories
    ChapterRecord,
    ChunkMatch,
    GenerationSessionRecord,
    GenerationSessionRepositoryPort,
    NovelRecord,
    NovelRepositoryPort,
    NovelStatus,
    ReferenceChunkRecord,
    ReferenceChunkRepositoryPort,
    RepositoryError,
    SessionKind,
    SessionStatus,
    // Job manager
    ChapterJob,
    JobError,
    JobManagerPort,
    JobState,
};

pub use queries::{
    GetChapters,
    GetGenerationSession,
    GetNovel,
    ListNovels,
    PreviewDimensions,
    // Handlers
    handlers::{
        ChapterResponse, DimensionPreviewResponse, GetChaptersHandler,
        GetGenerationSessionHandler, GetNovelHandler, ListNovelsHandler, NovelDetailResponse,
        NovelSummaryResponse, PreviewDimensionsHandler, SessionResponse,
    },
};

pub use retry::{retry_bounded, RetryPolicy};
pub use settings::GenerationSettings;
