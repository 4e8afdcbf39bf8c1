//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::outline::NovelOutline;
use crate::domain::parameters::NovelParameters;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Novel Repository
// ============================================================================

/// 小说生成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NovelStatus {
    /// 参数已提交，尚无大纲
    Draft,
    /// 大纲已生成
    OutlineReady,
    /// 正在写章节
    Writing,
    /// 全部章节完成
    Completed,
    /// 生成失败
    Failed,
}

impl NovelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NovelStatus::Draft => "draft",
            NovelStatus::OutlineReady => "outline_ready",
            NovelStatus::Writing => "writing",
            NovelStatus::Completed => "completed",
            NovelStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(NovelStatus::Draft),
            "outline_ready" => Some(NovelStatus::OutlineReady),
            "writing" => Some(NovelStatus::Writing),
            "completed" => Some(NovelStatus::Completed),
            "failed" => Some(NovelStatus::Failed),
            _ => None,
        }
    }
}

impl Default for NovelStatus {
    fn default() -> Self {
        NovelStatus::Draft
    }
}

/// 小说实体（用于持久化）
///
/// 参数与大纲均以 JSON 存储
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: Uuid,
    pub title: String,
    pub parameters: NovelParameters,
    pub outline: Option<NovelOutline>,
    pub status: NovelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NovelRecord {
    pub fn new(parameters: NovelParameters) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: parameters.title.trim().to_string(),
            parameters,
            outline: None,
            status: NovelStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 章节正文实体
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub created_at: DateTime<Utc>,
}

impl ChapterRecord {
    pub fn new(novel_id: Uuid, chapter_number: u32, title: String, content: String) -> Self {
        let word_count = content.split_whitespace().count() as u32;
        Self {
            id: Uuid::new_v4(),
            novel_id,
            chapter_number,
            title,
            content,
            word_count,
            created_at: Utc::now(),
        }
    }
}

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 获取所有小说
    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError>;

    /// 删除小说及其章节和生成会话
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 更新小说状态
    async fn update_status(&self, id: Uuid, status: NovelStatus) -> Result<(), RepositoryError>;

    /// 保存大纲并更新状态
    async fn save_outline(
        &self,
        id: Uuid,
        outline: &NovelOutline,
        status: NovelStatus,
    ) -> Result<(), RepositoryError>;

    /// 保存章节正文（同一章重复保存时覆盖）
    async fn save_chapter(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    /// 获取小说的全部章节，按章节号排序
    async fn find_chapters(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError>;
}

// ============================================================================
// Generation Session Repository
// ============================================================================

/// 生成会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Outline,
    Refinement,
    Chapters,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Outline => "outline",
            SessionKind::Refinement => "refinement",
            SessionKind::Chapters => "chapters",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "outline" => Some(SessionKind::Outline),
            "refinement" => Some(SessionKind::Refinement),
            "chapters" => Some(SessionKind::Chapters),
            _ => None,
        }
    }
}

/// 生成会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SessionStatus::Pending),
            "running" => Some(SessionStatus::Running),
            "completed" => Some(SessionStatus::Completed),
            "failed" => Some(SessionStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Pending
    }
}

/// 生成会话实体（用于持久化）
///
/// 记录一次多步生成请求的进度，客户端轮询此记录
#[derive(Debug, Clone)]
pub struct GenerationSessionRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub attempts: u32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationSessionRecord {
    pub fn new(novel_id: Uuid, kind: SessionKind, total_steps: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            novel_id,
            kind,
            status: SessionStatus::Pending,
            total_steps,
            completed_steps: 0,
            attempts: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start(&mut self) {
        self.status = SessionStatus::Running;
        self.updated_at = Utc::now();
    }

    pub fn advance(&mut self) {
        self.completed_steps = (self.completed_steps + 1).min(self.total_steps);
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self, attempts: u32) {
        self.status = SessionStatus::Completed;
        self.completed_steps = self.total_steps;
        self.attempts = attempts;
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// 进度百分比 [0, 100]
    pub fn progress_percent(&self) -> u32 {
        if self.total_steps == 0 {
            return if self.status == SessionStatus::Completed { 100 } else { 0 };
        }
        self.completed_steps.min(self.total_steps) * 100 / self.total_steps
    }
}

/// Generation Session Repository Port
#[async_trait]
pub trait GenerationSessionRepositoryPort: Send + Sync {
    /// 保存会话（存在则覆盖）
    async fn save(&self, session: &GenerationSessionRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找会话
    async fn find_by_id(&self, id: Uuid)
        -> Result<Option<GenerationSessionRecord>, RepositoryError>;

    /// 获取小说的所有会话，最新的在前
    async fn find_by_novel(
        &self,
        novel_id: Uuid,
    ) -> Result<Vec<GenerationSessionRecord>, RepositoryError>;
}

// ============================================================================
// Reference Chunk Repository
// ============================================================================

/// 参考片段实体
#[derive(Debug, Clone)]
pub struct ReferenceChunkRecord {
    pub id: Uuid,
    pub source: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// 相似度匹配结果
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub id: Uuid,
    pub source: String,
    pub content: String,
    pub similarity: f32,
}

/// Reference Chunk Repository Port
#[async_trait]
pub trait ReferenceChunkRepositoryPort: Send + Sync {
    /// 保存参考片段
    async fn save(&self, chunk: &ReferenceChunkRecord) -> Result<(), RepositoryError>;

    /// 按余弦相似度匹配，返回相似度 >= threshold 的前 limit 条，按相似度降序
    async fn match_chunks(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<ChunkMatch>, RepositoryError>;

    /// 片段总数
    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// 余弦相似度
///
/// 维度不一致或任一向量为零向量时返回 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in [
            NovelStatus::Draft,
            NovelStatus::OutlineReady,
            NovelStatus::Writing,
            NovelStatus::Completed,
            NovelStatus::Failed,
        ] {
            assert_eq!(NovelStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(NovelStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_session_progress() {
        let mut session = GenerationSessionRecord::new(Uuid::new_v4(), SessionKind::Chapters, 4);
        assert_eq!(session.progress_percent(), 0);
        session.start();
        session.advance();
        assert_eq!(session.progress_percent(), 25);
        session.complete(1);
        assert_eq!(session.progress_percent(), 100);
        assert!(session.status.is_terminal());
    }

    #[test]
    fn test_session_advance_saturates() {
        let mut session = GenerationSessionRecord::new(Uuid::new_v4(), SessionKind::Chapters, 1);
        session.advance();
        session.advance();
        assert_eq!(session.completed_steps, 1);
    }

    #[test]
    fn test_chapter_word_count() {
        let chapter = ChapterRecord::new(
            Uuid::new_v4(),
            1,
            "Opening".to_string(),
            "The  tide went\nout and never came back.".to_string(),
        );
        assert_eq!(chapter.word_count, 8);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
