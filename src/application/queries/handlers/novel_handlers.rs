//! Novel Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, GenerationSessionRepositoryPort, NovelRecord, NovelRepositoryPort,
};
use crate::application::queries::handlers::SessionResponse;
use crate::application::queries::{GetChapters, GetNovel, ListNovels};
use crate::domain::outline::NovelOutline;
use crate::domain::parameters::NovelParameters;

// ============================================================================
// Response DTOs
// ============================================================================

/// 小说列表项
#[derive(Debug, Clone)]
pub struct NovelSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub status: String,
    /// 大纲章节数，尚无大纲时为 0
    pub chapter_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NovelRecord> for NovelSummaryResponse {
    fn from(record: NovelRecord) -> Self {
        Self {
            chapter_count: record.outline.as_ref().map_or(0, NovelOutline::chapter_count),
            id: record.id,
            title: record.title,
            genre: record.parameters.genre,
            status: record.status.as_str().to_string(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 小说详情响应
#[derive(Debug, Clone)]
pub struct NovelDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub parameters: NovelParameters,
    pub outline: Option<NovelOutline>,
    pub chapters_written: usize,
    /// 最近一次生成会话
    pub latest_session: Option<SessionResponse>,
    pub created_at: String,
    pub updated_at: String,
}

/// 章节正文响应
#[derive(Debug, Clone)]
pub struct ChapterResponse {
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub created_at: String,
}

impl From<ChapterRecord> for ChapterResponse {
    fn from(record: ChapterRecord) -> Self {
        Self {
            chapter_number: record.chapter_number,
            title: record.title,
            content: record.content,
            word_count: record.word_count,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    session_repo: Arc<dyn GenerationSessionRepositoryPort>,
}

impl GetNovelHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            session_repo,
        }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelDetailResponse, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let chapters_written = self.novel_repo.find_chapters(novel.id).await?.len();
        let latest_session = self
            .session_repo
            .find_by_novel(novel.id)
            .await?
            .into_iter()
            .next()
            .map(SessionResponse::from);

        Ok(NovelDetailResponse {
            id: novel.id,
            title: novel.title,
            status: novel.status.as_str().to_string(),
            parameters: novel.parameters,
            outline: novel.outline,
            chapters_written,
            latest_session,
            created_at: novel.created_at.to_rfc3339(),
            updated_at: novel.updated_at.to_rfc3339(),
        })
    }
}

/// ListNovels Handler
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListNovelsHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, _query: ListNovels) -> Result<Vec<NovelSummaryResponse>, ApplicationError> {
        let novels = self.novel_repo.find_all().await?;
        Ok(novels.into_iter().map(NovelSummaryResponse::from).collect())
    }
}

/// GetChapters Handler
pub struct GetChaptersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GetChaptersHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, query: GetChapters) -> Result<Vec<ChapterResponse>, ApplicationError> {
        // 验证小说存在
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let chapters = self.novel_repo.find_chapters(query.novel_id).await?;
        Ok(chapters.into_iter().map(ChapterResponse::from).collect())
    }
}
