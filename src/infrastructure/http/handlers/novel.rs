//! Novel HTTP Handlers
//!
//! 大纲生成/精修同步返回；章节写作异步执行，通过 /api/session/status 轮询

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    DeleteNovel, GenerateChapters, GenerateOutline, GetChapters, GetNovel, ListNovels,
    OutlineResponse, RefineOutline,
};
use crate::domain::outline::NovelOutline;
use crate::domain::parameters::NovelParameters;
use crate::domain::weighting::StoryDimensions;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::handlers::SessionDto;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NovelIdRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RefineOutlineRequest {
    pub id: Uuid,
    pub instructions: String,
}

#[derive(Debug, Serialize)]
pub struct OutlineDto {
    pub novel_id: Uuid,
    pub session_id: Uuid,
    pub outline: NovelOutline,
    pub dimensions: StoryDimensions,
    pub expected_chapters: u32,
    pub attempts: u32,
}

impl From<OutlineResponse> for OutlineDto {
    fn from(r: OutlineResponse) -> Self {
        Self {
            novel_id: r.novel_id,
            session_id: r.session_id,
            outline: r.outline,
            dimensions: r.dimensions,
            expected_chapters: r.expected_chapters,
            attempts: r.attempts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateChaptersDto {
    pub novel_id: Uuid,
    pub session_id: Uuid,
    /// 全部章节已写完时为空
    pub job_id: Option<String>,
    pub total_chapters: u32,
    pub already_written: u32,
}

#[derive(Debug, Serialize)]
pub struct NovelSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub status: String,
    pub chapter_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct NovelDetailDto {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub parameters: NovelParameters,
    pub outline: Option<NovelOutline>,
    pub chapters_written: usize,
    pub latest_session: Option<SessionDto>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterDto {
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteNovelDto {
    pub id: Uuid,
    pub status: String,
}

// ============================================================================
// Outline
// ============================================================================

/// 根据参数创建小说并生成大纲
pub async fn generate_outline(
    State(state): State<Arc<AppState>>,
    Json(parameters): Json<NovelParameters>,
) -> Result<Json<ApiResponse<OutlineDto>>, ApiError> {
    let result = state
        .generate_outline_handler
        .handle(GenerateOutline { parameters })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 按指令精修已有大纲
pub async fn refine_outline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefineOutlineRequest>,
) -> Result<Json<ApiResponse<OutlineDto>>, ApiError> {
    let result = state
        .refine_outline_handler
        .handle(RefineOutline {
            novel_id: req.id,
            instructions: req.instructions,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

// ============================================================================
// Chapters
// ============================================================================

/// 提交章节写作任务，立即返回会话 ID
pub async fn generate_chapters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<GenerateChaptersDto>>, ApiError> {
    let result = state
        .generate_chapters_handler
        .handle(GenerateChapters { novel_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(GenerateChaptersDto {
        novel_id: result.novel_id,
        session_id: result.session_id,
        job_id: result.job_id,
        total_chapters: result.total_chapters,
        already_written: result.already_written,
    })))
}

pub async fn get_chapters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<Vec<ChapterDto>>>, ApiError> {
    let chapters = state
        .get_chapters_handler
        .handle(GetChapters { novel_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(
        chapters
            .into_iter()
            .map(|c| ChapterDto {
                chapter_number: c.chapter_number,
                title: c.title,
                content: c.content,
                word_count: c.word_count,
                created_at: c.created_at,
            })
            .collect(),
    )))
}

// ============================================================================
// Novel
// ============================================================================

pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<NovelDetailDto>>, ApiError> {
    let novel = state
        .get_novel_handler
        .handle(GetNovel { novel_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(NovelDetailDto {
        id: novel.id,
        title: novel.title,
        status: novel.status,
        parameters: novel.parameters,
        outline: novel.outline,
        chapters_written: novel.chapters_written,
        latest_session: novel.latest_session.map(SessionDto::from),
        created_at: novel.created_at,
        updated_at: novel.updated_at,
    })))
}

pub async fn list_novels(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NovelSummaryDto>>>, ApiError> {
    let novels = state.list_novels_handler.handle(ListNovels).await?;

    Ok(Json(ApiResponse::success(
        novels
            .into_iter()
            .map(|n| NovelSummaryDto {
                id: n.id,
                title: n.title,
                genre: n.genre,
                status: n.status,
                chapter_count: n.chapter_count,
                created_at: n.created_at,
                updated_at: n.updated_at,
            })
            .collect(),
    )))
}

/// 删除小说；进行中的章节任务会被取消
pub async fn delete_novel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NovelIdRequest>,
) -> Result<Json<ApiResponse<DeleteNovelDto>>, ApiError> {
    state
        .delete_novel_handler
        .handle(DeleteNovel { novel_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(DeleteNovelDto {
        id: req.id,
        status: "deleted".to_string(),
    })))
}
