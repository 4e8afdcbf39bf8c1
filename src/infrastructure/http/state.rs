//! Application State
//!
//! 持有端口与所有 Command/Query Handlers

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteNovelHandler, GenerateChaptersHandler, GenerateOutlineHandler,
    IngestReferenceChunkHandler, RefineOutlineHandler,
    // Query handlers
    GetChaptersHandler, GetGenerationSessionHandler, GetNovelHandler, ListNovelsHandler,
    PreviewDimensionsHandler,
    // Ports
    GenerationSessionRepositoryPort, JobManagerPort, LlmPort, NovelRepositoryPort,
    ReferenceChunkRepositoryPort,
    // Settings
    GenerationSettings,
};

/// 应用状态
///
/// JobManager 为内存实现，其余端口由 SQLite 与 LLM 适配器提供
pub struct AppState {
    // ========== Ports ==========
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    pub reference_repo: Arc<dyn ReferenceChunkRepositoryPort>,
    pub job_manager: Arc<dyn JobManagerPort>,
    pub llm: Arc<dyn LlmPort>,

    // ========== Command Handlers ==========
    pub generate_outline_handler: GenerateOutlineHandler,
    pub refine_outline_handler: RefineOutlineHandler,
    pub generate_chapters_handler: GenerateChaptersHandler,
    pub delete_novel_handler: DeleteNovelHandler,
    pub ingest_reference_handler: IngestReferenceChunkHandler,

    // ========== Query Handlers ==========
    pub preview_dimensions_handler: PreviewDimensionsHandler,
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
    pub get_chapters_handler: GetChaptersHandler,
    pub get_session_handler: GetGenerationSessionHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        session_repo: Arc<dyn GenerationSessionRepositoryPort>,
        reference_repo: Arc<dyn ReferenceChunkRepositoryPort>,
        job_manager: Arc<dyn JobManagerPort>,
        llm: Arc<dyn LlmPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            // Command handlers
            generate_outline_handler: GenerateOutlineHandler::new(
                novel_repo.clone(),
                session_repo.clone(),
                reference_repo.clone(),
                llm.clone(),
                settings.clone(),
            ),
            refine_outline_handler: RefineOutlineHandler::new(
                novel_repo.clone(),
                session_repo.clone(),
                llm.clone(),
                settings,
            ),
            generate_chapters_handler: GenerateChaptersHandler::new(
                novel_repo.clone(),
                session_repo.clone(),
                job_manager.clone(),
            ),
            delete_novel_handler: DeleteNovelHandler::new(novel_repo.clone(), job_manager.clone()),
            ingest_reference_handler: IngestReferenceChunkHandler::new(
                reference_repo.clone(),
                llm.clone(),
            ),

            // Query handlers
            preview_dimensions_handler: PreviewDimensionsHandler::new(),
            get_novel_handler: GetNovelHandler::new(novel_repo.clone(), session_repo.clone()),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone()),
            get_chapters_handler: GetChaptersHandler::new(novel_repo.clone()),
            get_session_handler: GetGenerationSessionHandler::new(session_repo.clone()),

            // Ports
            novel_repo,
            session_repo,
            reference_repo,
            job_manager,
            llm,
        }
    }
}
