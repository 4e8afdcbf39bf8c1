//! Outline Command Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{GenerateOutline, RefineOutline};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChatRequest, GenerationSessionRecord, GenerationSessionRepositoryPort, LlmPort, NovelRecord,
    NovelRepositoryPort, NovelStatus, ReferenceChunkRepositoryPort, SessionKind,
};
use crate::application::retry::retry_bounded;
use crate::application::settings::GenerationSettings;
use crate::domain::outline::{
    apply_dimensional_guidance, chapter_count_for, parse_outline, validate_outline, NovelOutline,
    OutlineError,
};
use crate::domain::parameters::NovelParameters;
use crate::domain::weighting::{calculate_dimensions, StoryDimensions};
use crate::domain::{outline_prompt, refine_prompt, Prompt};

/// 大纲生成/精修响应
#[derive(Debug, Clone)]
pub struct OutlineResponse {
    pub novel_id: Uuid,
    pub session_id: Uuid,
    pub outline: NovelOutline,
    pub dimensions: StoryDimensions,
    /// 参数推导出的章节数
    pub expected_chapters: u32,
    /// 实际使用的尝试次数
    pub attempts: u32,
}

// ============================================================================
// Shared generation loop
// ============================================================================

/// 调用 LLM 并整形、校验大纲，失败时在重试策略内整体重来
async fn generate_outline(
    llm: &dyn LlmPort,
    settings: &GenerationSettings,
    prompt: &Prompt,
    params: &NovelParameters,
    dimensions: &StoryDimensions,
) -> Result<(NovelOutline, u32), ApplicationError> {
    retry_bounded(settings.outline_retry, "outline", |attempt| async move {
        let mut request = ChatRequest::from_prompt(prompt, settings.outline_temperature).json();
        if let Some(max_tokens) = settings.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = llm.complete(request).await?;
        tracing::debug!(
            attempt = attempt,
            model = %response.model,
            tokens = ?response.total_tokens,
            "Outline response received"
        );

        let mut outline = parse_outline(&response.content)?;
        let report = apply_dimensional_guidance(&mut outline, dimensions, params);
        if !report.matches_plan() {
            tracing::warn!(
                attempt = attempt,
                expected_chapters = report.expected_chapters,
                actual_chapters = report.actual_chapters,
                "Outline chapter count differs from plan"
            );
        }

        let validation = validate_outline(&outline);
        if !validation.is_valid {
            return Err(ApplicationError::from(OutlineError::Incomplete(
                validation.errors,
            )));
        }

        Ok::<_, ApplicationError>(outline)
    })
    .await
}

// ============================================================================
// GenerateOutline
// ============================================================================

/// GenerateOutline Handler
pub struct GenerateOutlineHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    reference_repo: Arc<dyn ReferenceChunkRepositoryPort>,
    llm: Arc<dyn LlmPort>,
    settings: GenerationSettings,
}

impl GenerateOutlineHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        session_repo: Arc<dyn GenerationSessionRepositoryPort>,
        reference_repo: Arc<dyn ReferenceChunkRepositoryPort>,
        llm: Arc<dyn LlmPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            novel_repo,
            session_repo,
            reference_repo,
            llm,
            settings,
        }
    }

    pub async fn handle(&self, command: GenerateOutline) -> Result<OutlineResponse, ApplicationError> {
        let params = command.parameters;
        params.validate()?;

        let dimensions = calculate_dimensions(&params);
        let expected_chapters = chapter_count_for(&params, &dimensions);

        let novel = NovelRecord::new(params.clone());
        self.novel_repo.save(&novel).await?;

        let mut session = GenerationSessionRecord::new(novel.id, SessionKind::Outline, 1);
        session.start();
        self.session_repo.save(&session).await?;

        tracing::info!(
            novel_id = %novel.id,
            session_id = %session.id,
            genre = %params.genre,
            expected_chapters = expected_chapters,
            "Outline generation started"
        );

        let references = self.fetch_references(&params).await;
        let prompt = outline_prompt(&params, &dimensions, expected_chapters, &references);

        match generate_outline(
            self.llm.as_ref(),
            &self.settings,
            &prompt,
            &params,
            &dimensions,
        )
        .await
        {
            Ok((outline, attempts)) => {
                self.novel_repo
                    .save_outline(novel.id, &outline, NovelStatus::OutlineReady)
                    .await?;
                session.complete(attempts);
                self.session_repo.save(&session).await?;

                tracing::info!(
                    novel_id = %novel.id,
                    chapters = outline.chapter_count(),
                    attempts = attempts,
                    "Outline generated"
                );

                Ok(OutlineResponse {
                    novel_id: novel.id,
                    session_id: session.id,
                    outline,
                    dimensions,
                    expected_chapters,
                    attempts,
                })
            }
            Err(e) => {
                tracing::error!(novel_id = %novel.id, error = %e, "Outline generation failed");

                if let Err(repo_err) = self
                    .novel_repo
                    .update_status(novel.id, NovelStatus::Failed)
                    .await
                {
                    tracing::warn!(error = %repo_err, "Failed to mark novel as failed");
                }
                session.fail(e.to_string());
                if let Err(repo_err) = self.session_repo.save(&session).await {
                    tracing::warn!(error = %repo_err, "Failed to mark session as failed");
                }

                Err(e)
            }
        }
    }

    /// 检索参考片段；嵌入或检索失败时不影响生成
    async fn fetch_references(&self, params: &NovelParameters) -> Vec<String> {
        if self.settings.reference_match_count == 0 {
            return Vec::new();
        }

        let query = format!(
            "{} {} {}",
            params.genre.trim(),
            params.theme.trim(),
            params.story_description.trim()
        );

        let embedding = match self.llm.embed(&query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "Embedding failed, generating without references");
                return Vec::new();
            }
        };

        match self
            .reference_repo
            .match_chunks(
                &embedding,
                self.settings.reference_match_threshold,
                self.settings.reference_match_count,
            )
            .await
        {
            Ok(matches) => {
                tracing::debug!(count = matches.len(), "Reference chunks matched");
                matches.into_iter().map(|m| m.content).collect()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reference lookup failed, generating without references");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// RefineOutline
// ============================================================================

/// RefineOutline Handler
///
/// 失败时保留原大纲，仅会话标记为失败
pub struct RefineOutlineHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    llm: Arc<dyn LlmPort>,
    settings: GenerationSettings,
}

impl RefineOutlineHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        session_repo: Arc<dyn GenerationSessionRepositoryPort>,
        llm: Arc<dyn LlmPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            novel_repo,
            session_repo,
            llm,
            settings,
        }
    }

    pub async fn handle(&self, command: RefineOutline) -> Result<OutlineResponse, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        if novel.status == NovelStatus::Writing {
            return Err(ApplicationError::invalid_state(
                "Cannot refine outline while chapters are being written",
            ));
        }
        let current = novel
            .outline
            .as_ref()
            .ok_or_else(|| ApplicationError::invalid_state("Novel has no outline to refine"))?;

        // 已写章节按章节号对应旧大纲，精修后会被误判为已完成
        let written = self.novel_repo.find_chapters(novel.id).await?.len();
        if written > 0 {
            return Err(ApplicationError::invalid_state(format!(
                "Cannot refine outline after {} chapter(s) have been written",
                written
            )));
        }

        let params = &novel.parameters;
        let dimensions = calculate_dimensions(params);
        let expected_chapters = chapter_count_for(params, &dimensions);

        let mut session = GenerationSessionRecord::new(novel.id, SessionKind::Refinement, 1);
        session.start();
        self.session_repo.save(&session).await?;

        let prompt = refine_prompt(params, current, &dimensions, &command.instructions);

        match generate_outline(self.llm.as_ref(), &self.settings, &prompt, params, &dimensions)
            .await
        {
            Ok((outline, attempts)) => {
                self.novel_repo
                    .save_outline(novel.id, &outline, NovelStatus::OutlineReady)
                    .await?;
                session.complete(attempts);
                self.session_repo.save(&session).await?;

                tracing::info!(
                    novel_id = %novel.id,
                    chapters = outline.chapter_count(),
                    attempts = attempts,
                    "Outline refined"
                );

                Ok(OutlineResponse {
                    novel_id: novel.id,
                    session_id: session.id,
                    outline,
                    dimensions,
                    expected_chapters,
                    attempts,
                })
            }
            Err(e) => {
                tracing::error!(novel_id = %novel.id, error = %e, "Outline refinement failed");
                session.fail(e.to_string());
                if let Err(repo_err) = self.session_repo.save(&session).await {
                    tracing::warn!(error = %repo_err, "Failed to mark session as failed");
                }
                Err(e)
            }
        }
    }
}
