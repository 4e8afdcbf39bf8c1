//! Chapter Command Handlers

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::GenerateChapters;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterJob, GenerationSessionRecord, GenerationSessionRepositoryPort, JobError,
    JobManagerPort, NovelRepositoryPort, NovelStatus, SessionKind,
};

/// 章节生成提交响应
#[derive(Debug, Clone)]
pub struct GenerateChaptersResponse {
    pub novel_id: Uuid,
    pub session_id: Uuid,
    /// 全部章节已写完时不再入队
    pub job_id: Option<String>,
    pub total_chapters: u32,
    pub already_written: u32,
}

/// GenerateChapters Handler - 提交后台写作任务
pub struct GenerateChaptersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    job_manager: Arc<dyn JobManagerPort>,
}

impl GenerateChaptersHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        session_repo: Arc<dyn GenerationSessionRepositoryPort>,
        job_manager: Arc<dyn JobManagerPort>,
    ) -> Self {
        Self {
            novel_repo,
            session_repo,
            job_manager,
        }
    }

    pub async fn handle(
        &self,
        command: GenerateChapters,
    ) -> Result<GenerateChaptersResponse, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let outline = novel
            .outline
            .as_ref()
            .ok_or_else(|| ApplicationError::invalid_state("Novel has no outline yet"))?;

        if let Some(job) = self.job_manager.active_job(novel.id) {
            return Err(ApplicationError::business_rule(format!(
                "Chapters are already being written (job {})",
                job.job_id
            )));
        }

        let written: HashSet<u32> = self
            .novel_repo
            .find_chapters(novel.id)
            .await?
            .into_iter()
            .map(|c| c.chapter_number)
            .collect();
        let total_chapters = outline.chapter_count() as u32;
        let already_written = outline
            .chapters
            .iter()
            .filter(|c| written.contains(&c.chapter_number))
            .count() as u32;

        let mut session =
            GenerationSessionRecord::new(novel.id, SessionKind::Chapters, total_chapters);
        session.completed_steps = already_written;

        if already_written == total_chapters {
            session.complete(0);
            self.session_repo.save(&session).await?;
            self.novel_repo
                .update_status(novel.id, NovelStatus::Completed)
                .await?;

            tracing::info!(novel_id = %novel.id, "All chapters already written");

            return Ok(GenerateChaptersResponse {
                novel_id: novel.id,
                session_id: session.id,
                job_id: None,
                total_chapters,
                already_written,
            });
        }

        self.session_repo.save(&session).await?;
        self.novel_repo
            .update_status(novel.id, NovelStatus::Writing)
            .await?;

        let job_id = match self.job_manager.submit(ChapterJob::new(novel.id, session.id)) {
            Ok(job_id) => job_id,
            Err(e) => {
                session.fail(e.to_string());
                self.session_repo.save(&session).await?;
                // 并发提交时另一任务已在写作，小说状态由该任务负责
                if !matches!(e, JobError::AlreadyRunning(_)) {
                    self.novel_repo.update_status(novel.id, novel.status).await?;
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            novel_id = %novel.id,
            session_id = %session.id,
            job_id = %job_id,
            total_chapters = total_chapters,
            already_written = already_written,
            "Chapter generation submitted"
        );

        Ok(GenerateChaptersResponse {
            novel_id: novel.id,
            session_id: session.id,
            job_id: Some(job_id),
            total_chapters,
            already_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ChapterRecord, JobState, NovelRecord, SessionStatus};
    use crate::domain::outline::NovelOutline;
    use crate::domain::parameters::NovelParameters;
    use crate::infrastructure::testing::TestContext;

    async fn novel_with_outline(ctx: &TestContext, chapters: u32) -> NovelRecord {
        let novel = NovelRecord::new(NovelParameters::sample());
        ctx.novel_repo.save(&novel).await.unwrap();
        ctx.novel_repo
            .save_outline(novel.id, &NovelOutline::sample(chapters), NovelStatus::OutlineReady)
            .await
            .unwrap();
        novel
    }

    fn handler(ctx: &TestContext) -> GenerateChaptersHandler {
        GenerateChaptersHandler::new(
            ctx.novel_repo.clone(),
            ctx.session_repo.clone(),
            ctx.job_manager.clone(),
        )
    }

    #[tokio::test]
    async fn test_submit_sets_writing_and_queues_job() {
        let ctx = TestContext::new().await;
        let novel = novel_with_outline(&ctx, 3).await;

        let response = handler(&ctx)
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap();

        assert_eq!(response.total_chapters, 3);
        assert_eq!(response.already_written, 0);
        let job_id = response.job_id.unwrap();
        assert_eq!(
            ctx.job_manager.get_job(&job_id).unwrap().state,
            JobState::Pending
        );

        let novel = ctx.novel_repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(novel.status, NovelStatus::Writing);
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected() {
        let ctx = TestContext::new().await;
        let novel = novel_with_outline(&ctx, 2).await;

        handler(&ctx)
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap();
        let err = handler(&ctx)
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::BusinessRuleViolation(_)));
    }

    /// 活跃任务检查总是放行，模拟两个请求同时通过检查
    struct StaleCheckJobManager {
        inner: Arc<dyn JobManagerPort>,
    }

    impl JobManagerPort for StaleCheckJobManager {
        fn submit(&self, job: ChapterJob) -> Result<String, JobError> {
            self.inner.submit(job)
        }
        fn get_job(&self, job_id: &str) -> Option<ChapterJob> {
            self.inner.get_job(job_id)
        }
        fn set_state(&self, job_id: &str, state: JobState) -> Result<(), JobError> {
            self.inner.set_state(job_id, state)
        }
        fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError> {
            self.inner.set_failed(job_id, error)
        }
        fn is_cancelled(&self, job_id: &str) -> bool {
            self.inner.is_cancelled(job_id)
        }
        fn cancel_novel(&self, novel_id: Uuid) -> bool {
            self.inner.cancel_novel(novel_id)
        }
        fn active_job(&self, _novel_id: Uuid) -> Option<ChapterJob> {
            None
        }
        fn cleanup_job(&self, job_id: &str) {
            self.inner.cleanup_job(job_id)
        }
    }

    #[tokio::test]
    async fn test_concurrent_submission_keeps_writing_status() {
        let ctx = TestContext::new().await;
        let novel = novel_with_outline(&ctx, 3).await;

        // 先到的请求已提交任务并进入写作
        let winner = handler(&ctx)
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap();

        let late = GenerateChaptersHandler::new(
            ctx.novel_repo.clone(),
            ctx.session_repo.clone(),
            Arc::new(StaleCheckJobManager {
                inner: ctx.job_manager.clone(),
            }),
        );
        let err = late
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::BusinessRuleViolation(_)));

        let stored = ctx.novel_repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NovelStatus::Writing);
        assert_eq!(
            ctx.job_manager.active_job(novel.id).unwrap().job_id,
            winner.job_id.unwrap()
        );

        let sessions = ctx.session_repo.find_by_novel(novel.id).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(
            sessions
                .iter()
                .filter(|s| s.status == SessionStatus::Failed)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_no_outline_is_invalid_state() {
        let ctx = TestContext::new().await;
        let novel = NovelRecord::new(NovelParameters::sample());
        ctx.novel_repo.save(&novel).await.unwrap();

        let err = handler(&ctx)
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_fully_written_novel_completes_without_job() {
        let ctx = TestContext::new().await;
        let novel = novel_with_outline(&ctx, 2).await;
        for n in 1..=2 {
            ctx.novel_repo
                .save_chapter(&ChapterRecord::new(
                    novel.id,
                    n,
                    format!("Chapter {}", n),
                    "Prose.".to_string(),
                ))
                .await
                .unwrap();
        }

        let response = handler(&ctx)
            .handle(GenerateChapters { novel_id: novel.id })
            .await
            .unwrap();

        assert!(response.job_id.is_none());
        assert_eq!(response.already_written, 2);
        let session = ctx
            .session_repo
            .find_by_id(response.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        let novel = ctx.novel_repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(novel.status, NovelStatus::Completed);
    }
}
