//! Chapter Worker - Background Chapter Writer

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{
    ChapterRecord, ChatRequest, GenerationSessionRecord, GenerationSessionRepositoryPort,
    JobManagerPort, JobState, LlmPort, NovelRepositoryPort, NovelStatus,
};
use crate::application::{retry_bounded, ApplicationError, GenerationSettings};
use crate::domain::chapter_prompt;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct ChapterWorkerConfig {
    /// 最大并发写作任务数（每个任务内部按章节顺序执行）
    pub max_concurrent: usize,
}

impl Default for ChapterWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 单个写作任务的执行器
#[derive(Clone)]
pub struct ChapterWriter {
    job_manager: Arc<dyn JobManagerPort>,
    novel_repo: Arc<dyn NovelRepositoryPort>,
    session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    llm: Arc<dyn LlmPort>,
    settings: GenerationSettings,
}

impl ChapterWriter {
    pub fn new(
        job_manager: Arc<dyn JobManagerPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        session_repo: Arc<dyn GenerationSessionRepositoryPort>,
        llm: Arc<dyn LlmPort>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            job_manager,
            novel_repo,
            session_repo,
            llm,
            settings,
        }
    }

    /// 处理单个任务
    ///
    /// 按章节号顺序写作，已有正文的章节跳过；每章写完立即落库并推进会话进度。
    /// 任务被取消（如小说被删除）时不再写入任何数据。
    ///
    /// 无论结果如何，处理结束后都会从任务管理器中移除该任务记录。
    pub async fn process_job(&self, job_id: &str) {
        self.run_job(job_id).await;
        self.job_manager.cleanup_job(job_id);
    }

    async fn run_job(&self, job_id: &str) {
        let job = match self.job_manager.get_job(job_id) {
            Some(j) => j,
            None => {
                tracing::warn!(job_id = %job_id, "Job not found, skipping");
                return;
            }
        };

        if self.job_manager.is_cancelled(job_id) {
            tracing::debug!(job_id = %job_id, "Job cancelled, skipping");
            return;
        }

        if let Err(e) = self.job_manager.set_state(job_id, JobState::Running) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to update job state");
            return;
        }

        let mut session = match self.session_repo.find_by_id(job.session_id).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                tracing::error!(job_id = %job_id, session_id = %job.session_id, "Session not found");
                let _ = self
                    .job_manager
                    .set_failed(job_id, "Session not found".to_string());
                return;
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Failed to load session");
                let _ = self.job_manager.set_failed(job_id, e.to_string());
                return;
            }
        };

        match self.write_chapters(job_id, &mut session).await {
            Ok(true) => {
                let _ = self.job_manager.set_state(job_id, JobState::Completed);
                tracing::info!(
                    job_id = %job_id,
                    novel_id = %job.novel_id,
                    chapters = session.total_steps,
                    "Chapter job completed"
                );
            }
            Ok(false) => {
                tracing::info!(job_id = %job_id, novel_id = %job.novel_id, "Chapter job cancelled");
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, novel_id = %job.novel_id, error = %e, "Chapter job failed");
                let _ = self.job_manager.set_failed(job_id, e.to_string());

                session.fail(e.to_string());
                if let Err(repo_err) = self.session_repo.save(&session).await {
                    tracing::warn!(error = %repo_err, "Failed to mark session as failed");
                }
                if let Err(repo_err) = self
                    .novel_repo
                    .update_status(job.novel_id, NovelStatus::Failed)
                    .await
                {
                    tracing::warn!(error = %repo_err, "Failed to mark novel as failed");
                }
            }
        }
    }

    /// 写完全部章节返回 Ok(true)，中途取消返回 Ok(false)
    async fn write_chapters(
        &self,
        job_id: &str,
        session: &mut GenerationSessionRecord,
    ) -> Result<bool, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(session.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", session.novel_id))?;
        let mut outline = novel
            .outline
            .clone()
            .ok_or_else(|| ApplicationError::invalid_state("Novel has no outline"))?;
        outline.chapters.sort_by_key(|c| c.chapter_number);

        let written: HashSet<u32> = self
            .novel_repo
            .find_chapters(novel.id)
            .await?
            .into_iter()
            .map(|c| c.chapter_number)
            .collect();

        session.start();
        self.session_repo.save(session).await?;

        let mut total_attempts = session.attempts;

        for chapter in &outline.chapters {
            if self.job_manager.is_cancelled(job_id) {
                return Ok(false);
            }
            if written.contains(&chapter.chapter_number) {
                tracing::debug!(chapter = chapter.chapter_number, "Chapter already written, skipping");
                continue;
            }

            let previous = chapter
                .chapter_number
                .checked_sub(1)
                .and_then(|n| outline.chapter(n));
            let prompt = chapter_prompt(&novel.parameters, &outline, chapter, previous);
            let settings = &self.settings;
            let llm = self.llm.as_ref();

            let (content, attempts) =
                retry_bounded(settings.outline_retry, "chapter", |_| {
                    let prompt = &prompt;
                    async move {
                        let mut request =
                            ChatRequest::from_prompt(prompt, settings.chapter_temperature);
                        if let Some(max_tokens) = settings.max_tokens {
                            request = request.with_max_tokens(max_tokens);
                        }
                        let response = llm.complete(request).await?;
                        let content = response.content.trim().to_string();
                        if content.is_empty() {
                            return Err(ApplicationError::ExternalServiceError(
                                "LLM returned an empty chapter".to_string(),
                            ));
                        }
                        Ok::<_, ApplicationError>(content)
                    }
                })
                .await?;

            // 写作期间小说可能已被删除
            if self.job_manager.is_cancelled(job_id) {
                return Ok(false);
            }

            let record = ChapterRecord::new(
                novel.id,
                chapter.chapter_number,
                chapter.chapter_name.clone(),
                content,
            );
            self.novel_repo.save_chapter(&record).await?;

            total_attempts += attempts;
            session.attempts = total_attempts;
            session.advance();
            self.session_repo.save(session).await?;

            tracing::info!(
                novel_id = %novel.id,
                chapter = chapter.chapter_number,
                words = record.word_count,
                progress = session.progress_percent(),
                "Chapter written"
            );
        }

        session.complete(total_attempts);
        self.session_repo.save(session).await?;
        self.novel_repo
            .update_status(novel.id, NovelStatus::Completed)
            .await?;

        Ok(true)
    }
}

/// 章节写作 Worker
///
/// 后台任务处理器，从队列消费 job_id 并执行写作
pub struct ChapterWorker {
    config: ChapterWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    writer: ChapterWriter,
}

impl ChapterWorker {
    pub fn new(
        config: ChapterWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        writer: ChapterWriter,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            writer,
        }
    }

    /// 启动 Worker
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "ChapterWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(job_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    continue;
                }
            };

            let writer = self.writer.clone();
            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                writer.process_job(&job_id).await;
            });
        }

        tracing::info!("ChapterWorker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ChapterJob, LlmError, NovelRecord, SessionKind, SessionStatus,
    };
    use crate::domain::outline::NovelOutline;
    use crate::domain::parameters::NovelParameters;
    use crate::infrastructure::testing::TestContext;
    use uuid::Uuid;

    struct Fixture {
        ctx: TestContext,
        writer: ChapterWriter,
        novel_id: Uuid,
        session_id: Uuid,
        job_id: String,
    }

    async fn fixture(chapters: u32) -> Fixture {
        let ctx = TestContext::new().await;
        let novel = NovelRecord::new(NovelParameters::sample());
        ctx.novel_repo.save(&novel).await.unwrap();
        ctx.novel_repo
            .save_outline(novel.id, &NovelOutline::sample(chapters), NovelStatus::Writing)
            .await
            .unwrap();

        let session = GenerationSessionRecord::new(novel.id, SessionKind::Chapters, chapters);
        ctx.session_repo.save(&session).await.unwrap();
        let job_id = ctx
            .job_manager
            .submit(ChapterJob::new(novel.id, session.id))
            .unwrap();

        let writer = ChapterWriter::new(
            ctx.job_manager.clone(),
            ctx.novel_repo.clone(),
            ctx.session_repo.clone(),
            ctx.llm.clone(),
            GenerationSettings::default(),
        );

        Fixture {
            novel_id: novel.id,
            session_id: session.id,
            job_id,
            writer,
            ctx,
        }
    }

    #[tokio::test]
    async fn test_writes_all_chapters_in_order() {
        let f = fixture(3).await;
        for n in 1..=3 {
            f.ctx.fake_llm.push_response(format!("Prose for chapter {}.", n));
        }

        f.writer.process_job(&f.job_id).await;

        let chapters = f.ctx.novel_repo.find_chapters(f.novel_id).await.unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].content, "Prose for chapter 1.");
        assert_eq!(chapters[2].chapter_number, 3);

        let session = f.ctx.session_repo.find_by_id(f.session_id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.progress_percent(), 100);

        let novel = f.ctx.novel_repo.find_by_id(f.novel_id).await.unwrap().unwrap();
        assert_eq!(novel.status, NovelStatus::Completed);
        // 任务结束后记录被清理
        assert!(f.ctx.job_manager.get_job(&f.job_id).is_none());
        assert!(f.ctx.job_manager.active_job(f.novel_id).is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_written_chapters() {
        let f = fixture(3).await;
        f.ctx.fake_llm.push_response("First chapter.");
        for _ in 0..3 {
            f.ctx.fake_llm.push_error(LlmError::ServiceError("down".to_string()));
        }

        f.writer.process_job(&f.job_id).await;

        let chapters = f.ctx.novel_repo.find_chapters(f.novel_id).await.unwrap();
        assert_eq!(chapters.len(), 1);

        let session = f.ctx.session_repo.find_by_id(f.session_id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Failed);
        assert_eq!(session.completed_steps, 1);

        let novel = f.ctx.novel_repo.find_by_id(f.novel_id).await.unwrap().unwrap();
        assert_eq!(novel.status, NovelStatus::Failed);
        assert!(f.ctx.job_manager.get_job(&f.job_id).is_none());
        assert!(f.ctx.job_manager.active_job(f.novel_id).is_none());
    }

    #[tokio::test]
    async fn test_rerun_skips_written_chapters() {
        let f = fixture(3).await;
        f.ctx
            .novel_repo
            .save_chapter(&ChapterRecord::new(
                f.novel_id,
                1,
                "Chapter 1".to_string(),
                "Already here.".to_string(),
            ))
            .await
            .unwrap();
        f.ctx.fake_llm.push_response("Second.");
        f.ctx.fake_llm.push_response("Third.");

        f.writer.process_job(&f.job_id).await;

        assert_eq!(f.ctx.fake_llm.completion_calls(), 2);
        let chapters = f.ctx.novel_repo.find_chapters(f.novel_id).await.unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].content, "Already here.");
    }

    #[tokio::test]
    async fn test_cancelled_job_writes_nothing() {
        let f = fixture(2).await;
        f.ctx.job_manager.cancel_novel(f.novel_id);

        f.writer.process_job(&f.job_id).await;

        assert_eq!(f.ctx.fake_llm.completion_calls(), 0);
        assert!(f.ctx.novel_repo.find_chapters(f.novel_id).await.unwrap().is_empty());
        assert!(f.ctx.job_manager.get_job(&f.job_id).is_none());
    }
}
