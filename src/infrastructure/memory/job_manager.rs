//! In-Memory Job Manager Implementation

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::ports::{ChapterJob, JobError, JobManagerPort, JobState};

/// 内存任务管理器
pub struct InMemoryJobManager {
    /// job_id -> ChapterJob
    jobs: DashMap<String, ChapterJob>,
    /// novel_id -> 最近一次提交的 job_id
    novel_jobs: DashMap<Uuid, String>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryJobManager {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            jobs: DashMap::new(),
            novel_jobs: DashMap::new(),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 当前保留的任务记录数
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    fn is_active(&self, job_id: &str) -> bool {
        self.jobs
            .get(job_id)
            .map(|j| j.state.is_active())
            .unwrap_or(false)
    }
}

impl JobManagerPort for InMemoryJobManager {
    fn submit(&self, job: ChapterJob) -> Result<String, JobError> {
        let job_id = job.job_id.clone();
        let novel_id = job.novel_id;

        // 同一小说只允许一个活跃任务
        match self.novel_jobs.entry(novel_id) {
            Entry::Occupied(mut entry) => {
                if self.is_active(entry.get()) {
                    return Err(JobError::AlreadyRunning(novel_id));
                }
                entry.insert(job_id.clone());
            }
            Entry::Vacant(entry) => {
                entry.insert(job_id.clone());
            }
        }

        self.jobs.insert(job_id.clone(), job);

        if let Err(e) = self.queue_sender.try_send(job_id.clone()) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to enqueue job");
            self.jobs.remove(&job_id);
            self.novel_jobs.remove_if(&novel_id, |_, id| id == &job_id);
            return Err(JobError::QueueUnavailable(e.to_string()));
        }

        tracing::debug!(job_id = %job_id, novel_id = %novel_id, "Job submitted");
        Ok(job_id)
    }

    fn get_job(&self, job_id: &str) -> Option<ChapterJob> {
        self.jobs.get(job_id).map(|j| j.clone())
    }

    fn set_state(&self, job_id: &str, state: JobState) -> Result<(), JobError> {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        let old_state = job.state;
        job.state = state;

        if !state.is_active() {
            job.completed_at = Some(Utc::now());
        }

        tracing::debug!(
            job_id = %job_id,
            old_state = ?old_state,
            new_state = ?state,
            "Job state changed"
        );
        Ok(())
    }

    fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError> {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        job.state = JobState::Failed;
        job.error_message = Some(error);
        job.completed_at = Some(Utc::now());
        Ok(())
    }

    fn is_cancelled(&self, job_id: &str) -> bool {
        self.jobs
            .get(job_id)
            .map(|j| j.state == JobState::Cancelled)
            .unwrap_or(true) // 不存在的任务视为已取消
    }

    fn cancel_novel(&self, novel_id: Uuid) -> bool {
        let Some(job_id) = self.novel_jobs.get(&novel_id).map(|id| id.clone()) else {
            return false;
        };

        let cancelled = match self.jobs.get_mut(&job_id) {
            Some(mut job) if job.state.is_active() => {
                job.state = JobState::Cancelled;
                job.completed_at = Some(Utc::now());
                true
            }
            _ => false,
        };

        tracing::debug!(
            novel_id = %novel_id,
            job_id = %job_id,
            cancelled = cancelled,
            "Cancel requested"
        );
        cancelled
    }

    fn active_job(&self, novel_id: Uuid) -> Option<ChapterJob> {
        let job_id = self.novel_jobs.get(&novel_id).map(|id| id.clone())?;
        self.jobs
            .get(&job_id)
            .filter(|j| j.state.is_active())
            .map(|j| j.clone())
    }

    fn cleanup_job(&self, job_id: &str) {
        if let Some((_, job)) = self.jobs.remove(job_id) {
            // 只移除指向本任务的映射，同一小说的新任务保持不变
            self.novel_jobs.remove_if(&job.novel_id, |_, id| id == job_id);
            tracing::debug!(job_id = %job_id, novel_id = %job.novel_id, "Job cleaned up");
        }
    }
}
