//! Job Manager Port - 章节生成任务管理
//!
//! 定义后台任务管理的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Job Manager 错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Novel already has an active job: {0}")]
    AlreadyRunning(Uuid),

    #[error("Job queue unavailable: {0}")]
    QueueUnavailable(String),
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// 排队中
    Pending,
    /// 执行中
    Running,
    /// 已完成
    Completed,
    /// 失败
    Failed,
    /// 已取消
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    /// 仍占用小说（排队或执行中）
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Pending | JobState::Running)
    }
}

/// 章节生成任务
#[derive(Debug, Clone)]
pub struct ChapterJob {
    pub job_id: String,
    pub novel_id: Uuid,
    pub session_id: Uuid,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl ChapterJob {
    pub fn new(novel_id: Uuid, session_id: Uuid) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            novel_id,
            session_id,
            state: JobState::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }
}

/// Job Manager Port
///
/// 管理章节生成任务的生命周期，所有状态存储在内存中；
/// 同一本小说同时只允许一个活跃任务
pub trait JobManagerPort: Send + Sync {
    /// 提交任务到队列，返回任务 ID
    fn submit(&self, job: ChapterJob) -> Result<String, JobError>;

    /// 获取任务
    fn get_job(&self, job_id: &str) -> Option<ChapterJob>;

    /// 设置任务状态
    fn set_state(&self, job_id: &str, state: JobState) -> Result<(), JobError>;

    /// 设置任务失败并记录错误
    fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError>;

    /// 检查任务是否已取消
    fn is_cancelled(&self, job_id: &str) -> bool;

    /// 取消小说的活跃任务，返回是否有任务被取消
    fn cancel_novel(&self, novel_id: Uuid) -> bool;

    /// 获取小说的活跃任务
    fn active_job(&self, novel_id: Uuid) -> Option<ChapterJob>;

    /// 移除已结束的任务记录（由 Worker 在任务处理完毕后调用）
    fn cleanup_job(&self, job_id: &str);
}
