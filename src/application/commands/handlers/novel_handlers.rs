//! Novel Command Handlers

use std::sync::Arc;

use crate::application::commands::DeleteNovel;
use crate::application::error::ApplicationError;
use crate::application::ports::{JobManagerPort, NovelRepositoryPort};

// ============================================================================
// DeleteNovel
// ============================================================================

/// DeleteNovel Handler
pub struct DeleteNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    job_manager: Arc<dyn JobManagerPort>,
}

impl DeleteNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>, job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self {
            novel_repo,
            job_manager,
        }
    }

    pub async fn handle(&self, command: DeleteNovel) -> Result<(), ApplicationError> {
        let novel_id = command.novel_id;

        // 检查小说是否存在
        let novel = self
            .novel_repo
            .find_by_id(novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;

        // 先取消写作任务，worker 在下一章之前退出
        if self.job_manager.cancel_novel(novel_id) {
            tracing::info!(novel_id = %novel_id, "Cancelled active chapter job");
        }

        self.novel_repo.delete(novel_id).await?;

        tracing::info!(
            novel_id = %novel_id,
            title = %novel.title,
            "Novel deleted"
        );

        Ok(())
    }
}
