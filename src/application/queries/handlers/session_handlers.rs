//! Generation Session Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{GenerationSessionRecord, GenerationSessionRepositoryPort};
use crate::application::queries::GetGenerationSession;

/// 生成会话响应
#[derive(Debug, Clone)]
pub struct SessionResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub kind: String,
    pub status: String,
    pub total_steps: u32,
    pub completed_steps: u32,
    pub progress_percent: u32,
    pub attempts: u32,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GenerationSessionRecord> for SessionResponse {
    fn from(record: GenerationSessionRecord) -> Self {
        Self {
            progress_percent: record.progress_percent(),
            id: record.id,
            novel_id: record.novel_id,
            kind: record.kind.as_str().to_string(),
            status: record.status.as_str().to_string(),
            total_steps: record.total_steps,
            completed_steps: record.completed_steps,
            attempts: record.attempts,
            error_message: record.error_message,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// GetGenerationSession Handler
pub struct GetGenerationSessionHandler {
    session_repo: Arc<dyn GenerationSessionRepositoryPort>,
}

impl GetGenerationSessionHandler {
    pub fn new(session_repo: Arc<dyn GenerationSessionRepositoryPort>) -> Self {
        Self { session_repo }
    }

    pub async fn handle(&self, query: GetGenerationSession) -> Result<SessionResponse, ApplicationError> {
        let session = self
            .session_repo
            .find_by_id(query.session_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("GenerationSession", query.session_id))?;

        Ok(SessionResponse::from(session))
    }
}
