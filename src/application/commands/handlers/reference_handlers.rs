//! Reference Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::IngestReferenceChunk;
use crate::application::error::ApplicationError;
use crate::application::ports::{LlmPort, ReferenceChunkRecord, ReferenceChunkRepositoryPort};

/// 导入响应
#[derive(Debug, Clone)]
pub struct IngestReferenceResponse {
    pub id: Uuid,
    /// 嵌入向量维度
    pub embedding_dimensions: usize,
}

/// IngestReferenceChunk Handler - 计算嵌入并入库
pub struct IngestReferenceChunkHandler {
    reference_repo: Arc<dyn ReferenceChunkRepositoryPort>,
    llm: Arc<dyn LlmPort>,
}

impl IngestReferenceChunkHandler {
    pub fn new(reference_repo: Arc<dyn ReferenceChunkRepositoryPort>, llm: Arc<dyn LlmPort>) -> Self {
        Self { reference_repo, llm }
    }

    pub async fn handle(
        &self,
        command: IngestReferenceChunk,
    ) -> Result<IngestReferenceResponse, ApplicationError> {
        let content = command.content.trim();
        if content.is_empty() {
            return Err(ApplicationError::validation("Reference content is empty"));
        }

        let embedding = self.llm.embed(content).await?;
        if embedding.is_empty() {
            return Err(ApplicationError::ExternalServiceError(
                "Embedding service returned an empty vector".to_string(),
            ));
        }

        let chunk = ReferenceChunkRecord {
            id: Uuid::new_v4(),
            source: command.source.trim().to_string(),
            content: content.to_string(),
            embedding,
            created_at: Utc::now(),
        };
        self.reference_repo.save(&chunk).await?;

        tracing::info!(
            chunk_id = %chunk.id,
            source = %chunk.source,
            chars = chunk.content.chars().count(),
            "Reference chunk ingested"
        );

        Ok(IngestReferenceResponse {
            id: chunk.id,
            embedding_dimensions: chunk.embedding.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::TestContext;

    #[tokio::test]
    async fn test_ingest_then_match() {
        let ctx = TestContext::new().await;
        let handler = IngestReferenceChunkHandler::new(ctx.reference_repo.clone(), ctx.llm.clone());

        let response = handler
            .handle(IngestReferenceChunk {
                source: "Field notes".to_string(),
                content: "The harbour fog rolled over the old lighthouse.".to_string(),
            })
            .await
            .unwrap();
        assert!(response.embedding_dimensions > 0);
        assert_eq!(ctx.reference_repo.count().await.unwrap(), 1);

        let query = ctx
            .llm
            .embed("The harbour fog rolled over the old lighthouse.")
            .await
            .unwrap();
        let matches = ctx.reference_repo.match_chunks(&query, 0.99, 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, response.id);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let ctx = TestContext::new().await;
        let handler = IngestReferenceChunkHandler::new(ctx.reference_repo.clone(), ctx.llm.clone());

        let err = handler
            .handle(IngestReferenceChunk {
                source: "x".to_string(),
                content: "  \n ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
