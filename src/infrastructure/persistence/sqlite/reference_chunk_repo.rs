//! SQLite Reference Chunk Repository
//!
//! 嵌入向量以 JSON 存储，匹配时按维度筛选后在进程内计算余弦相似度

use async_trait::async_trait;
use sqlx::FromRow;

use super::database::{db_error, parse_timestamp, parse_uuid};
use super::DbPool;
use crate::application::ports::{
    cosine_similarity, ChunkMatch, ReferenceChunkRecord, ReferenceChunkRepositoryPort,
    RepositoryError,
};

/// SQLite Reference Chunk Repository
pub struct SqliteReferenceChunkRepository {
    pool: DbPool,
}

impl SqliteReferenceChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChunkRow {
    id: String,
    source: String,
    content: String,
    embedding: String,
    created_at: String,
}

impl TryFrom<ChunkRow> for ReferenceChunkRecord {
    type Error = RepositoryError;

    fn try_from(row: ChunkRow) -> Result<Self, Self::Error> {
        Ok(ReferenceChunkRecord {
            id: parse_uuid(&row.id)?,
            source: row.source,
            content: row.content,
            embedding: serde_json::from_str(&row.embedding)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl ReferenceChunkRepositoryPort for SqliteReferenceChunkRepository {
    async fn save(&self, chunk: &ReferenceChunkRecord) -> Result<(), RepositoryError> {
        let embedding = serde_json::to_string(&chunk.embedding)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO reference_chunks (id, source, content, embedding, dimensions, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chunk.id.to_string())
        .bind(&chunk.source)
        .bind(&chunk.content)
        .bind(embedding)
        .bind(chunk.embedding.len() as i64)
        .bind(chunk.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(chunk.id.to_string())
            }
            other => db_error(other),
        })?;

        Ok(())
    }

    async fn match_chunks(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<ChunkMatch>, RepositoryError> {
        if embedding.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<ChunkRow> = sqlx::query_as(
            "SELECT id, source, content, embedding, created_at FROM reference_chunks WHERE dimensions = ?",
        )
        .bind(embedding.len() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut matches = Vec::new();
        for row in rows {
            let chunk = ReferenceChunkRecord::try_from(row)?;
            let similarity = cosine_similarity(embedding, &chunk.embedding);
            if similarity >= threshold {
                matches.push(ChunkMatch {
                    id: chunk.id,
                    source: chunk.source,
                    content: chunk.content,
                    similarity,
                });
            }
        }

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reference_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};
    use chrono::Utc;
    use uuid::Uuid;

    async fn repo() -> SqliteReferenceChunkRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteReferenceChunkRepository::new(pool)
    }

    fn chunk(content: &str, embedding: Vec<f32>) -> ReferenceChunkRecord {
        ReferenceChunkRecord {
            id: Uuid::new_v4(),
            source: "test".to_string(),
            content: content.to_string(),
            embedding,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_match_orders_by_similarity_and_filters() {
        let repo = repo().await;
        repo.save(&chunk("exact", vec![1.0, 0.0, 0.0])).await.unwrap();
        repo.save(&chunk("close", vec![0.9, 0.1, 0.0])).await.unwrap();
        repo.save(&chunk("orthogonal", vec![0.0, 1.0, 0.0])).await.unwrap();
        repo.save(&chunk("other dims", vec![1.0, 0.0])).await.unwrap();

        let matches = repo.match_chunks(&[1.0, 0.0, 0.0], 0.5, 10).await.unwrap();
        let names: Vec<&str> = matches.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(names, vec!["exact", "close"]);
        assert!(matches[0].similarity >= matches[1].similarity);

        let limited = repo.match_chunks(&[1.0, 0.0, 0.0], 0.0, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = repo().await;
        let c = chunk("a", vec![1.0]);
        repo.save(&c).await.unwrap();
        assert!(matches!(
            repo.save(&c).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }
}
