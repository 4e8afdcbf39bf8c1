//! SQLite Novel Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{db_error, parse_timestamp, parse_uuid};
use super::DbPool;
use crate::application::ports::{
    ChapterRecord, NovelRecord, NovelRepositoryPort, NovelStatus, RepositoryError,
};
use crate::domain::outline::NovelOutline;
use crate::domain::parameters::NovelParameters;

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NovelRow {
    id: String,
    title: String,
    parameters: String,
    outline: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        let parameters: NovelParameters = serde_json::from_str(&row.parameters)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let outline: Option<NovelOutline> = row
            .outline
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(NovelRecord {
            id: parse_uuid(&row.id)?,
            title: row.title,
            parameters,
            outline,
            status: NovelStatus::from_str(&row.status).unwrap_or_default(),
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    novel_id: String,
    chapter_number: i64,
    title: String,
    content: String,
    word_count: i64,
    created_at: String,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: parse_uuid(&row.id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            chapter_number: row.chapter_number as u32,
            title: row.title,
            content: row.content,
            word_count: row.word_count as u32,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

const NOVEL_COLUMNS: &str = "id, title, parameters, outline, status, created_at, updated_at";

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        let parameters = to_json(&novel.parameters)?;
        let outline = novel.outline.as_ref().map(to_json).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO novels (id, title, parameters, outline, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                parameters = excluded.parameters,
                outline = excluded.outline,
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(novel.id.to_string())
        .bind(&novel.title)
        .bind(parameters)
        .bind(outline)
        .bind(novel.status.as_str())
        .bind(novel.created_at.to_rfc3339())
        .bind(novel.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> =
            sqlx::query_as(&format!("SELECT {} FROM novels WHERE id = ?", NOVEL_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels ORDER BY created_at DESC",
            NOVEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        // 使用事务确保原子性
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM chapters WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("DELETE FROM generation_sessions WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("DELETE FROM novels WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: NovelStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE novels SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_outline(
        &self,
        id: Uuid,
        outline: &NovelOutline,
        status: NovelStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE novels SET outline = ?, status = ?, updated_at = ? WHERE id = ?")
                .bind(to_json(outline)?)
                .bind(status.as_str())
                .bind(Utc::now().to_rfc3339())
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_chapter(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, novel_id, chapter_number, title, content, word_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(novel_id, chapter_number) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                word_count = excluded.word_count
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.novel_id.to_string())
        .bind(i64::from(chapter.chapter_number))
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(i64::from(chapter.word_count))
        .bind(chapter.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_chapters(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(
            "SELECT id, novel_id, chapter_number, title, content, word_count, created_at FROM chapters WHERE novel_id = ? ORDER BY chapter_number",
        )
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteNovelRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteNovelRepository::new(pool)
    }

    #[tokio::test]
    async fn test_save_and_find_round_trips_json_columns() {
        let repo = repo().await;
        let novel = NovelRecord::new(NovelParameters::sample());
        repo.save(&novel).await.unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.title, "The Glass Meridian");
        assert_eq!(found.parameters, novel.parameters);
        assert!(found.outline.is_none());
        assert_eq!(found.status, NovelStatus::Draft);
    }

    #[tokio::test]
    async fn test_save_outline_updates_status() {
        let repo = repo().await;
        let novel = NovelRecord::new(NovelParameters::sample());
        repo.save(&novel).await.unwrap();

        let outline = NovelOutline::sample(5);
        repo.save_outline(novel.id, &outline, NovelStatus::OutlineReady)
            .await
            .unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.status, NovelStatus::OutlineReady);
        assert_eq!(found.outline, Some(outline));
    }

    #[tokio::test]
    async fn test_outline_dimensions_survive_storage_exactly() {
        use crate::domain::outline::apply_dimensional_guidance;
        use crate::domain::weighting::calculate_dimensions;

        let repo = repo().await;
        let params = NovelParameters::sample();
        let novel = NovelRecord::new(params.clone());
        repo.save(&novel).await.unwrap();

        let mut dimensions = calculate_dimensions(&params);
        // 十进制无法精确表示的取值
        dimensions.emotional_depth = 1.8200000000000003;
        dimensions.detail = 0.1 + 0.2;
        let mut outline = NovelOutline::sample(4);
        apply_dimensional_guidance(&mut outline, &dimensions, &params);
        assert!(outline.dimensions.is_some());

        repo.save_outline(novel.id, &outline, NovelStatus::OutlineReady)
            .await
            .unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        let stored = found.outline.unwrap();
        assert_eq!(stored.dimensions, Some(dimensions));
        assert_eq!(stored, outline);
    }

    #[tokio::test]
    async fn test_update_missing_novel_is_not_found() {
        let repo = repo().await;
        let err = repo
            .update_status(Uuid::new_v4(), NovelStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_chapters_upsert_and_order() {
        let repo = repo().await;
        let novel = NovelRecord::new(NovelParameters::sample());
        repo.save(&novel).await.unwrap();

        for n in [3, 1, 2] {
            repo.save_chapter(&ChapterRecord::new(
                novel.id,
                n,
                format!("Chapter {}", n),
                "draft text".to_string(),
            ))
            .await
            .unwrap();
        }
        repo.save_chapter(&ChapterRecord::new(
            novel.id,
            2,
            "Chapter 2".to_string(),
            "rewritten chapter two text".to_string(),
        ))
        .await
        .unwrap();

        let chapters = repo.find_chapters(novel.id).await.unwrap();
        let numbers: Vec<u32> = chapters.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(chapters[1].content, "rewritten chapter two text");
        assert_eq!(chapters[1].word_count, 4);
    }

    #[tokio::test]
    async fn test_delete_removes_chapters() {
        let repo = repo().await;
        let novel = NovelRecord::new(NovelParameters::sample());
        repo.save(&novel).await.unwrap();
        repo.save_chapter(&ChapterRecord::new(
            novel.id,
            1,
            "One".to_string(),
            "text".to_string(),
        ))
        .await
        .unwrap();

        repo.delete(novel.id).await.unwrap();

        assert!(repo.find_by_id(novel.id).await.unwrap().is_none());
        assert!(repo.find_chapters(novel.id).await.unwrap().is_empty());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
