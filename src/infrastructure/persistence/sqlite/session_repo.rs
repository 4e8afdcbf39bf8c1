//! SQLite Generation Session Repository

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{db_error, parse_timestamp, parse_uuid};
use super::DbPool;
use crate::application::ports::{
    GenerationSessionRecord, GenerationSessionRepositoryPort, RepositoryError, SessionKind,
    SessionStatus,
};

/// SQLite Generation Session Repository
pub struct SqliteSessionRepository {
    pool: DbPool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: String,
    novel_id: String,
    kind: String,
    status: String,
    total_steps: i64,
    completed_steps: i64,
    attempts: i64,
    error_message: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SessionRow> for GenerationSessionRecord {
    type Error = RepositoryError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let kind = SessionKind::from_str(&row.kind).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown session kind: {}", row.kind))
        })?;

        Ok(GenerationSessionRecord {
            id: parse_uuid(&row.id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            kind,
            status: SessionStatus::from_str(&row.status).unwrap_or_default(),
            total_steps: row.total_steps as u32,
            completed_steps: row.completed_steps as u32,
            attempts: row.attempts as u32,
            error_message: row.error_message,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

const SESSION_COLUMNS: &str = "id, novel_id, kind, status, total_steps, completed_steps, attempts, error_message, created_at, updated_at";

#[async_trait]
impl GenerationSessionRepositoryPort for SqliteSessionRepository {
    async fn save(&self, session: &GenerationSessionRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO generation_sessions (id, novel_id, kind, status, total_steps, completed_steps, attempts, error_message, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                total_steps = excluded.total_steps,
                completed_steps = excluded.completed_steps,
                attempts = excluded.attempts,
                error_message = excluded.error_message,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.novel_id.to_string())
        .bind(session.kind.as_str())
        .bind(session.status.as_str())
        .bind(i64::from(session.total_steps))
        .bind(i64::from(session.completed_steps))
        .bind(i64::from(session.attempts))
        .bind(&session.error_message)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<GenerationSessionRecord>, RepositoryError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM generation_sessions WHERE id = ?",
            SESSION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(GenerationSessionRecord::try_from).transpose()
    }

    async fn find_by_novel(
        &self,
        novel_id: Uuid,
    ) -> Result<Vec<GenerationSessionRecord>, RepositoryError> {
        // rowid 作为同一时间戳下的次序
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM generation_sessions WHERE novel_id = ? ORDER BY created_at DESC, rowid DESC",
            SESSION_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(GenerationSessionRecord::try_from).collect()
    }
}
