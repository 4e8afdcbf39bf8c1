//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod novel_repo;
mod reference_chunk_repo;
mod session_repo;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use novel_repo::SqliteNovelRepository;
pub use reference_chunk_repo::SqliteReferenceChunkRepository;
pub use session_repo::SqliteSessionRepository;
