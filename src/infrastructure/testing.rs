//! 测试装配：内存 SQLite + Fake LLM + 内存任务管理器

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::ports::{
    GenerationSessionRepositoryPort, JobManagerPort, LlmPort, NovelRepositoryPort,
    ReferenceChunkRepositoryPort,
};
use crate::application::GenerationSettings;
use crate::infrastructure::adapters::{synthetic_outline_json, FakeLlmClient};
use crate::infrastructure::http::AppState;
use crate::infrastructure::memory::InMemoryJobManager;
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, DbPool, SqliteNovelRepository,
    SqliteReferenceChunkRepository, SqliteSessionRepository,
};

pub(crate) struct TestContext {
    pub pool: DbPool,
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub session_repo: Arc<dyn GenerationSessionRepositoryPort>,
    pub reference_repo: Arc<dyn ReferenceChunkRepositoryPort>,
    pub job_manager: Arc<dyn JobManagerPort>,
    pub fake_llm: Arc<FakeLlmClient>,
    pub llm: Arc<dyn LlmPort>,
    /// 保持队列接收端存活，否则提交任务会失败
    pub queue_receiver: mpsc::Receiver<String>,
}

impl TestContext {
    pub async fn new() -> Self {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let (tx, rx) = mpsc::channel(16);
        let fake_llm = Arc::new(FakeLlmClient::scripted());

        Self {
            novel_repo: Arc::new(SqliteNovelRepository::new(pool.clone())),
            session_repo: Arc::new(SqliteSessionRepository::new(pool.clone())),
            reference_repo: Arc::new(SqliteReferenceChunkRepository::new(pool.clone())),
            job_manager: InMemoryJobManager::new(tx).arc(),
            llm: fake_llm.clone(),
            fake_llm,
            queue_receiver: rx,
            pool,
        }
    }

    /// 以默认生成参数组装 HTTP 层状态
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(
            self.novel_repo.clone(),
            self.session_repo.clone(),
            self.reference_repo.clone(),
            self.job_manager.clone(),
            self.llm.clone(),
            GenerationSettings::default(),
        ))
    }
}

/// 含 `chapters` 章的合法大纲 JSON
pub(crate) fn outline_json(chapters: u32) -> String {
    synthetic_outline_json("The Glass Meridian", chapters)
}
