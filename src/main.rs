//! Narrately - 参数驱动的长篇小说生成服务
//!
//! - Domain: parameters/, weighting/, outline/, prompt
//! - Application: commands, queries, ports
//! - Infrastructure: http, memory, worker, persistence, adapters

use std::sync::Arc;

use narrately::application::LlmPort;
use narrately::config::{load_config, print_config, AppConfig, LlmProvider};
use narrately::infrastructure::adapters::{FakeLlmClient, HttpLlmClient, HttpLlmClientConfig};
use narrately::infrastructure::http::{AppState, HttpServer, ServerConfig};
use narrately::infrastructure::memory::InMemoryJobManager;
use narrately::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteNovelRepository,
    SqliteReferenceChunkRepository, SqliteSessionRepository,
};
use narrately::infrastructure::worker::{ChapterWorker, ChapterWorkerConfig, ChapterWriter};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志，RUST_LOG 优先
    let log_filter = format!(
        "{},narrately={},tower_http=debug,sqlx=warn",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Narrately - novel generation service");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig::new(&config.database.path)
        .with_max_connections(config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let reference_repo = Arc::new(SqliteReferenceChunkRepository::new(pool.clone()));

    let llm = build_llm(&config)?;
    if !llm.health_check().await {
        tracing::warn!("LLM service is not reachable yet, generation requests will fail until it is");
    }

    let settings = config.generation.settings();

    // 创建任务队列与内存任务管理器
    let (job_tx, job_rx) = mpsc::channel(config.generation.queue_size);
    let job_manager = InMemoryJobManager::new(job_tx).arc();

    // 启动章节写作 Worker
    let writer = ChapterWriter::new(
        job_manager.clone(),
        novel_repo.clone(),
        session_repo.clone(),
        llm.clone(),
        settings.clone(),
    );
    let worker = ChapterWorker::new(
        ChapterWorkerConfig {
            max_concurrent: config.generation.max_concurrent_jobs,
        },
        job_rx,
        writer,
    );
    tokio::spawn(worker.run());

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        novel_repo,
        session_repo,
        reference_repo,
        job_manager,
        llm,
        settings,
    );

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 按配置创建 LLM 适配器
fn build_llm(config: &AppConfig) -> anyhow::Result<Arc<dyn LlmPort>> {
    match config.llm.provider {
        LlmProvider::Http => {
            let llm_config = HttpLlmClientConfig {
                base_url: config.llm.base_url.clone(),
                api_key: config.llm.api_key.clone(),
                model: config.llm.model.clone(),
                embedding_model: config.llm.embedding_model.clone(),
                timeout_secs: config.llm.timeout_secs,
            };
            Ok(Arc::new(HttpLlmClient::new(llm_config)?))
        }
        LlmProvider::Fake => {
            tracing::warn!("Using synthetic LLM responses");
            Ok(Arc::new(FakeLlmClient::synthetic()))
        }
    }
}
