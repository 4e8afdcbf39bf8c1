//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod http;
pub mod memory;
pub mod persistence;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use memory::InMemoryJobManager;
pub use worker::{ChapterWorker, ChapterWorkerConfig, ChapterWriter};
