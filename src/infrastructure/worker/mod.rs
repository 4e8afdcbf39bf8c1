//! Worker Layer - Background Task Processing
//!
//! 实现 ChapterWorker，处理章节写作任务

mod chapter_worker;

pub use chapter_worker::{ChapterWorker, ChapterWorkerConfig, ChapterWriter};
