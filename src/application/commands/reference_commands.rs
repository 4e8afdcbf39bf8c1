//! Reference Commands

/// 导入参考片段命令
#[derive(Debug, Clone)]
pub struct IngestReferenceChunk {
    /// 来源说明（书名、作者等）
    pub source: String,
    pub content: String,
}
