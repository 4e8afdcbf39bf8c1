//! Chapter Commands

use uuid::Uuid;

/// 生成章节正文命令（后台执行）
#[derive(Debug, Clone)]
pub struct GenerateChapters {
    pub novel_id: Uuid,
}
