//! Novel Commands

use uuid::Uuid;

/// 删除小说命令
#[derive(Debug, Clone)]
pub struct DeleteNovel {
    pub novel_id: Uuid,
}
