//! Novel Queries

use uuid::Uuid;

/// 获取小说详情查询
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub novel_id: Uuid,
}

/// 列出所有小说查询
#[derive(Debug, Clone)]
pub struct ListNovels;

/// 获取已写章节查询
#[derive(Debug, Clone)]
pub struct GetChapters {
    pub novel_id: Uuid,
}
