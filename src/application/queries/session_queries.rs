//! Generation Session Queries

use uuid::Uuid;

/// 获取生成会话进度查询
#[derive(Debug, Clone)]
pub struct GetGenerationSession {
    pub session_id: Uuid,
}
