//! Outline Commands

use uuid::Uuid;

use crate::domain::parameters::NovelParameters;

/// 生成大纲命令
#[derive(Debug, Clone)]
pub struct GenerateOutline {
    pub parameters: NovelParameters,
}

/// 精修大纲命令
#[derive(Debug, Clone)]
pub struct RefineOutline {
    pub novel_id: Uuid,
    /// 修改意见，可为空
    pub instructions: String,
}
