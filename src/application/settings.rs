//! 生成参数
//!
//! 由 config 层映射而来，命令处理器只依赖此结构

use crate::application::retry::RetryPolicy;

/// 生成相关的运行参数
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// 大纲生成与精修的重试策略
    pub outline_retry: RetryPolicy,
    /// 大纲采样温度
    pub outline_temperature: f32,
    /// 章节采样温度
    pub chapter_temperature: f32,
    /// 单次补全的 token 上限
    pub max_tokens: Option<u32>,
    /// 参考片段相似度阈值
    pub reference_match_threshold: f32,
    /// 参考片段数量上限，为 0 时不检索
    pub reference_match_count: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            outline_retry: RetryPolicy::default(),
            outline_temperature: 0.7,
            chapter_temperature: 0.8,
            max_tokens: None,
            reference_match_threshold: 0.75,
            reference_match_count: 3,
        }
    }
}
