//! Outline Context - Entities

use serde::{Deserialize, Serialize};

use crate::domain::weighting::StoryDimensions;

/// 情节位置阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotPhase {
    /// 铺垫
    Setup,
    /// 上升
    Rising,
    /// 高潮
    Climax,
    /// 收束
    Resolution,
}

impl PlotPhase {
    /// 根据章节在全书中的相对位置 [0, 1) 判定阶段
    pub fn for_position(position: f64) -> Self {
        if position < 0.25 {
            PlotPhase::Setup
        } else if position < 0.75 {
            PlotPhase::Rising
        } else if position < 0.9 {
            PlotPhase::Climax
        } else {
            PlotPhase::Resolution
        }
    }

    /// 第 `number` 章（从 1 开始）在 `count` 章中的阶段
    pub fn for_chapter(number: u32, count: u32) -> Self {
        let count = count.max(1);
        let index = number.saturating_sub(1).min(count - 1);
        Self::for_position(f64::from(index) / f64::from(count))
    }

    /// 节奏乘数
    pub fn pacing_multiplier(&self) -> f64 {
        match self {
            PlotPhase::Setup => 0.8,
            PlotPhase::Rising => 1.0,
            PlotPhase::Climax => 1.3,
            PlotPhase::Resolution => 0.7,
        }
    }

    /// 字数权重
    pub fn word_weight(&self) -> f64 {
        match self {
            PlotPhase::Setup => 0.9,
            PlotPhase::Rising => 1.0,
            PlotPhase::Climax => 1.15,
            PlotPhase::Resolution => 0.8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlotPhase::Setup => "setup",
            PlotPhase::Rising => "rising",
            PlotPhase::Climax => "climax",
            PlotPhase::Resolution => "resolution",
        }
    }
}

/// 章节节奏指引
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacingGuidance {
    pub phase: PlotPhase,
    /// 节奏强度 [0, 2.5]
    pub intensity: f64,
    pub description: String,
}

/// 场景
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// 角色弧光概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterArc {
    pub name: String,
    #[serde(default)]
    pub arc: String,
}

/// 大纲中的一章
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelChapter {
    pub chapter_number: u32,
    pub chapter_name: String,
    pub summary: String,
    #[serde(default)]
    pub target_word_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing_guidance: Option<PacingGuidance>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub key_plot_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guidance_notes: Vec<String>,
}

/// 小说大纲
///
/// 由 LLM 生成，经 `apply_dimensional_guidance` 原地整形后以 JSON 持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelOutline {
    pub title: String,
    pub description: String,
    pub chapters: Vec<NovelChapter>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_building: Option<String>,
    #[serde(default)]
    pub character_arcs: Vec<CharacterArc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<StoryDimensions>,
}

impl NovelOutline {
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter(&self, number: u32) -> Option<&NovelChapter> {
        self.chapters.iter().find(|c| c.chapter_number == number)
    }

    /// 各章目标字数之和
    pub fn total_word_goal(&self) -> u64 {
        self.chapters
            .iter()
            .map(|c| u64::from(c.target_word_count))
            .sum()
    }
}

#[cfg(test)]
impl NovelOutline {
    /// 测试用大纲
    pub(crate) fn sample(chapter_count: u32) -> Self {
        Self {
            title: "The Glass Meridian".to_string(),
            description: "A cartographer maps a city that rearranges itself.".to_string(),
            chapters: (1..=chapter_count)
                .map(|n| NovelChapter {
                    chapter_number: n,
                    chapter_name: format!("Chapter {}", n),
                    summary: format!("Events of chapter {}", n),
                    target_word_count: 0,
                    pacing_guidance: None,
                    scenes: vec![Scene {
                        name: format!("Scene {}", n),
                        description: String::new(),
                    }],
                    key_plot_points: vec![format!("Turning point {}", n)],
                    guidance_notes: Vec::new(),
                })
                .collect(),
            themes: vec!["memory".to_string()],
            world_building: None,
            character_arcs: Vec::new(),
            dimensions: None,
        }
    }
}
