//! Parameters Context - Aggregate Root

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{
    ChapterStructure, Character, ConflictType, NovelLength, ParameterError, PointOfView,
    ResolutionStyle, Slider,
};

/// 小说参数聚合根
///
/// 由设置向导一次性提交，提交后不可修改，以 JSON 原样持久化。
///
/// 不变量:
/// - 所有滑块在 [1, 5] 内（由 `Slider` 保证）
/// - 至少一个角色，角色名非空
/// - 冲突类型不重复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelParameters {
    pub title: String,
    #[serde(default)]
    pub story_description: String,
    pub genre: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub novel_length: NovelLength,
    #[serde(default)]
    pub point_of_view: PointOfView,
    #[serde(default)]
    pub setting_type: String,
    #[serde(default)]
    pub cultural_framework: String,
    #[serde(default)]
    pub chapter_structure: ChapterStructure,
    #[serde(default)]
    pub resolution_style: ResolutionStyle,

    // 世界观
    #[serde(default)]
    pub world_complexity: Slider,
    #[serde(default)]
    pub cultural_depth: Slider,
    #[serde(default)]
    pub cultural_conflict: Slider,

    // 语气与风格
    #[serde(default)]
    pub tone_formality: Slider,
    #[serde(default)]
    pub tone_descriptive: Slider,
    #[serde(default)]
    pub dialogue_balance: Slider,
    #[serde(default)]
    pub metaphor_frequency: Slider,
    #[serde(default)]
    pub description_density: Slider,

    // 节奏
    #[serde(default)]
    pub pacing_overall: Slider,
    #[serde(default)]
    pub pacing_variance: Slider,
    #[serde(default)]
    pub emotional_intensity: Slider,
    #[serde(default)]
    pub flashback_usage: Slider,
    #[serde(default)]
    pub foreshadowing_intensity: Slider,

    // 内容分级
    #[serde(default)]
    pub violence_level: Slider,
    #[serde(default)]
    pub adult_content_level: Slider,
    #[serde(default)]
    pub profanity_level: Slider,
    #[serde(default)]
    pub controversial_handling: Slider,

    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub conflict_types: Vec<ConflictType>,
}

impl NovelParameters {
    /// 校验向导提交的参数
    pub fn validate(&self) -> Result<(), ParameterError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ParameterError::InvalidTitle("标题不能为空".to_string()));
        }
        if title.chars().count() > 200 {
            return Err(ParameterError::InvalidTitle(
                "标题长度不能超过200字符".to_string(),
            ));
        }

        if self.characters.is_empty() {
            return Err(ParameterError::NoCharacters);
        }
        for character in &self.characters {
            if character.name.trim().is_empty() {
                return Err(ParameterError::InvalidCharacter(
                    "角色名不能为空".to_string(),
                ));
            }
        }

        let mut seen = HashSet::new();
        for conflict in &self.conflict_types {
            if !seen.insert(conflict) {
                return Err(ParameterError::DuplicateConflict(
                    conflict.label().to_string(),
                ));
            }
        }

        Ok(())
    }

    /// 有动态弧光的角色数
    pub fn dynamic_arc_count(&self) -> usize {
        self.characters
            .iter()
            .filter(|c| c.arc_type.is_dynamic())
            .count()
    }

    /// 主要角色数（主角 + 反派）
    pub fn principal_count(&self) -> usize {
        self.characters
            .iter()
            .filter(|c| c.role.is_principal())
            .count()
    }
}

#[cfg(test)]
impl NovelParameters {
    /// 测试用参数：全部滑块取中值
    pub(crate) fn sample() -> Self {
        use super::{ArcType, CharacterRole};

        Self {
            title: "The Glass Meridian".to_string(),
            story_description: "A cartographer maps a city that rearranges itself.".to_string(),
            genre: "Literary Fiction".to_string(),
            theme: "memory and place".to_string(),
            novel_length: NovelLength::From50kTo100k,
            point_of_view: PointOfView::ThirdLimited,
            setting_type: "contemporary city".to_string(),
            cultural_framework: "western".to_string(),
            chapter_structure: ChapterStructure::Linear,
            resolution_style: ResolutionStyle::Ambiguous,
            world_complexity: Slider::default(),
            cultural_depth: Slider::default(),
            cultural_conflict: Slider::default(),
            tone_formality: Slider::default(),
            tone_descriptive: Slider::default(),
            dialogue_balance: Slider::default(),
            metaphor_frequency: Slider::default(),
            description_density: Slider::default(),
            pacing_overall: Slider::default(),
            pacing_variance: Slider::default(),
            emotional_intensity: Slider::default(),
            flashback_usage: Slider::default(),
            foreshadowing_intensity: Slider::default(),
            violence_level: Slider::default(),
            adult_content_level: Slider::default(),
            profanity_level: Slider::default(),
            controversial_handling: Slider::default(),
            characters: vec![
                Character::new("Ines", CharacterRole::Protagonist, "seeker", ArcType::Growth),
                Character::new("Marrow", CharacterRole::Antagonist, "shadow", ArcType::Flat),
            ],
            conflict_types: vec![ConflictType::PersonVsSelf, ConflictType::PersonVsSociety],
        }
    }

    /// 测试用参数：所有滑块取同一值
    pub(crate) fn with_all_sliders(value: u8) -> Self {
        let s = Slider::new(value).unwrap();
        Self {
            world_complexity: s,
            cultural_depth: s,
            cultural_conflict: s,
            tone_formality: s,
            tone_descriptive: s,
            dialogue_balance: s,
            metaphor_frequency: s,
            description_density: s,
            pacing_overall: s,
            pacing_variance: s,
            emotional_intensity: s,
            flashback_usage: s,
            foreshadowing_intensity: s,
            violence_level: s,
            adult_content_level: s,
            profanity_level: s,
            controversial_handling: s,
            ..Self::sample()
        }
    }
}
