//! Story Dimensions - 故事维度

use serde::{Deserialize, Serialize};

/// 单个维度上限
pub const MAX_DIMENSION_VALUE: f64 = 2.5;

/// 全部维度之和上限，超过时按比例缩放
pub const MAX_DIMENSION_TOTAL: f64 = 25.0;

/// 浮点比较容差，保证归一化幂等
const TOTAL_EPSILON: f64 = 1e-9;

/// 维度名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Complexity,
    Conflict,
    EmotionalDepth,
    CharacterDepth,
    Pacing,
    Detail,
    Tension,
    ThematicResonance,
    WorldIntegration,
    CulturalRichness,
    Tone,
    Maturity,
    NarrativeTexture,
}

impl Dimension {
    pub const ALL: [Dimension; 13] = [
        Dimension::Complexity,
        Dimension::Conflict,
        Dimension::EmotionalDepth,
        Dimension::CharacterDepth,
        Dimension::Pacing,
        Dimension::Detail,
        Dimension::Tension,
        Dimension::ThematicResonance,
        Dimension::WorldIntegration,
        Dimension::CulturalRichness,
        Dimension::Tone,
        Dimension::Maturity,
        Dimension::NarrativeTexture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Complexity => "complexity",
            Dimension::Conflict => "conflict",
            Dimension::EmotionalDepth => "emotionalDepth",
            Dimension::CharacterDepth => "characterDepth",
            Dimension::Pacing => "pacing",
            Dimension::Detail => "detail",
            Dimension::Tension => "tension",
            Dimension::ThematicResonance => "thematicResonance",
            Dimension::WorldIntegration => "worldIntegration",
            Dimension::CulturalRichness => "culturalRichness",
            Dimension::Tone => "tone",
            Dimension::Maturity => "maturity",
            Dimension::NarrativeTexture => "narrativeTexture",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 故事维度集合
///
/// 每次生成大纲时从参数重新计算，只随大纲一起持久化。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDimensions {
    pub complexity: f64,
    pub conflict: f64,
    pub emotional_depth: f64,
    pub character_depth: f64,
    pub pacing: f64,
    pub detail: f64,
    pub tension: f64,
    pub thematic_resonance: f64,
    pub world_integration: f64,
    pub cultural_richness: f64,
    pub tone: f64,
    pub maturity: f64,
    pub narrative_texture: f64,
}

impl StoryDimensions {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Complexity => self.complexity,
            Dimension::Conflict => self.conflict,
            Dimension::EmotionalDepth => self.emotional_depth,
            Dimension::CharacterDepth => self.character_depth,
            Dimension::Pacing => self.pacing,
            Dimension::Detail => self.detail,
            Dimension::Tension => self.tension,
            Dimension::ThematicResonance => self.thematic_resonance,
            Dimension::WorldIntegration => self.world_integration,
            Dimension::CulturalRichness => self.cultural_richness,
            Dimension::Tone => self.tone,
            Dimension::Maturity => self.maturity,
            Dimension::NarrativeTexture => self.narrative_texture,
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::Complexity => &mut self.complexity,
            Dimension::Conflict => &mut self.conflict,
            Dimension::EmotionalDepth => &mut self.emotional_depth,
            Dimension::CharacterDepth => &mut self.character_depth,
            Dimension::Pacing => &mut self.pacing,
            Dimension::Detail => &mut self.detail,
            Dimension::Tension => &mut self.tension,
            Dimension::ThematicResonance => &mut self.thematic_resonance,
            Dimension::WorldIntegration => &mut self.world_integration,
            Dimension::CulturalRichness => &mut self.cultural_richness,
            Dimension::Tone => &mut self.tone,
            Dimension::Maturity => &mut self.maturity,
            Dimension::NarrativeTexture => &mut self.narrative_texture,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: f64) {
        *self.get_mut(dimension) = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }

    /// 对每个维度应用同一个变换
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = *self;
        for dimension in Dimension::ALL {
            out.set(dimension, f(self.get(dimension)));
        }
        out
    }

    /// 每个维度独立截断到 [0, 2.5]，NaN 视为 0
    pub fn clamped(&self) -> Self {
        self.map(clamp_dimension)
    }

    /// 取值最高的维度（用于提示词强调）
    pub fn dominant(&self, count: usize) -> Vec<(Dimension, f64)> {
        let mut ranked: Vec<(Dimension, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(count);
        ranked
    }
}

/// 单维度截断到 [0, 2.5]，NaN 视为 0
pub fn clamp_dimension(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_DIMENSION_VALUE)
}

/// 全局归一化
///
/// 总和超过 25 时按比例缩放全部维度；总和不超过 25 的集合原样返回，
/// 因此对已归一化的结果再次调用不会改变它。
pub fn normalize_dimensions(dimensions: &StoryDimensions) -> StoryDimensions {
    let total = dimensions.total();
    if total <= MAX_DIMENSION_TOTAL + TOTAL_EPSILON {
        return *dimensions;
    }

    let scale = MAX_DIMENSION_TOTAL / total;
    dimensions.map(|v| v * scale)
}
