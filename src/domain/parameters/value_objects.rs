//! Parameters Context - Value Objects

use serde::{Deserialize, Serialize};

use super::ParameterError;

/// 1-5 整数滑块
///
/// 不变量: 值始终在 [1, 5] 区间内，反序列化时越界直接拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slider(u8);

impl Slider {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ParameterError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ParameterError::SliderOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for Slider {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Slider {
    type Error = ParameterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slider> for u8 {
    fn from(slider: Slider) -> Self {
        slider.0
    }
}

/// 小说篇幅档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NovelLength {
    #[serde(rename = "under-50k")]
    Under50k,
    #[serde(rename = "50k-100k")]
    From50kTo100k,
    #[serde(rename = "100k-150k")]
    From100kTo150k,
    #[serde(rename = "over-150k")]
    Over150k,
}

impl NovelLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            NovelLength::Under50k => "under-50k",
            NovelLength::From50kTo100k => "50k-100k",
            NovelLength::From100kTo150k => "100k-150k",
            NovelLength::Over150k => "over-150k",
        }
    }

    /// 调整前的基础章节数
    pub fn base_chapter_count(&self) -> u32 {
        match self {
            NovelLength::Under50k => 10,
            NovelLength::From50kTo100k => 15,
            NovelLength::From100kTo150k => 22,
            NovelLength::Over150k => 30,
        }
    }

    /// 全书目标字数（取档位中值）
    pub fn target_word_count(&self) -> u32 {
        match self {
            NovelLength::Under50k => 40_000,
            NovelLength::From50kTo100k => 75_000,
            NovelLength::From100kTo150k => 125_000,
            NovelLength::Over150k => 175_000,
        }
    }
}

impl Default for NovelLength {
    fn default() -> Self {
        NovelLength::From50kTo100k
    }
}

/// 叙事视角
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointOfView {
    FirstPerson,
    ThirdLimited,
    ThirdOmniscient,
    Multiple,
}

impl PointOfView {
    pub fn label(&self) -> &'static str {
        match self {
            PointOfView::FirstPerson => "first person",
            PointOfView::ThirdLimited => "third person limited",
            PointOfView::ThirdOmniscient => "third person omniscient",
            PointOfView::Multiple => "multiple viewpoints",
        }
    }
}

impl Default for PointOfView {
    fn default() -> Self {
        PointOfView::ThirdLimited
    }
}

/// 章节结构
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterStructure {
    Linear,
    Episodic,
    Nonlinear,
    Parallel,
}

impl ChapterStructure {
    /// 结构扩展系数
    pub fn expansion_factor(&self) -> f64 {
        match self {
            ChapterStructure::Linear => 1.0,
            ChapterStructure::Episodic => 1.2,
            ChapterStructure::Nonlinear => 1.1,
            ChapterStructure::Parallel => 1.3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChapterStructure::Linear => "linear",
            ChapterStructure::Episodic => "episodic",
            ChapterStructure::Nonlinear => "nonlinear",
            ChapterStructure::Parallel => "parallel storylines",
        }
    }
}

impl Default for ChapterStructure {
    fn default() -> Self {
        ChapterStructure::Linear
    }
}

/// 结局风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStyle {
    Definitive,
    Ambiguous,
    Open,
    Twist,
}

impl ResolutionStyle {
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionStyle::Definitive => "definitive",
            ResolutionStyle::Ambiguous => "ambiguous",
            ResolutionStyle::Open => "open-ended",
            ResolutionStyle::Twist => "twist ending",
        }
    }
}

impl Default for ResolutionStyle {
    fn default() -> Self {
        ResolutionStyle::Definitive
    }
}

/// 冲突类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictType {
    PersonVsPerson,
    PersonVsSelf,
    PersonVsSociety,
    PersonVsNature,
    PersonVsTechnology,
    PersonVsFate,
    PersonVsSupernatural,
}

impl ConflictType {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictType::PersonVsPerson => "person vs. person",
            ConflictType::PersonVsSelf => "person vs. self",
            ConflictType::PersonVsSociety => "person vs. society",
            ConflictType::PersonVsNature => "person vs. nature",
            ConflictType::PersonVsTechnology => "person vs. technology",
            ConflictType::PersonVsFate => "person vs. fate",
            ConflictType::PersonVsSupernatural => "person vs. supernatural",
        }
    }

    /// 内在冲突对情感深度的贡献更高
    pub fn is_internal(&self) -> bool {
        matches!(self, ConflictType::PersonVsSelf | ConflictType::PersonVsFate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_bounds() {
        assert!(Slider::new(0).is_err());
        assert!(Slider::new(6).is_err());
        assert_eq!(Slider::new(1).unwrap().value(), 1);
        assert_eq!(Slider::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_slider_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<Slider>("4").is_ok());
        assert!(serde_json::from_str::<Slider>("9").is_err());
    }

    #[test]
    fn test_novel_length_wire_names() {
        let length: NovelLength = serde_json::from_str("\"50k-100k\"").unwrap();
        assert_eq!(length, NovelLength::From50kTo100k);
        assert_eq!(length.base_chapter_count(), 15);
        assert_eq!(
            serde_json::to_string(&NovelLength::Over150k).unwrap(),
            "\"over-150k\""
        );
    }

    #[test]
    fn test_conflict_type_kebab_case() {
        let conflict: ConflictType = serde_json::from_str("\"person-vs-self\"").unwrap();
        assert_eq!(conflict, ConflictType::PersonVsSelf);
        assert!(conflict.is_internal());
    }
}
