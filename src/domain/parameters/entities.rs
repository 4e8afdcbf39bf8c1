//! Parameters Context - Entities

use serde::{Deserialize, Serialize};

/// 角色定位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterRole {
    Protagonist,
    Antagonist,
    Supporting,
    Mentor,
    LoveInterest,
}

impl CharacterRole {
    pub fn label(&self) -> &'static str {
        match self {
            CharacterRole::Protagonist => "protagonist",
            CharacterRole::Antagonist => "antagonist",
            CharacterRole::Supporting => "supporting",
            CharacterRole::Mentor => "mentor",
            CharacterRole::LoveInterest => "love interest",
        }
    }

    /// 主要角色（主角/反派）
    pub fn is_principal(&self) -> bool {
        matches!(self, CharacterRole::Protagonist | CharacterRole::Antagonist)
    }
}

/// 角色弧光类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArcType {
    Transformation,
    Growth,
    Flat,
    Fall,
    Redemption,
}

impl ArcType {
    pub fn label(&self) -> &'static str {
        match self {
            ArcType::Transformation => "transformation",
            ArcType::Growth => "growth",
            ArcType::Flat => "flat",
            ArcType::Fall => "fall",
            ArcType::Redemption => "redemption",
        }
    }

    /// 弧光是否会改变角色
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, ArcType::Flat)
    }
}

/// 角色设定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub role: CharacterRole,
    #[serde(default)]
    pub archetype: String,
    pub arc_type: ArcType,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        role: CharacterRole,
        archetype: impl Into<String>,
        arc_type: ArcType,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            archetype: archetype.into(),
            arc_type,
        }
    }
}
