//! Genre Adjustments - 按类型的维度乘数表

use super::{Dimension, StoryDimensions};

type Adjustments = &'static [(Dimension, f64)];

/// 类型 -> 维度乘数
///
/// key 为小写类型名，查找时忽略大小写和首尾空白
const GENRE_ADJUSTMENTS: &[(&str, Adjustments)] = &[
    (
        "hard sci-fi",
        &[
            (Dimension::Complexity, 1.4),
            (Dimension::WorldIntegration, 1.3),
            (Dimension::Detail, 1.2),
        ],
    ),
    (
        "space opera",
        &[
            (Dimension::WorldIntegration, 1.3),
            (Dimension::Conflict, 1.2),
            (Dimension::CulturalRichness, 1.1),
        ],
    ),
    (
        "epic fantasy",
        &[
            (Dimension::WorldIntegration, 1.4),
            (Dimension::CulturalRichness, 1.3),
            (Dimension::Complexity, 1.2),
        ],
    ),
    (
        "urban fantasy",
        &[
            (Dimension::Pacing, 1.2),
            (Dimension::WorldIntegration, 1.1),
        ],
    ),
    (
        "thriller",
        &[
            (Dimension::Pacing, 1.3),
            (Dimension::Tension, 1.4),
            (Dimension::Detail, 0.9),
        ],
    ),
    (
        "mystery",
        &[
            (Dimension::Complexity, 1.2),
            (Dimension::Tension, 1.3),
        ],
    ),
    (
        "cozy mystery",
        &[
            (Dimension::Tension, 0.8),
            (Dimension::Maturity, 0.6),
            (Dimension::CharacterDepth, 1.1),
        ],
    ),
    (
        "horror",
        &[
            (Dimension::Tension, 1.4),
            (Dimension::Maturity, 1.2),
            (Dimension::EmotionalDepth, 1.1),
        ],
    ),
    (
        "romance",
        &[
            (Dimension::EmotionalDepth, 1.4),
            (Dimension::CharacterDepth, 1.2),
            (Dimension::Conflict, 0.9),
        ],
    ),
    (
        "literary fiction",
        &[
            (Dimension::ThematicResonance, 1.4),
            (Dimension::EmotionalDepth, 1.3),
            (Dimension::NarrativeTexture, 1.2),
            (Dimension::Pacing, 0.8),
        ],
    ),
    (
        "historical fiction",
        &[
            (Dimension::CulturalRichness, 1.3),
            (Dimension::Detail, 1.2),
            (Dimension::WorldIntegration, 1.1),
        ],
    ),
    (
        "young adult",
        &[
            (Dimension::Pacing, 1.1),
            (Dimension::Maturity, 0.7),
            (Dimension::EmotionalDepth, 1.1),
        ],
    ),
];

/// 查找类型对应的乘数表
pub fn genre_adjustments(genre: &str) -> Option<Adjustments> {
    let key = genre.trim().to_lowercase();
    GENRE_ADJUSTMENTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, adjustments)| *adjustments)
}

/// 乘数表中的全部类型名
#[cfg(test)]
pub(crate) fn known_genres() -> impl Iterator<Item = &'static str> {
    GENRE_ADJUSTMENTS.iter().map(|(name, _)| *name)
}

/// 应用类型乘数，未知类型原样返回
pub fn apply_genre_adjustments(dimensions: &StoryDimensions, genre: &str) -> StoryDimensions {
    let Some(adjustments) = genre_adjustments(genre) else {
        return *dimensions;
    };

    let mut adjusted = *dimensions;
    for (dimension, factor) in adjustments {
        *adjusted.get_mut(*dimension) *= factor;
    }
    adjusted
}
