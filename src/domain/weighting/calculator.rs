//! Dimension Calculator - 参数到故事维度的加权计算
//!
//! 流水线:
//! 1. 滑块值与列表长度的加权线性组合
//! 2. 单维度截断到 [0, 2.5]
//! 3. 全局归一化（总和 > 25 时等比缩放）
//! 4. 类型乘数（乘后再次截断）
//! 5. 冲突规则：pacing 与 detail 同时 > 2.0 时 detail 封顶 2.0

use super::dimensions::{clamp_dimension, normalize_dimensions, StoryDimensions};
use super::genre::apply_genre_adjustments;
use crate::domain::parameters::{NovelParameters, PointOfView};

/// 冲突规则阈值
const PACING_DETAIL_THRESHOLD: f64 = 2.0;

/// 参与计算的列表长度上限，避免超长角色表压过滑块
const MAX_COUNTED_CHARACTERS: usize = 8;
const MAX_COUNTED_CONFLICTS: usize = 5;

/// 计算故事维度
///
/// 纯函数，任何合法参数都会得到结果，每个维度都在 [0, 2.5] 内。
pub fn calculate_dimensions(params: &NovelParameters) -> StoryDimensions {
    let raw = raw_dimensions(params).clamped();
    let normalized = normalize_dimensions(&raw);
    let adjusted = apply_genre_adjustments(&normalized, &params.genre).clamped();
    let resolved = resolve_conflicts(adjusted);

    tracing::debug!(
        genre = %params.genre,
        raw_total = raw.total(),
        total = resolved.total(),
        "Story dimensions calculated"
    );

    resolved
}

/// 冲突规则
pub fn resolve_conflicts(mut dimensions: StoryDimensions) -> StoryDimensions {
    if dimensions.pacing > PACING_DETAIL_THRESHOLD && dimensions.detail > PACING_DETAIL_THRESHOLD {
        dimensions.detail = PACING_DETAIL_THRESHOLD;
    }
    dimensions
}

/// 加权线性组合（未截断）
pub fn raw_dimensions(params: &NovelParameters) -> StoryDimensions {
    let f = Features::from_params(params);

    StoryDimensions {
        complexity: 0.2 * f.world_complexity
            + 0.1 * f.flashback_usage
            + 0.1 * f.foreshadowing
            + 0.1 * f.conflict_count
            + 0.05 * f.character_count
            + (f.expansion - 1.0),
        conflict: 0.15 * f.conflict_count
            + 0.15 * f.cultural_conflict
            + 0.1 * f.violence
            + 0.1 * f.principal_count,
        emotional_depth: 0.3 * f.emotional_intensity
            + 0.1 * f.metaphor_frequency
            + 0.1 * f.internal_conflicts
            + 0.1 * f.dynamic_arcs,
        character_depth: 0.15 * f.character_count
            + 0.15 * f.dynamic_arcs
            + 0.1 * f.dialogue_balance
            + 0.1 * f.emotional_intensity,
        pacing: 0.4 * f.pacing_overall + 0.1 * f.pacing_variance,
        detail: 0.3 * f.description_density + 0.2 * f.tone_descriptive,
        tension: 0.2 * f.pacing_variance
            + 0.15 * f.foreshadowing
            + 0.1 * f.violence
            + 0.05 * f.conflict_count,
        thematic_resonance: 0.2 * f.metaphor_frequency
            + 0.15 * f.controversial_handling
            + 0.1 * f.foreshadowing
            + presence(&params.theme) * 0.2,
        world_integration: 0.3 * f.world_complexity
            + 0.1 * f.cultural_depth
            + presence(&params.setting_type) * 0.1,
        cultural_richness: 0.3 * f.cultural_depth
            + 0.15 * f.cultural_conflict
            + presence(&params.cultural_framework) * 0.1,
        tone: 0.3 * f.tone_formality + 0.1 * f.tone_descriptive,
        maturity: 0.15 * f.violence
            + 0.15 * f.adult_content
            + 0.1 * f.profanity
            + 0.1 * f.controversial_handling,
        narrative_texture: 0.15 * f.dialogue_balance
            + 0.15 * f.metaphor_frequency
            + 0.1 * f.flashback_usage
            + pov_texture(params.point_of_view),
    }
}

/// 参与加权的数值特征
struct Features {
    world_complexity: f64,
    cultural_depth: f64,
    cultural_conflict: f64,
    tone_formality: f64,
    tone_descriptive: f64,
    dialogue_balance: f64,
    metaphor_frequency: f64,
    description_density: f64,
    pacing_overall: f64,
    pacing_variance: f64,
    emotional_intensity: f64,
    flashback_usage: f64,
    foreshadowing: f64,
    violence: f64,
    adult_content: f64,
    profanity: f64,
    controversial_handling: f64,
    character_count: f64,
    principal_count: f64,
    dynamic_arcs: f64,
    conflict_count: f64,
    internal_conflicts: f64,
    expansion: f64,
}

impl Features {
    fn from_params(params: &NovelParameters) -> Self {
        let character_count = params.characters.len().min(MAX_COUNTED_CHARACTERS);
        let conflict_count = params.conflict_types.len().min(MAX_COUNTED_CONFLICTS);
        let internal_conflicts = params
            .conflict_types
            .iter()
            .filter(|c| c.is_internal())
            .count();

        Self {
            world_complexity: params.world_complexity.as_f64(),
            cultural_depth: params.cultural_depth.as_f64(),
            cultural_conflict: params.cultural_conflict.as_f64(),
            tone_formality: params.tone_formality.as_f64(),
            tone_descriptive: params.tone_descriptive.as_f64(),
            dialogue_balance: params.dialogue_balance.as_f64(),
            metaphor_frequency: params.metaphor_frequency.as_f64(),
            description_density: params.description_density.as_f64(),
            pacing_overall: params.pacing_overall.as_f64(),
            pacing_variance: params.pacing_variance.as_f64(),
            emotional_intensity: params.emotional_intensity.as_f64(),
            flashback_usage: params.flashback_usage.as_f64(),
            foreshadowing: params.foreshadowing_intensity.as_f64(),
            violence: params.violence_level.as_f64(),
            adult_content: params.adult_content_level.as_f64(),
            profanity: params.profanity_level.as_f64(),
            controversial_handling: params.controversial_handling.as_f64(),
            character_count: character_count as f64,
            principal_count: params.principal_count().min(MAX_COUNTED_CHARACTERS) as f64,
            dynamic_arcs: params.dynamic_arc_count().min(MAX_COUNTED_CHARACTERS) as f64,
            conflict_count: conflict_count as f64,
            internal_conflicts: internal_conflicts as f64,
            expansion: params.chapter_structure.expansion_factor(),
        }
    }
}

fn presence(value: &str) -> f64 {
    if value.trim().is_empty() {
        0.0
    } else {
        1.0
    }
}

fn pov_texture(pov: PointOfView) -> f64 {
    match pov {
        PointOfView::FirstPerson | PointOfView::ThirdLimited => 0.1,
        PointOfView::ThirdOmniscient => 0.2,
        PointOfView::Multiple => 0.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameters::{
        ArcType, Character, CharacterRole, ChapterStructure, ConflictType, Slider,
    };
    use crate::domain::weighting::{Dimension, MAX_DIMENSION_TOTAL, MAX_DIMENSION_VALUE};

    fn assert_bounded(dims: &StoryDimensions) {
        for (dimension, value) in dims.iter() {
            assert!(
                (0.0..=MAX_DIMENSION_VALUE).contains(&value),
                "{} out of range: {}",
                dimension,
                value
            );
        }
    }

    #[test]
    fn test_every_dimension_bounded_for_slider_extremes() {
        for value in Slider::MIN..=Slider::MAX {
            for genre in ["Hard Sci-Fi", "Thriller", "Romance", "Unknown", "Epic Fantasy"] {
                let mut params = NovelParameters::with_all_sliders(value);
                params.genre = genre.to_string();
                assert_bounded(&calculate_dimensions(&params));
            }
        }
    }

    #[test]
    fn test_bounded_for_mixed_sliders_across_genre_table() {
        use super::super::genre::known_genres;

        let mut genres: Vec<&str> = known_genres().collect();
        assert!(!genres.is_empty());
        genres.push("Unknown");

        for seed in 0..60u32 {
            // 每个滑块取不同的值，覆盖高低混合的组合
            let slider = |i: u32| Slider::new(1 + ((seed * 7 + i * 3 + seed / 5) % 5) as u8).unwrap();
            let mut params = NovelParameters::sample();
            params.world_complexity = slider(0);
            params.cultural_depth = slider(1);
            params.cultural_conflict = slider(2);
            params.tone_formality = slider(3);
            params.tone_descriptive = slider(4);
            params.dialogue_balance = slider(5);
            params.metaphor_frequency = slider(6);
            params.description_density = slider(7);
            params.pacing_overall = slider(8);
            params.pacing_variance = slider(9);
            params.emotional_intensity = slider(10);
            params.flashback_usage = slider(11);
            params.foreshadowing_intensity = slider(12);
            params.violence_level = slider(13);
            params.adult_content_level = slider(14);
            params.profanity_level = slider(15);
            params.controversial_handling = slider(16);
            if seed % 2 == 0 {
                params.chapter_structure = ChapterStructure::Parallel;
            }

            for genre in &genres {
                params.genre = genre.to_string();
                let dims = calculate_dimensions(&params);
                assert_bounded(&dims);
                assert!(
                    dims.total() <= MAX_DIMENSION_TOTAL * 1.4 + 1e-9,
                    "genre {} seed {} total {}",
                    genre,
                    seed,
                    dims.total()
                );
            }
        }
    }

    #[test]
    fn test_bounded_with_large_lists() {
        let mut params = NovelParameters::with_all_sliders(5);
        params.chapter_structure = ChapterStructure::Parallel;
        params.characters = (0..40)
            .map(|i| {
                Character::new(
                    format!("c{}", i),
                    CharacterRole::Supporting,
                    "",
                    ArcType::Transformation,
                )
            })
            .collect();
        params.conflict_types = vec![
            ConflictType::PersonVsPerson,
            ConflictType::PersonVsSelf,
            ConflictType::PersonVsSociety,
            ConflictType::PersonVsNature,
            ConflictType::PersonVsTechnology,
            ConflictType::PersonVsFate,
            ConflictType::PersonVsSupernatural,
        ];
        assert_bounded(&calculate_dimensions(&params));
    }

    #[test]
    fn test_maxed_sliders_trigger_normalization() {
        let params = NovelParameters::with_all_sliders(5);
        let raw = raw_dimensions(&params).clamped();
        assert!(raw.total() > MAX_DIMENSION_TOTAL);

        let mut params = params;
        params.genre = "Unknown".to_string();
        let dims = calculate_dimensions(&params);
        assert!(dims.total() <= MAX_DIMENSION_TOTAL + 1e-9);
    }

    #[test]
    fn test_mid_sliders_skip_normalization() {
        let mut params = NovelParameters::with_all_sliders(3);
        params.genre = "Unknown".to_string();
        let raw = raw_dimensions(&params).clamped();
        assert!(raw.total() <= MAX_DIMENSION_TOTAL);
        assert_eq!(calculate_dimensions(&params), resolve_conflicts(raw));
    }

    #[test]
    fn test_genre_step_applies_multipliers() {
        let mut plain = NovelParameters::with_all_sliders(2);
        plain.genre = "Unknown".to_string();
        let mut scifi = plain.clone();
        scifi.genre = "Hard Sci-Fi".to_string();

        let base = calculate_dimensions(&plain);
        let adjusted = calculate_dimensions(&scifi);
        assert!((adjusted.complexity - clamp_dimension(base.complexity * 1.4)).abs() < 1e-12);
        assert_eq!(adjusted.tone, base.tone);
    }

    #[test]
    fn test_pacing_detail_conflict_rule() {
        let mut dims = StoryDimensions::default();
        dims.pacing = 2.3;
        dims.detail = 2.4;
        let resolved = resolve_conflicts(dims);
        assert_eq!(resolved.detail, 2.0);
        assert_eq!(resolved.pacing, 2.3);

        dims.pacing = 1.9;
        assert_eq!(resolve_conflicts(dims).detail, 2.4);
    }

    #[test]
    fn test_fast_dense_novel_caps_detail() {
        let mut params = NovelParameters::with_all_sliders(1);
        params.genre = "Unknown".to_string();
        params.pacing_overall = Slider::new(5).unwrap();
        params.pacing_variance = Slider::new(5).unwrap();
        params.description_density = Slider::new(5).unwrap();
        params.tone_descriptive = Slider::new(5).unwrap();

        let dims = calculate_dimensions(&params);
        assert!(dims.pacing > 2.0);
        assert_eq!(dims.detail, 2.0);
    }

    #[test]
    fn test_higher_world_complexity_raises_complexity() {
        let low = NovelParameters::with_all_sliders(2);
        let mut high = low.clone();
        high.world_complexity = Slider::new(5).unwrap();

        assert!(
            calculate_dimensions(&high).get(Dimension::Complexity)
                > calculate_dimensions(&low).get(Dimension::Complexity)
        );
    }
}
