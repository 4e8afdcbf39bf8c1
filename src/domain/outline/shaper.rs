//! Outline Shaper - 章节数、节奏曲线与字数目标
//!
//! 章节数 = round(基础章节数 × 结构扩展系数 × (1 + ln(1 + complexity) × 0.2))，至少 1 章。

use serde::Serialize;

use super::entities::{NovelOutline, PacingGuidance, PlotPhase};
use crate::domain::parameters::{NovelLength, NovelParameters};
use crate::domain::weighting::{clamp_dimension, StoryDimensions};

/// complexity 对章节数的影响系数
const COMPLEXITY_FACTOR: f64 = 0.2;

/// 单章最低字数
pub const MIN_CHAPTER_WORDS: u32 = 500;

/// 字数目标取整粒度
const WORD_ROUNDING: f64 = 50.0;

/// 单章规划
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPlan {
    pub number: u32,
    pub phase: PlotPhase,
    pub pacing: f64,
    pub word_goal: u32,
}

/// 整形结果摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidanceReport {
    /// 参数推导出的章节数
    pub expected_chapters: u32,
    /// LLM 实际返回的章节数
    pub actual_chapters: u32,
}

impl GuidanceReport {
    pub fn matches_plan(&self) -> bool {
        self.expected_chapters == self.actual_chapters
    }
}

/// 计算章节数
///
/// 两个调整系数为负时按 0 处理，因此对 `expansion` 与 `complexity`
/// 均单调不减。
pub fn calculate_chapter_count(length: NovelLength, expansion: f64, complexity: f64) -> u32 {
    let expansion = non_negative(expansion);
    let complexity = non_negative(complexity);

    let base = f64::from(length.base_chapter_count());
    let count = (base * expansion * (1.0 + complexity.ln_1p() * COMPLEXITY_FACTOR)).round();

    if count < 1.0 {
        1
    } else if count > f64::from(u32::MAX) {
        u32::MAX
    } else {
        count as u32
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// 按参数和维度推导章节数
pub fn chapter_count_for(params: &NovelParameters, dimensions: &StoryDimensions) -> u32 {
    calculate_chapter_count(
        params.novel_length,
        params.chapter_structure.expansion_factor(),
        dimensions.complexity,
    )
}

/// 生成全书章节规划
pub fn plan_chapters(params: &NovelParameters, dimensions: &StoryDimensions) -> Vec<ChapterPlan> {
    let count = chapter_count_for(params, dimensions);
    plan_for_count(count, params.novel_length.target_word_count(), dimensions)
}

/// 按给定章节数生成规划
///
/// 字数按阶段权重分配全书目标字数，每章不少于 500 字。
pub fn plan_for_count(count: u32, total_words: u32, dimensions: &StoryDimensions) -> Vec<ChapterPlan> {
    if count == 0 {
        return Vec::new();
    }

    let phases: Vec<PlotPhase> = (1..=count)
        .map(|number| PlotPhase::for_chapter(number, count))
        .collect();
    let weight_sum: f64 = phases.iter().map(|p| p.word_weight()).sum();

    phases
        .into_iter()
        .zip(1..=count)
        .map(|(phase, number)| {
            let share = f64::from(total_words) * phase.word_weight() / weight_sum;
            let rounded = ((share / WORD_ROUNDING).round() * WORD_ROUNDING) as u32;
            ChapterPlan {
                number,
                phase,
                pacing: clamp_dimension(dimensions.pacing * phase.pacing_multiplier()),
                word_goal: rounded.max(MIN_CHAPTER_WORDS),
            }
        })
        .collect()
}

/// 节奏强度的文字描述
pub fn describe_pacing(phase: PlotPhase, intensity: f64) -> String {
    let tempo = if intensity >= 2.0 {
        "fast: short scenes, quick cuts, minimal digression"
    } else if intensity >= 1.2 {
        "steady: balance action with reflection"
    } else {
        "measured: leave room for atmosphere and interiority"
    };
    format!("{} phase, {}", phase.as_str(), tempo)
}

/// 按阶段和维度生成写作提示
pub fn guidance_notes(phase: PlotPhase, dimensions: &StoryDimensions) -> Vec<String> {
    let mut notes = Vec::new();

    match phase {
        PlotPhase::Setup => {
            if dimensions.world_integration > 2.0 {
                notes.push("Establish the world's rules through action rather than exposition.");
            }
            if dimensions.character_depth > 1.8 {
                notes.push("Give each principal character a defining moment of choice.");
            }
        }
        PlotPhase::Rising => {
            if dimensions.tension > 2.0 {
                notes.push("Escalate stakes in every scene and end on an unresolved question.");
            }
            if dimensions.complexity > 2.0 {
                notes.push("Thread subplots so each one advances the central conflict.");
            }
        }
        PlotPhase::Climax => {
            if dimensions.emotional_depth > 1.8 {
                notes.push("Let the climax turn on an emotional decision, not only external action.");
            }
            if dimensions.conflict > 1.8 {
                notes.push("Bring the primary conflicts into direct confrontation.");
            }
        }
        PlotPhase::Resolution => {
            if dimensions.thematic_resonance > 1.8 {
                notes.push("Echo the central theme in the closing images.");
            }
        }
    }

    if dimensions.detail >= 2.0 {
        notes.push("Favor dense sensory description.");
    }
    if dimensions.pacing > 2.0 {
        notes.push("Keep scenes short and transitions brisk.");
    }
    if dimensions.maturity < 0.8 {
        notes.push("Keep content suitable for a general audience.");
    }

    notes.into_iter().map(String::from).collect()
}

/// 按维度对 LLM 返回的大纲做后处理（原地修改）
///
/// - 按原章节号稳定排序后重新编号为 1..n
/// - 以实际章节数重新规划字数目标与节奏
/// - 附加维度驱动的写作提示
/// - 记录本次使用的维度
pub fn apply_dimensional_guidance(
    outline: &mut NovelOutline,
    dimensions: &StoryDimensions,
    params: &NovelParameters,
) -> GuidanceReport {
    let expected = chapter_count_for(params, dimensions);

    outline.chapters.sort_by_key(|c| c.chapter_number);
    let actual = outline.chapters.len() as u32;
    let plan = plan_for_count(actual, params.novel_length.target_word_count(), dimensions);

    for (chapter, plan) in outline.chapters.iter_mut().zip(plan.iter()) {
        chapter.chapter_number = plan.number;
        chapter.target_word_count = plan.word_goal;
        chapter.pacing_guidance = Some(PacingGuidance {
            phase: plan.phase,
            intensity: plan.pacing,
            description: describe_pacing(plan.phase, plan.pacing),
        });

        for note in guidance_notes(plan.phase, dimensions) {
            if !chapter.guidance_notes.contains(&note) {
                chapter.guidance_notes.push(note);
            }
        }
    }

    outline.dimensions = Some(*dimensions);

    let report = GuidanceReport {
        expected_chapters: expected,
        actual_chapters: actual,
    };
    if !report.matches_plan() {
        tracing::warn!(
            expected = expected,
            actual = actual,
            "Outline chapter count differs from plan"
        );
    }
    report
}
