//! Prompt Builder - LLM 提示词构建
//!
//! 把参数、维度和章节规划组织成发送给 LLM 的 system/user 消息。

use std::fmt::Write;

use crate::domain::outline::{NovelChapter, NovelOutline};
use crate::domain::parameters::NovelParameters;
use crate::domain::weighting::StoryDimensions;

/// 在提示词中强调的维度数
const EMPHASIZED_DIMENSIONS: usize = 4;

/// 大纲 JSON 格式约定
const OUTLINE_SCHEMA: &str = r#"{
  "title": string,
  "description": string,
  "chapters": [
    {
      "chapterNumber": number,
      "chapterName": string,
      "summary": string,
      "scenes": [{"name": string, "description": string}],
      "keyPlotPoints": [string]
    }
  ],
  "themes": [string],
  "worldBuilding": string,
  "characterArcs": [{"name": string, "arc": string}]
}"#;

/// system + user 消息对
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// 生成大纲提示词
pub fn outline_prompt(
    params: &NovelParameters,
    dimensions: &StoryDimensions,
    chapter_count: u32,
    references: &[String],
) -> Prompt {
    let system = format!(
        "You are a senior fiction editor who designs novel outlines. \
         Respond with a single JSON object matching this shape and nothing else:\n{}",
        OUTLINE_SCHEMA
    );

    let mut user = String::new();
    write_story_brief(&mut user, params);
    write_dimensions(&mut user, dimensions);
    let _ = writeln!(
        user,
        "\nWrite exactly {} chapters. Every chapter needs a name, a summary, \
         at least one scene and at least one key plot point.",
        chapter_count
    );

    if !references.is_empty() {
        let _ = writeln!(user, "\nReference material for tone and style:");
        for (i, reference) in references.iter().enumerate() {
            let _ = writeln!(user, "[{}] {}", i + 1, reference.trim());
        }
    }

    Prompt { system, user }
}

/// 大纲精修提示词
pub fn refine_prompt(
    params: &NovelParameters,
    outline: &NovelOutline,
    dimensions: &StoryDimensions,
    instructions: &str,
) -> Prompt {
    let system = format!(
        "You revise novel outlines. Keep the chapter count unless told otherwise. \
         Respond with the complete revised outline as a single JSON object matching \
         this shape and nothing else:\n{}",
        OUTLINE_SCHEMA
    );

    let current = serde_json::to_string_pretty(outline).unwrap_or_default();

    let mut user = String::new();
    write_story_brief(&mut user, params);
    write_dimensions(&mut user, dimensions);
    let _ = writeln!(user, "\nCurrent outline:\n{}", current);
    let instructions = instructions.trim();
    if instructions.is_empty() {
        let _ = writeln!(
            user,
            "\nTighten causality between chapters and sharpen each chapter's key plot points."
        );
    } else {
        let _ = writeln!(user, "\nRevision instructions: {}", instructions);
    }

    Prompt { system, user }
}

/// 章节正文提示词
pub fn chapter_prompt(
    params: &NovelParameters,
    outline: &NovelOutline,
    chapter: &NovelChapter,
    previous: Option<&NovelChapter>,
) -> Prompt {
    let system = format!(
        "You are a novelist writing \"{}\" in {} point of view. \
         Write only the chapter prose, no headings or commentary.",
        outline.title,
        params.point_of_view.label()
    );

    let mut user = String::new();
    let _ = writeln!(user, "Novel: {}", outline.description);
    if let Some(world) = &outline.world_building {
        let _ = writeln!(user, "World: {}", world);
    }
    if let Some(previous) = previous {
        let _ = writeln!(
            user,
            "Previous chapter ({}): {}",
            previous.chapter_name, previous.summary
        );
    }

    let _ = writeln!(
        user,
        "\nWrite chapter {} \"{}\" (about {} words).",
        chapter.chapter_number, chapter.chapter_name, chapter.target_word_count
    );
    let _ = writeln!(user, "Summary: {}", chapter.summary);
    for scene in &chapter.scenes {
        let _ = writeln!(user, "- Scene: {} {}", scene.name, scene.description);
    }
    for point in &chapter.key_plot_points {
        let _ = writeln!(user, "- Must happen: {}", point);
    }
    if let Some(pacing) = &chapter.pacing_guidance {
        let _ = writeln!(user, "Pacing: {}", pacing.description);
    }
    for note in &chapter.guidance_notes {
        let _ = writeln!(user, "Note: {}", note);
    }
    write_content_limits(&mut user, params);

    Prompt { system, user }
}

fn write_story_brief(out: &mut String, params: &NovelParameters) {
    let _ = writeln!(out, "Title: {}", params.title);
    let _ = writeln!(out, "Genre: {}", params.genre);
    if !params.theme.trim().is_empty() {
        let _ = writeln!(out, "Theme: {}", params.theme);
    }
    if !params.story_description.trim().is_empty() {
        let _ = writeln!(out, "Premise: {}", params.story_description);
    }
    if !params.setting_type.trim().is_empty() {
        let _ = writeln!(out, "Setting: {}", params.setting_type);
    }
    if !params.cultural_framework.trim().is_empty() {
        let _ = writeln!(out, "Cultural framework: {}", params.cultural_framework);
    }
    let _ = writeln!(out, "Point of view: {}", params.point_of_view.label());
    let _ = writeln!(out, "Structure: {}", params.chapter_structure.label());
    let _ = writeln!(out, "Ending: {}", params.resolution_style.label());

    if !params.characters.is_empty() {
        let _ = writeln!(out, "Characters:");
        for c in &params.characters {
            let _ = writeln!(
                out,
                "- {} ({}, {} arc{})",
                c.name,
                c.role.label(),
                c.arc_type.label(),
                if c.archetype.is_empty() {
                    String::new()
                } else {
                    format!(", {}", c.archetype)
                }
            );
        }
    }

    if !params.conflict_types.is_empty() {
        let conflicts: Vec<&str> = params.conflict_types.iter().map(|c| c.label()).collect();
        let _ = writeln!(out, "Conflicts: {}", conflicts.join(", "));
    }
}

fn write_dimensions(out: &mut String, dimensions: &StoryDimensions) {
    let _ = writeln!(out, "\nStory dimensions (0-2.5, higher means stronger emphasis):");
    for (dimension, value) in dimensions.iter() {
        let _ = writeln!(out, "- {}: {:.2}", dimension, value);
    }
    let dominant: Vec<String> = dimensions
        .dominant(EMPHASIZED_DIMENSIONS)
        .into_iter()
        .map(|(d, _)| d.to_string())
        .collect();
    let _ = writeln!(out, "Emphasize: {}", dominant.join(", "));
}

fn write_content_limits(out: &mut String, params: &NovelParameters) {
    let _ = writeln!(
        out,
        "Content limits (1-5): violence {}, adult content {}, profanity {}.",
        params.violence_level.value(),
        params.adult_content_level.value(),
        params.profanity_level.value()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::weighting::calculate_dimensions;

    #[test]
    fn test_outline_prompt_contains_brief_and_count() {
        let params = NovelParameters::sample();
        let dims = calculate_dimensions(&params);
        let prompt = outline_prompt(&params, &dims, 17, &["A rainy street.".to_string()]);

        assert!(prompt.system.contains("chapterNumber"));
        assert!(prompt.user.contains("Title: The Glass Meridian"));
        assert!(prompt.user.contains("exactly 17 chapters"));
        assert!(prompt.user.contains("[1] A rainy street."));
        assert!(prompt.user.contains("emotionalDepth"));
    }

    #[test]
    fn test_refine_prompt_embeds_outline() {
        let params = NovelParameters::sample();
        let dims = calculate_dimensions(&params);
        let outline = NovelOutline::sample(2);
        let prompt = refine_prompt(&params, &outline, &dims, "Make chapter 2 darker");

        assert!(prompt.user.contains("\"chapterName\": \"Chapter 2\""));
        assert!(prompt.user.contains("Make chapter 2 darker"));
    }

    #[test]
    fn test_refine_prompt_default_instructions() {
        let params = NovelParameters::sample();
        let dims = calculate_dimensions(&params);
        let prompt = refine_prompt(&params, &NovelOutline::sample(1), &dims, "  ");
        assert!(prompt.user.contains("Tighten causality"));
    }

    #[test]
    fn test_chapter_prompt_mentions_previous_chapter() {
        let params = NovelParameters::sample();
        let outline = NovelOutline::sample(3);
        let prompt = chapter_prompt(
            &params,
            &outline,
            &outline.chapters[1],
            Some(&outline.chapters[0]),
        );

        assert!(prompt.system.contains("third person limited"));
        assert!(prompt.user.contains("Previous chapter (Chapter 1)"));
        assert!(prompt.user.contains("Write chapter 2"));
        assert!(prompt.user.contains("Must happen: Turning point 2"));
    }
}
