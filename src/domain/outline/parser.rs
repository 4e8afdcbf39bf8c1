//! Outline Parser - 宽松解析 LLM 返回的大纲 JSON
//!
//! LLM 的输出并不总是严格符合约定:
//! - 可能包裹在 Markdown 代码块里，或前后带说明文字
//! - 字段名可能是 camelCase 或 snake_case
//! - 场景可能是字符串，也可能是对象
//!
//! 缺失字段解析为空值，由 validators 统一判定。

use serde::Deserialize;

use super::entities::{CharacterArc, NovelChapter, NovelOutline, Scene};
use super::errors::OutlineError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutline {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "summary", alias = "synopsis")]
    description: Option<String>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
    #[serde(default)]
    themes: Vec<String>,
    #[serde(default, alias = "world_building", alias = "setting")]
    world_building: Option<String>,
    #[serde(default, alias = "character_arcs", alias = "characters")]
    character_arcs: Vec<RawCharacterArc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChapter {
    #[serde(default, alias = "chapter_number", alias = "number")]
    chapter_number: Option<u32>,
    #[serde(default, alias = "chapter_name", alias = "title", alias = "name")]
    chapter_name: Option<String>,
    #[serde(default, alias = "description")]
    summary: Option<String>,
    #[serde(default, alias = "target_word_count", alias = "wordCount")]
    target_word_count: Option<u32>,
    #[serde(default)]
    scenes: Vec<RawScene>,
    #[serde(default, alias = "key_plot_points", alias = "plotPoints")]
    key_plot_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScene {
    Text(String),
    Detailed {
        #[serde(default, alias = "title")]
        name: Option<String>,
        #[serde(default, alias = "summary")]
        description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCharacterArc {
    #[serde(default)]
    name: String,
    #[serde(default, alias = "arcType", alias = "arc_type", alias = "description")]
    arc: String,
}

impl From<RawScene> for Scene {
    fn from(raw: RawScene) -> Self {
        match raw {
            RawScene::Text(name) => Scene {
                name,
                description: String::new(),
            },
            RawScene::Detailed { name, description } => Scene {
                name: name.unwrap_or_default(),
                description: description.unwrap_or_default(),
            },
        }
    }
}

/// 解析 LLM 返回的大纲文本
pub fn parse_outline(text: &str) -> Result<NovelOutline, OutlineError> {
    let json = extract_json_object(text)?;
    let raw: RawOutline =
        serde_json::from_str(json).map_err(|e| OutlineError::InvalidJson(e.to_string()))?;

    let chapters = raw
        .chapters
        .into_iter()
        .enumerate()
        .map(|(index, chapter)| NovelChapter {
            chapter_number: chapter.chapter_number.unwrap_or(index as u32 + 1),
            chapter_name: chapter.chapter_name.unwrap_or_default(),
            summary: chapter.summary.unwrap_or_default(),
            target_word_count: chapter.target_word_count.unwrap_or_default(),
            pacing_guidance: None,
            scenes: chapter.scenes.into_iter().map(Scene::from).collect(),
            key_plot_points: chapter.key_plot_points,
            guidance_notes: Vec::new(),
        })
        .collect();

    Ok(NovelOutline {
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        chapters,
        themes: raw.themes,
        world_building: raw.world_building.filter(|w| !w.trim().is_empty()),
        character_arcs: raw
            .character_arcs
            .into_iter()
            .filter(|a| !a.name.trim().is_empty())
            .map(|a| CharacterArc {
                name: a.name,
                arc: a.arc,
            })
            .collect(),
        dimensions: None,
    })
}

/// 取出文本中第一个 `{` 到最后一个 `}` 之间的内容
///
/// 同时去掉 Markdown 代码块标记和前后说明文字
fn extract_json_object(text: &str) -> Result<&str, OutlineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(OutlineError::EmptyResponse);
    }

    let start = trimmed
        .find('{')
        .ok_or_else(|| OutlineError::InvalidJson("no JSON object in response".to_string()))?;
    let end = trimmed
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| OutlineError::InvalidJson("unterminated JSON object".to_string()))?;

    Ok(&trimmed[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_outline() {
        let text = r#"{
            "title": "Salt Road",
            "description": "A caravan crosses a dying sea.",
            "chapters": [
                {
                    "chapterNumber": 1,
                    "chapterName": "The Dry Harbor",
                    "summary": "Tamsin joins the caravan.",
                    "scenes": [{"name": "Harbor", "description": "Boats on sand"}],
                    "keyPlotPoints": ["Tamsin signs on"]
                }
            ],
            "themes": ["loss"],
            "worldBuilding": "The sea has been receding for a century.",
            "characterArcs": [{"name": "Tamsin", "arc": "from exile to leader"}]
        }"#;

        let outline = parse_outline(text).unwrap();
        assert_eq!(outline.title, "Salt Road");
        assert_eq!(outline.chapters.len(), 1);
        assert_eq!(outline.chapters[0].chapter_name, "The Dry Harbor");
        assert_eq!(outline.chapters[0].scenes[0].description, "Boats on sand");
        assert_eq!(outline.character_arcs[0].arc, "from exile to leader");
        assert!(outline.world_building.is_some());
    }

    #[test]
    fn test_parse_snake_case_and_string_scenes() {
        let text = r#"{
            "title": "Salt Road",
            "synopsis": "A caravan crosses a dying sea.",
            "chapters": [
                {"number": 4, "title": "Storm", "description": "A storm hits.",
                 "scenes": ["Night watch", "The mast breaks"],
                 "key_plot_points": ["Supplies lost"]}
            ]
        }"#;

        let outline = parse_outline(text).unwrap();
        assert_eq!(outline.description, "A caravan crosses a dying sea.");
        let chapter = &outline.chapters[0];
        assert_eq!(chapter.chapter_number, 4);
        assert_eq!(chapter.chapter_name, "Storm");
        assert_eq!(chapter.summary, "A storm hits.");
        assert_eq!(chapter.scenes.len(), 2);
        assert_eq!(chapter.scenes[1].name, "The mast breaks");
        assert_eq!(chapter.key_plot_points, vec!["Supplies lost".to_string()]);
    }

    #[test]
    fn test_parse_strips_code_fences_and_prose() {
        let text = "Here is your outline:\n```json\n{\"title\": \"T\", \"description\": \"D\", \"chapters\": []}\n```\nEnjoy!";
        let outline = parse_outline(text).unwrap();
        assert_eq!(outline.title, "T");
        assert!(outline.chapters.is_empty());
    }

    #[test]
    fn test_missing_chapter_numbers_default_to_position() {
        let text = r#"{"title": "T", "chapters": [{"chapterName": "A"}, {"chapterName": "B"}]}"#;
        let outline = parse_outline(text).unwrap();
        assert_eq!(outline.chapters[0].chapter_number, 1);
        assert_eq!(outline.chapters[1].chapter_number, 2);
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(parse_outline("  \n"), Err(OutlineError::EmptyResponse)));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            parse_outline("I cannot help with that."),
            Err(OutlineError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_outline("{\"title\": "),
            Err(OutlineError::InvalidJson(_))
        ));
    }
}
