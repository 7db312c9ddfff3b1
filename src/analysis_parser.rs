//! Validation boundary between the AI service's JSON and the typed analysis model.
//!
//! Every response passes through here before anything else sees it. The result is
//! either a fully populated [`AnalysisResult`] or a single
//! [`AnalysisError::MalformedAnalysisResult`] listing every violation found.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::errors::AnalysisError;
use crate::log_validation;
use crate::models::{
    AnalysisResult, GrammarPoint, MindMapNode, QuizKind, QuizQuestion, VocabularyEntry,
    WritingAnalysis,
};

/// Mind maps deeper than this are rejected rather than rendered.
pub const MAX_MIND_MAP_DEPTH: usize = 32;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysisResult {
    title: Option<String>,
    vocabulary: Option<Vec<RawVocabularyEntry>>,
    grammar: Option<Vec<RawGrammarPoint>>,
    writing: Option<RawWritingAnalysis>,
    background: Option<String>,
    #[serde(alias = "mind_map")]
    mind_map: Option<RawMindMapNode>,
    quizzes: Option<Vec<RawQuizQuestion>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVocabularyEntry {
    word: Option<String>,
    #[serde(alias = "pos")]
    part_of_speech: Option<String>,
    #[serde(alias = "definitionEn")]
    definition_primary: Option<String>,
    #[serde(alias = "definitionZh")]
    definition_secondary: Option<String>,
    #[serde(alias = "usage")]
    usage_note: Option<String>,
    #[serde(alias = "example")]
    example_sentence: Option<String>,
    derivatives: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGrammarPoint {
    pattern: Option<String>,
    structure: Option<String>,
    explanation: Option<String>,
    #[serde(alias = "example")]
    example_sentence: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWritingAnalysis {
    #[serde(alias = "type")]
    genre_type: Option<String>,
    logic: Option<String>,
    summary: Option<String>,
    framework: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawMindMapNode {
    id: Option<String>,
    label: Option<String>,
    children: Option<Vec<RawMindMapNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizQuestion {
    id: Option<String>,
    #[serde(alias = "type")]
    kind: Option<String>,
    #[serde(alias = "question")]
    prompt: Option<String>,
    options: Option<Vec<String>>,
    #[serde(alias = "answer")]
    correct_answer: Option<String>,
    explanation: Option<String>,
    #[serde(alias = "word")]
    related_word: Option<String>,
}

/// Parse and validate the raw text of an AI response.
pub fn parse_analysis_result(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = raw.trim();
    // An empty body is read as an empty object so it fails on missing fields.
    let text = if trimmed.is_empty() { "{}" } else { trimmed };

    let value: Value = serde_json::from_str(text)
        .map_err(|e| AnalysisError::malformed(format!("invalid JSON: {}", e)))?;

    validate_analysis_value(value)
}

/// Validate an already-decoded JSON document against the analysis model.
pub fn validate_analysis_value(value: Value) -> Result<AnalysisResult, AnalysisError> {
    if !value.is_object() {
        return Err(AnalysisError::malformed(
            "analysis result must be a JSON object",
        ));
    }

    let raw: RawAnalysisResult = serde_json::from_value(value)
        .map_err(|e| AnalysisError::malformed(format!("schema violation: {}", e)))?;

    let mut issues = Vec::new();

    let title = required(raw.title, "title", &mut issues);
    let writing = match raw.writing {
        Some(writing) => Some(convert_writing(writing)),
        None => {
            issues.push("missing required field `writing`".to_string());
            None
        }
    };
    let vocabulary = match raw.vocabulary {
        Some(entries) => convert_vocabulary(entries, &mut issues),
        None => {
            issues.push("missing required field `vocabulary`".to_string());
            Vec::new()
        }
    };
    let grammar = match raw.grammar {
        Some(points) => points.into_iter().map(convert_grammar).collect(),
        None => {
            issues.push("missing required field `grammar`".to_string());
            Vec::new()
        }
    };
    let mind_map = match raw.mind_map {
        Some(root) => convert_mind_map(root, "mindMap", 0, &mut Vec::new(), &mut issues),
        None => {
            issues.push("missing required field `mindMap`".to_string());
            None
        }
    };
    let quizzes = match raw.quizzes {
        Some(questions) => convert_quizzes(questions, &mut issues),
        None => {
            issues.push("missing required field `quizzes`".to_string());
            Vec::new()
        }
    };

    match (title, writing, mind_map) {
        (Some(title), Some(writing), Some(mind_map)) if issues.is_empty() => {
            log_validation!(
                success,
                "analysis_result",
                format!(
                    "{} vocabulary, {} grammar, {} quizzes",
                    vocabulary.len(),
                    grammar.len(),
                    quizzes.len()
                )
            );
            Ok(AnalysisResult {
                title,
                vocabulary,
                grammar,
                writing,
                background: raw.background.unwrap_or_default(),
                mind_map,
                quizzes,
            })
        }
        _ => {
            let error = AnalysisError::MalformedAnalysisResult(issues);
            log_validation!(failure, "analysis_result", error = error);
            Err(error)
        }
    }
}

fn required(value: Option<String>, field: &str, issues: &mut Vec<String>) -> Option<String> {
    if value.is_none() {
        issues.push(format!("missing required field `{}`", field));
    }
    value
}

fn non_empty(value: Option<String>, path: &str, issues: &mut Vec<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) => {
            issues.push(format!("{} must be non-empty", path));
            String::new()
        }
        None => {
            issues.push(format!("{} is missing", path));
            String::new()
        }
    }
}

fn convert_vocabulary(
    entries: Vec<RawVocabularyEntry>,
    issues: &mut Vec<String>,
) -> Vec<VocabularyEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let path = format!("vocabulary[{}]", i);
            VocabularyEntry {
                word: non_empty(entry.word, &format!("{}.word", path), issues),
                part_of_speech: non_empty(
                    entry.part_of_speech,
                    &format!("{}.partOfSpeech", path),
                    issues,
                ),
                definition_primary: non_empty(
                    entry.definition_primary,
                    &format!("{}.definitionPrimary", path),
                    issues,
                ),
                definition_secondary: non_empty(
                    entry.definition_secondary,
                    &format!("{}.definitionSecondary", path),
                    issues,
                ),
                usage_note: entry.usage_note.filter(|u| !u.trim().is_empty()),
                example_sentence: entry.example_sentence.unwrap_or_default(),
                derivatives: entry.derivatives.unwrap_or_default(),
            }
        })
        .collect()
}

fn convert_grammar(point: RawGrammarPoint) -> GrammarPoint {
    GrammarPoint {
        pattern: point.pattern.unwrap_or_default(),
        structure: point.structure.unwrap_or_default(),
        explanation: point.explanation.unwrap_or_default(),
        example_sentence: point.example_sentence.unwrap_or_default(),
    }
}

fn convert_writing(writing: RawWritingAnalysis) -> WritingAnalysis {
    WritingAnalysis {
        genre_type: writing.genre_type.unwrap_or_default(),
        logic: writing.logic.unwrap_or_default(),
        summary: writing.summary.filter(|s| !s.trim().is_empty()),
        framework: writing.framework.unwrap_or_default(),
    }
}

/// Convert one mind-map node, rejecting excessive depth and nodes whose id
/// repeats an ancestor's id (a node cannot be its own ancestor).
fn convert_mind_map(
    node: RawMindMapNode,
    path: &str,
    depth: usize,
    ancestor_ids: &mut Vec<String>,
    issues: &mut Vec<String>,
) -> Option<MindMapNode> {
    if depth > MAX_MIND_MAP_DEPTH {
        issues.push(format!(
            "{}: mind map exceeds maximum depth of {}",
            path, MAX_MIND_MAP_DEPTH
        ));
        return None;
    }

    let label = match node.label {
        Some(label) => label,
        None => {
            issues.push(format!("{}.label is missing", path));
            String::new()
        }
    };

    let id = node.id.filter(|id| !id.trim().is_empty());
    if let Some(id) = &id {
        if ancestor_ids.contains(id) {
            issues.push(format!(
                "{}: node id '{}' repeats an ancestor id (cycle)",
                path, id
            ));
            return None;
        }
    }

    let pushed = id.is_some();
    if let Some(id) = &id {
        ancestor_ids.push(id.clone());
    }

    let mut children = Vec::new();
    for (i, child) in node.children.unwrap_or_default().into_iter().enumerate() {
        let child_path = format!("{}.children[{}]", path, i);
        if let Some(child) = convert_mind_map(child, &child_path, depth + 1, ancestor_ids, issues) {
            children.push(child);
        }
    }

    if pushed {
        ancestor_ids.pop();
    }

    Some(MindMapNode {
        id,
        label,
        children,
    })
}

fn convert_quizzes(questions: Vec<RawQuizQuestion>, issues: &mut Vec<String>) -> Vec<QuizQuestion> {
    let mut seen_ids = HashSet::new();
    let mut converted = Vec::with_capacity(questions.len());

    for (i, question) in questions.into_iter().enumerate() {
        let path = format!("quizzes[{}]", i);

        let id = non_empty(question.id, &format!("{}.id", path), issues);
        if !id.is_empty() && !seen_ids.insert(id.clone()) {
            issues.push(format!("{}: duplicate id '{}'", path, id));
        }

        let kind = match question.kind.as_deref() {
            Some(raw_kind) => match QuizKind::parse(raw_kind) {
                Some(kind) => Some(kind),
                None => {
                    issues.push(format!("{}.kind '{}' is not a recognized kind", path, raw_kind));
                    None
                }
            },
            None => {
                issues.push(format!("{}.kind is missing", path));
                None
            }
        };

        let correct_answer = non_empty(
            question.correct_answer,
            &format!("{}.correctAnswer", path),
            issues,
        );

        let Some(kind) = kind else {
            continue;
        };

        let options = if kind.is_choice() {
            let options = question.options.unwrap_or_default();
            if options.is_empty() {
                issues.push(format!(
                    "{}.options must be non-empty for kind '{}'",
                    path, kind
                ));
            }
            options
        } else {
            Vec::new()
        };

        converted.push(QuizQuestion {
            id,
            kind,
            prompt: question.prompt.unwrap_or_default(),
            options,
            correct_answer,
            explanation: question.explanation.unwrap_or_default(),
            related_word: question.related_word.filter(|w| !w.trim().is_empty()),
        });
    }

    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "title": "Unit 1",
            "vocabulary": [],
            "grammar": [],
            "writing": {},
            "mindMap": { "label": "Unit 1" },
            "quizzes": []
        })
    }

    fn issues_of(result: Result<AnalysisResult, AnalysisError>) -> Vec<String> {
        match result {
            Err(AnalysisError::MalformedAnalysisResult(issues)) => issues,
            other => panic!("expected malformed result, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_document_defaults_optional_parts() {
        let result = validate_analysis_value(minimal()).unwrap();
        assert_eq!(result.title, "Unit 1");
        assert_eq!(result.background, "");
        assert_eq!(result.writing, WritingAnalysis::default());
        assert!(result.mind_map.is_leaf());
    }

    #[test]
    fn test_empty_text_reports_every_missing_root_field() {
        let issues = issues_of(parse_analysis_result("   "));
        for field in ["title", "vocabulary", "grammar", "writing", "mindMap", "quizzes"] {
            assert!(
                issues.iter().any(|i| i.contains(&format!("`{}`", field))),
                "expected an issue for {}: {:?}",
                field,
                issues
            );
        }
    }

    #[test]
    fn test_non_object_is_rejected() {
        let issues = issues_of(parse_analysis_result("[1, 2, 3]"));
        assert_eq!(issues, vec!["analysis result must be a JSON object".to_string()]);
    }

    #[test]
    fn test_wrong_type_is_a_schema_violation() {
        let mut doc = minimal();
        doc["title"] = json!(42);
        let issues = issues_of(validate_analysis_value(doc));
        assert!(issues[0].starts_with("schema violation"));
    }

    #[test]
    fn test_mind_map_depth_ceiling() {
        let mut node = json!({ "label": "leaf" });
        for depth in 0..(MAX_MIND_MAP_DEPTH + 1) {
            node = json!({ "label": format!("level {}", depth), "children": [node] });
        }
        let mut doc = minimal();
        doc["mindMap"] = node;

        let issues = issues_of(validate_analysis_value(doc));
        assert!(issues.iter().any(|i| i.contains("maximum depth")));
    }

    #[test]
    fn test_mind_map_ancestor_id_is_a_cycle() {
        let mut doc = minimal();
        doc["mindMap"] = json!({
            "id": "root",
            "label": "Root",
            "children": [{ "id": "a", "label": "A", "children": [{ "id": "root", "label": "Again" }] }]
        });
        let issues = issues_of(validate_analysis_value(doc));
        assert!(issues.iter().any(|i| i.contains("cycle")));
    }

    #[test]
    fn test_sibling_ids_may_repeat() {
        let mut doc = minimal();
        doc["mindMap"] = json!({
            "label": "Root",
            "children": [{ "id": "x", "label": "A" }, { "id": "x", "label": "B" }]
        });
        assert!(validate_analysis_value(doc).is_ok());
    }
}
