use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub word: String,
    pub part_of_speech: String,
    pub definition_primary: String, // Target-language definition
    pub definition_secondary: String, // Native-language gloss
    pub usage_note: Option<String>,
    pub example_sentence: String,
    pub derivatives: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarPoint {
    pub pattern: String,
    pub structure: String,
    pub explanation: String,
    pub example_sentence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingAnalysis {
    pub genre_type: String,
    pub logic: String,
    pub summary: Option<String>,
    pub framework: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: Option<String>,
    pub label: String,
    #[serde(default)]
    pub children: Vec<MindMapNode>,
}

impl MindMapNode {
    pub fn leaf(label: &str) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: &str, children: Vec<MindMapNode>) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizKind {
    Matching,
    Spelling,
    MultipleChoice,
    Grammar,
    Reading,
}

impl QuizKind {
    pub const ALL: [QuizKind; 5] = [
        QuizKind::Matching,
        QuizKind::Spelling,
        QuizKind::MultipleChoice,
        QuizKind::Grammar,
        QuizKind::Reading,
    ];

    /// Wire name used in the output schema and in JSON responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::Matching => "matching",
            QuizKind::Spelling => "spelling",
            QuizKind::MultipleChoice => "multipleChoice",
            QuizKind::Grammar => "grammar",
            QuizKind::Reading => "reading",
        }
    }

    /// Parse a kind name, tolerating case and `_`/`-` separators.
    /// Anything outside the closed set is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect::<String>()
            .to_lowercase();

        match folded.as_str() {
            "matching" => Some(QuizKind::Matching),
            "spelling" => Some(QuizKind::Spelling),
            "multiplechoice" => Some(QuizKind::MultipleChoice),
            "grammar" => Some(QuizKind::Grammar),
            "reading" => Some(QuizKind::Reading),
            _ => None,
        }
    }

    /// Choice-style kinds render their options as buttons; the rest take free text.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QuizKind::MultipleChoice | QuizKind::Grammar | QuizKind::Reading
        )
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub kind: QuizKind,
    pub prompt: String,
    pub options: Vec<String>, // Empty for spelling and matching
    pub correct_answer: String,
    pub explanation: String,
    pub related_word: Option<String>,
}

/// The validated outcome of one scan. Replaced wholesale by the next scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title: String,
    pub vocabulary: Vec<VocabularyEntry>,
    pub grammar: Vec<GrammarPoint>,
    pub writing: WritingAnalysis,
    pub background: String,
    pub mind_map: MindMapNode,
    pub quizzes: Vec<QuizQuestion>,
}

impl AnalysisResult {
    pub fn question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.quizzes.iter().find(|q| q.id == question_id)
    }
}

/// User answers keyed by question id. Unanswered questions are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_id: &str, value: &str) {
        self.0.insert(question_id.to_string(), value.to_string());
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub correct_count: usize,
    pub total_count: usize,
}

impl ScoreResult {
    /// Percentage of correct answers, or `None` for an empty quiz set.
    pub fn percentage(&self) -> Option<f64> {
        if self.total_count == 0 {
            return None;
        }
        Some(self.correct_count as f64 * 100.0 / self.total_count as f64)
    }

    pub fn is_perfect(&self) -> bool {
        self.total_count > 0 && self.correct_count == self.total_count
    }

    pub fn feedback(&self) -> &'static str {
        if self.is_perfect() {
            "Perfect mastery!"
        } else {
            "Good effort! Keep studying."
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerStatus {
    Unanswered,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionState {
    Neutral,
    Correct,
    SelectedCorrect,
    SelectedIncorrect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionMark {
    pub text: String,
    pub selected: bool,
    pub correct: bool,
    pub state: OptionState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub kind: QuizKind,
    pub status: AnswerStatus,
    pub submitted_answer: Option<String>,
    pub correct_answer: String,
    pub explanation: String,
    /// Index into `options` of the option the user picked, for choice-style kinds.
    pub selected_option: Option<usize>,
    /// Empty for free-text kinds.
    pub options: Vec<OptionMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReport {
    pub score: ScoreResult,
    pub percentage: Option<f64>,
    pub feedback: String,
    pub outcomes: Vec<QuestionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapRow {
    pub id: Option<String>,
    pub label: String,
    pub depth: usize,
    pub is_root: bool,
}
