use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::models::QuizKind;

/// Number of practice questions requested per scan.
pub const QUIZ_QUESTION_TARGET: usize = 10;

/// Nesting levels of `children` declared for the mind map in the output schema.
pub const MIND_MAP_SCHEMA_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub mime_type: String,
    /// Standard base64 of the raw image bytes.
    pub data: String,
}

impl ImagePayload {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Everything the AI service needs for one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub image: ImagePayload,
    pub instruction: String,
    pub output_schema: Value,
}

/// Bundle an image with the fixed instruction and output schema.
/// The image content itself is not inspected.
pub fn encode(image_bytes: &[u8], mime_type: &str) -> ServiceRequest {
    ServiceRequest {
        image: ImagePayload {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(image_bytes),
        },
        instruction: analysis_instruction(),
        output_schema: analysis_schema(),
    }
}

pub fn analysis_instruction() -> String {
    let kinds = QuizKind::ALL
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Perform OCR and deeply analyze this English textbook page. \
         Extract key vocabulary (with an English definition and a Chinese gloss), grammar points, \
         writing structure, and background info. Also generate a structured mind map and \
         {count} relevant practice questions mixing vocabulary matching, spelling, multiple choice, \
         grammar, and reading comprehension. Each question needs a unique id and a kind that is \
         exactly one of: {kinds}. Choice-style questions (multipleChoice, grammar, reading) must \
         list their options. Return results in structured JSON format.",
        count = QUIZ_QUESTION_TARGET,
        kinds = kinds,
    )
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn described_string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn mind_map_node_schema(levels_below: usize) -> Value {
    let mut properties = Map::new();
    properties.insert("id".to_string(), string());
    properties.insert("label".to_string(), string());
    if levels_below > 0 {
        properties.insert(
            "children".to_string(),
            json!({ "type": "ARRAY", "items": mind_map_node_schema(levels_below - 1) }),
        );
    }
    json!({ "type": "OBJECT", "properties": properties, "required": ["label"] })
}

/// Output schema declared to the service, in the Gemini `responseSchema` dialect.
pub fn analysis_schema() -> Value {
    let kinds: Vec<&str> = QuizKind::ALL.iter().map(|k| k.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "title": described_string("Textbook chapter or passage title"),
            "vocabulary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": string(),
                        "partOfSpeech": string(),
                        "definitionPrimary": described_string("English definition"),
                        "definitionSecondary": described_string("Chinese gloss"),
                        "usageNote": string(),
                        "exampleSentence": string(),
                        "derivatives": string_array()
                    },
                    "required": ["word", "partOfSpeech", "definitionPrimary", "definitionSecondary"]
                }
            },
            "grammar": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "pattern": string(),
                        "structure": string(),
                        "explanation": string(),
                        "exampleSentence": string()
                    }
                }
            },
            "writing": {
                "type": "OBJECT",
                "properties": {
                    "genreType": string(),
                    "logic": string(),
                    "summary": string(),
                    "framework": string_array()
                }
            },
            "background": string(),
            "mindMap": mind_map_node_schema(MIND_MAP_SCHEMA_DEPTH),
            "quizzes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": string(),
                        "kind": { "type": "STRING", "enum": kinds },
                        "prompt": string(),
                        "options": string_array(),
                        "correctAnswer": string(),
                        "explanation": string(),
                        "relatedWord": described_string("Target word for spelling questions")
                    },
                    "required": ["id", "kind", "prompt", "correctAnswer", "explanation"]
                }
            }
        },
        "required": ["title", "vocabulary", "grammar", "writing", "mindMap", "quizzes"]
    })
}

/// Convert the Gemini-dialect schema to standard JSON Schema
/// (lower-case type names), as OpenAI-compatible endpoints expect.
pub fn to_json_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_lowercase()),
                        _ => to_json_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_json_schema).collect()),
        other => other.clone(),
    }
}
