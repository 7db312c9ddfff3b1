#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use textbook_scanner::{AnalysisBackend, ServiceRequest};

/// Replays canned responses in order instead of calling a real AI service.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, String>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ServiceRequest>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ServiceRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn analyze(&self, request: &ServiceRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted response left")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "Scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// A complete, well-formed analysis document.
pub fn sample_analysis_json() -> Value {
    json!({
        "title": "Unit 3: A Trip to the Coast",
        "vocabulary": [
            {
                "word": "coast",
                "partOfSpeech": "n.",
                "definitionPrimary": "the land next to the sea",
                "definitionSecondary": "海岸",
                "usageNote": "on the coast",
                "exampleSentence": "We drove along the coast.",
                "derivatives": ["coastal", "coastline"]
            },
            {
                "word": "journey",
                "partOfSpeech": "n.",
                "definitionPrimary": "an act of travelling from one place to another",
                "definitionSecondary": "旅程",
                "exampleSentence": "The journey took three hours."
            }
        ],
        "grammar": [
            {
                "pattern": "Past continuous",
                "structure": "was/were + verb-ing",
                "explanation": "An action in progress in the past.",
                "exampleSentence": "We were walking when it started to rain."
            },
            { "pattern": "Used to" }
        ],
        "writing": {
            "genreType": "Narrative",
            "logic": "Chronological order from departure to return.",
            "summary": "A family trip to the seaside.",
            "framework": ["Setting", "Events", "Feelings"]
        },
        "background": "Seaside towns are popular holiday destinations.",
        "mindMap": {
            "id": "root",
            "label": "A Trip to the Coast",
            "children": [
                { "id": "v", "label": "Vocabulary", "children": [{ "label": "coast" }, { "label": "journey" }] },
                { "id": "g", "label": "Grammar" }
            ]
        },
        "quizzes": [
            {
                "id": "q1",
                "kind": "multipleChoice",
                "prompt": "Where did the family go?",
                "options": ["The mountains", "The coast", "The city"],
                "correctAnswer": "The coast",
                "explanation": "The title says so."
            },
            {
                "id": "q2",
                "kind": "spelling",
                "prompt": "Spell the word meaning 'an act of travelling'.",
                "correctAnswer": "journey",
                "explanation": "j-o-u-r-n-e-y",
                "relatedWord": "journey"
            },
            {
                "id": "q3",
                "kind": "grammar",
                "prompt": "We ___ walking when it rained.",
                "options": ["was", "were", "are"],
                "correctAnswer": "were",
                "explanation": "Plural subject in the past continuous."
            },
            {
                "id": "q4",
                "kind": "matching",
                "prompt": "Match: coast",
                "correctAnswer": "海岸",
                "explanation": "coast means 海岸."
            }
        ]
    })
}

pub fn sample_analysis_text() -> String {
    sample_analysis_json().to_string()
}
