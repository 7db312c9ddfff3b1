use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::analysis_parser::parse_analysis_result;
use crate::errors::AnalysisError;
use crate::llm_providers::{
    AnalysisBackend, JsonResponseParser, LLMProviderFactory, LLMProviderType,
};
use crate::models::AnalysisResult;
use crate::request_encoder::encode;
use crate::{log_llm_operation, log_performance};

/// Runs one textbook-page analysis: encode, call the AI service once, validate.
#[derive(Clone)]
pub struct AnalysisService {
    backend: Arc<dyn AnalysisBackend>,
}

impl AnalysisService {
    pub fn new_with_provider(
        api_key: String,
        base_url: Option<String>,
        provider_type: LLMProviderType,
        model: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let provider =
            LLMProviderFactory::create_provider(provider_type, api_key, base_url, model, timeout)?;
        Ok(Self::with_backend(Arc::new(provider)))
    }

    pub fn new_gemini(api_key: String, model: Option<String>) -> anyhow::Result<Self> {
        Self::new_with_provider(
            api_key,
            None,
            LLMProviderType::Gemini,
            model,
            Duration::from_secs(120),
        )
    }

    pub fn with_backend(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// No retries: a failed call or an invalid response ends this attempt.
    pub async fn analyze_image(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let request = encode(image_bytes, mime_type);

        log_llm_operation!(
            start,
            "analyze_image",
            provider = self.provider_name(),
            image_bytes = image_bytes.len()
        );

        let response_text = match self.backend.analyze(&request).await {
            Ok(text) => text,
            Err(e) => {
                log_llm_operation!(error, "analyze_image", provider = self.provider_name(), error = e);
                return Err(AnalysisError::ServiceCallFailure(e.to_string()));
            }
        };

        debug!(
            response_length = response_text.len(),
            "Raw LLM response for image analysis"
        );

        // Only text that is not already a JSON document gets fence or prose extraction.
        let json_content = if serde_json::from_str::<Value>(&response_text).is_ok() {
            response_text
        } else {
            JsonResponseParser::extract_json_from_response(&response_text)
        };
        let result = parse_analysis_result(&json_content);

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(analysis) => {
                log_llm_operation!(
                    success,
                    "analyze_image",
                    provider = self.provider_name(),
                    duration_ms = duration_ms,
                    quiz_count = analysis.quizzes.len()
                );
            }
            Err(e) => {
                log_llm_operation!(error, "analyze_image", provider = self.provider_name(), error = e);
            }
        }
        log_performance!("analyze_image", duration_ms = duration_ms);

        result
    }
}
