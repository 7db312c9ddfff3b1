use crate::api::ApiResponse;
use crate::mind_map::MindMapError;
use axum::{http::StatusCode, response::Json};
use tracing::{error, info, warn};

/// Failures of a single scan attempt. Both are terminal for that attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("AI service call failed: {0}")]
    ServiceCallFailure(String),

    #[error("Malformed analysis result: {}", .0.join("; "))]
    MalformedAnalysisResult(Vec<String>),
}

impl AnalysisError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        AnalysisError::MalformedAnalysisResult(vec![reason.into()])
    }
}

/// Errors raised by the study session state (current result and quiz answers).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("No analysis result is available yet")]
    NoAnalysis,

    #[error("Unknown question id '{0}'")]
    UnknownQuestion(String),

    #[error("Quiz has already been submitted; reset it to answer again")]
    QuizAlreadySubmitted,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Render(#[from] MindMapError),
}

/// Centralized error types for consistent API error handling
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("AI service error: {0}")]
    ServiceCallFailure(String),

    #[error("Malformed AI response: {0}")]
    MalformedAnalysisResult(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::ServiceCallFailure(msg) => ApiError::ServiceCallFailure(msg),
            malformed @ AnalysisError::MalformedAnalysisResult(_) => {
                ApiError::MalformedAnalysisResult(malformed.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ScanInProgress | SessionError::QuizAlreadySubmitted => {
                ApiError::Conflict(err.to_string())
            }
            SessionError::NoAnalysis | SessionError::UnknownQuestion(_) => {
                ApiError::NotFound(err.to_string())
            }
            SessionError::Analysis(inner) => inner.into(),
            SessionError::Render(inner) => ApiError::MalformedAnalysisResult(inner.to_string()),
        }
    }
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub resource_id: Option<String>,
    pub resource_type: String,
    pub user_friendly_message: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str, resource_type: &str) -> Self {
        Self {
            operation: operation.to_string(),
            resource_id: None,
            resource_type: resource_type.to_string(),
            user_friendly_message: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_user_message(mut self, message: &str) -> Self {
        self.user_friendly_message = Some(message.to_string());
        self
    }
}

impl ApiError {
    /// Convert API error to HTTP response with consistent structure and logging
    pub fn to_response_with_context(
        self,
        context: ErrorContext,
    ) -> (StatusCode, Json<ApiResponse<()>>) {
        match &self {
            ApiError::NotFound(_) => {
                info!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "Resource not found"
                );
                (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::error(
                        context
                            .user_friendly_message
                            .unwrap_or_else(|| self.to_string()),
                    )),
                )
            }
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "Invalid request"
                );
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error(self.to_string())),
                )
            }
            ApiError::Conflict(_) => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "Conflicting request"
                );
                (
                    StatusCode::CONFLICT,
                    Json(ApiResponse::error(self.to_string())),
                )
            }
            ApiError::ServiceCallFailure(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "AI service error"
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse::error(context.user_friendly_message.unwrap_or_else(
                        || "Failed to analyze image. Please check your API key or try again.".to_string(),
                    ))),
                )
            }
            ApiError::MalformedAnalysisResult(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    resource_id = ?context.resource_id,
                    error = %self,
                    "AI service returned a malformed analysis"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ApiResponse::error(context.user_friendly_message.unwrap_or_else(
                        || "The analysis could not be read. Please try again.".to_string(),
                    ))),
                )
            }
        }
    }

    /// Simple conversion without context
    pub fn to_response(self) -> (StatusCode, Json<ApiResponse<()>>) {
        let context = ErrorContext::new("unknown", "resource");
        self.to_response_with_context(context)
    }
}

/// Helper macro for structured error responses
#[macro_export]
macro_rules! api_error {
    (validation, $operation:expr, $resource_type:expr, $message:expr) => {
        $crate::errors::ApiError::ValidationError($message.to_string())
            .to_response_with_context($crate::errors::ErrorContext::new($operation, $resource_type))
    };

    (session, $operation:expr, $resource_type:expr, $error:expr) => {
        $crate::errors::ApiError::from($error)
            .to_response_with_context($crate::errors::ErrorContext::new($operation, $resource_type))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_creation() {
        let context = ErrorContext::new("set_answer", "question")
            .with_id("q1")
            .with_user_message("Custom message");

        assert_eq!(context.operation, "set_answer");
        assert_eq!(context.resource_type, "question");
        assert_eq!(context.resource_id, Some("q1".to_string()));
        assert_eq!(
            context.user_friendly_message,
            Some("Custom message".to_string())
        );
    }

    #[test]
    fn test_malformed_message_lists_every_violation() {
        let error = AnalysisError::MalformedAnalysisResult(vec![
            "missing field `title`".to_string(),
            "quizzes[1]: duplicate id 'q1'".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "Malformed analysis result: missing field `title`; quizzes[1]: duplicate id 'q1'"
        );
    }

    #[test]
    fn test_session_error_classification() {
        assert!(matches!(
            ApiError::from(SessionError::ScanInProgress),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(SessionError::QuizAlreadySubmitted),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(SessionError::UnknownQuestion("q9".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(SessionError::Analysis(AnalysisError::malformed("bad"))),
            ApiError::MalformedAnalysisResult(_)
        ));
        assert!(matches!(
            ApiError::from(SessionError::Analysis(AnalysisError::ServiceCallFailure(
                "timeout".to_string()
            ))),
            ApiError::ServiceCallFailure(_)
        ));
        assert!(matches!(
            ApiError::from(SessionError::Render(MindMapError::TooDeep(64))),
            ApiError::MalformedAnalysisResult(_)
        ));
    }

    #[test]
    fn test_unrenderable_mind_map_is_bad_gateway() {
        let error = ApiError::from(SessionError::Render(MindMapError::TooDeep(64)));
        let (status, response) =
            error.to_response_with_context(ErrorContext::new("get_mind_map", "mind_map"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!response.0.success);
    }

    #[test]
    fn test_api_error_responses() {
        let error = ApiError::NotFound("Analysis not found".to_string());
        let context = ErrorContext::new("get_analysis", "analysis");
        let (status, _response) = error.to_response_with_context(context);
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = ApiError::BadRequest("empty image".to_string()).to_response();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = ApiError::Conflict("busy".to_string()).to_response();
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = ApiError::ServiceCallFailure("quota".to_string()).to_response();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = ApiError::MalformedAnalysisResult("bad".to_string()).to_response();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
