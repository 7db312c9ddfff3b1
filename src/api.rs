use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{
    api_error,
    errors::{ApiError, ErrorContext},
    models::{MindMapRow, QuizReport},
    session::{AnalysisSnapshot, QuizSessionView, Workspace},
};

// Import logging macros
use crate::{log_api_error, log_api_start, log_api_success, log_api_warn};

/// Default upload ceiling when the router is built without configuration.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
}

impl AppState {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Arc::new(workspace),
        }
    }
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub provider: String,
    pub model: String,
    pub scan_in_progress: bool,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn image_mime_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or_default().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Raw image body; the `Content-Type` header carries its mime type.
pub async fn scan_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<AnalysisSnapshot> {
    log_api_start!("scan_image");

    let Some(mime_type) = image_mime_type(&headers) else {
        return Err(api_error!(validation, "scan_image", "image", "Content-Type header with the image mime type is required"));
    };
    if body.is_empty() {
        return Err(ApiError::BadRequest("Image body is empty".to_string())
            .to_response_with_context(ErrorContext::new("scan_image", "image")));
    }

    info!(
        image_bytes = body.len(),
        mime_type = %mime_type,
        "Analyzing textbook image"
    );

    match state.workspace.scan(&body, &mime_type).await {
        Ok(snapshot) => {
            log_api_success!("scan_image", scan_id = snapshot.scan_id, "analysis ready");
            Ok(Json(ApiResponse::success(snapshot)))
        }
        Err(e) => {
            log_api_error!("scan_image", error = e, "scan attempt failed; previous result retained");
            Err(api_error!(session, "scan_image", "analysis", e))
        }
    }
}

pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<AnalysisSnapshot> {
    log_api_start!("get_analysis");

    state
        .workspace
        .current_analysis()
        .await
        .map(|snapshot| Json(ApiResponse::success(snapshot)))
        .map_err(|e| api_error!(session, "get_analysis", "analysis", e))
}

pub async fn get_mind_map(State(state): State<AppState>) -> ApiResult<Vec<MindMapRow>> {
    log_api_start!("get_mind_map");

    match state.workspace.mind_map_rows().await {
        Ok(rows) => {
            log_api_success!("get_mind_map", count = rows.len(), "mind map rendered");
            Ok(Json(ApiResponse::success(rows)))
        }
        Err(e) => Err(api_error!(session, "get_mind_map", "mind_map", e)),
    }
}

pub async fn get_quiz(State(state): State<AppState>) -> ApiResult<QuizSessionView> {
    log_api_start!("get_quiz");

    state
        .workspace
        .quiz_view()
        .await
        .map(|view| Json(ApiResponse::success(view)))
        .map_err(|e| api_error!(session, "get_quiz", "quiz", e))
}

pub async fn set_answer(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> ApiResult<QuizSessionView> {
    log_api_start!("set_answer", question_id = question_id);

    match state.workspace.set_answer(&question_id, &request.answer).await {
        Ok(view) => {
            log_api_success!("set_answer", question_id = question_id, "answer recorded");
            Ok(Json(ApiResponse::success(view)))
        }
        Err(e) => {
            log_api_warn!("set_answer", question_id = question_id, e);
            Err(ApiError::from(e).to_response_with_context(
                ErrorContext::new("set_answer", "question").with_id(&question_id),
            ))
        }
    }
}

pub async fn submit_quiz(State(state): State<AppState>) -> ApiResult<QuizReport> {
    log_api_start!("submit_quiz");

    match state.workspace.submit().await {
        Ok(report) => {
            info!(
                correct_count = report.score.correct_count,
                total_count = report.score.total_count,
                "Quiz submitted"
            );
            Ok(Json(ApiResponse::success(report)))
        }
        Err(e) => Err(api_error!(session, "submit_quiz", "quiz", e)),
    }
}

pub async fn reset_quiz(State(state): State<AppState>) -> ApiResult<QuizSessionView> {
    log_api_start!("reset_quiz");

    match state.workspace.reset().await {
        Ok(view) => {
            log_api_success!("reset_quiz", scan_id = view.scan_id, "quiz reset");
            Ok(Json(ApiResponse::success(view)))
        }
        Err(e) => Err(api_error!(session, "reset_quiz", "quiz", e)),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let service = state.workspace.service();
    Json(ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        provider: service.provider_name().to_string(),
        model: service.model_name().to_string(),
        scan_in_progress: state.workspace.is_scanning(),
    }))
}

pub fn create_router(state: AppState) -> Router {
    create_router_with_limit(state, DEFAULT_MAX_UPLOAD_BYTES)
}

pub fn create_router_with_limit(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Scan route
        .route(
            "/api/scan",
            post(scan_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // Analysis views
        .route("/api/analysis", get(get_analysis))
        .route("/api/analysis/mind-map", get(get_mind_map))
        // Quiz session routes
        .route("/api/quiz", get(get_quiz))
        .route("/api/quiz/answers/:question_id", put(set_answer))
        .route("/api/quiz/submit", post(submit_quiz))
        .route("/api/quiz/reset", post(reset_quiz))
        .with_state(state)
}
